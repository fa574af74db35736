//! TTL caching and provider rate limiting
//!
//! Guards the quota-limited providers twice over: a TTL cache answers repeat
//! lookups without a network call at all, and a per-provider rate limiter
//! enforces the provider's published request-rate ceiling as a hard floor on
//! call spacing. Both live in one injectable component so tests can build an
//! isolated instance with millisecond intervals.

use cached::{Cached, TimedCache};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use relay_core::{NormalizedRecord, ProviderId, RelayConfig, Result, ToolFamily};
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

type SharedLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;
type Tier = Arc<RwLock<TimedCache<CacheKey, NormalizedRecord>>>;

/// Cache key for dispatched tool calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    /// Tool name
    pub tool: String,
    /// Canonicalized arguments as a JSON string (sorted keys)
    pub args: String,
}

impl CacheKey {
    /// Build a key from a tool name and its validated arguments. The argument
    /// map is ordered, so equal argument sets always produce equal keys.
    pub fn new(tool: impl Into<String>, args: &impl Serialize) -> Self {
        Self {
            tool: tool.into(),
            args: serde_json::to_string(args).unwrap_or_default(),
        }
    }
}

/// TTL cache tiers plus per-provider call-spacing limiters
pub struct RateLimitedCache {
    /// Quote and series data, short TTL
    realtime: Tier,
    /// Overview and statement data, long TTL
    fundamentals: Tier,
    /// News data, medium TTL
    news: Tier,
    limiters: HashMap<ProviderId, SharedLimiter>,
}

fn tier(ttl: Duration) -> Tier {
    Arc::new(RwLock::new(TimedCache::with_lifespan(ttl)))
}

fn limiter(min_interval: Duration) -> SharedLimiter {
    // Burst of one cell replenished once per interval: consecutive grants are
    // spaced at least `min_interval` apart no matter how many callers wait.
    let quota = Quota::with_period(min_interval)
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

impl RateLimitedCache {
    /// Build cache tiers and limiters from configuration
    pub fn new(config: &RelayConfig) -> Self {
        let limiters = [ProviderId::AlphaVantage, ProviderId::Perplexity]
            .into_iter()
            .map(|provider| (provider, limiter(config.min_interval(provider))))
            .collect();

        Self {
            realtime: tier(config.cache_ttl_realtime),
            fundamentals: tier(config.cache_ttl_fundamentals),
            news: tier(config.cache_ttl_news),
            limiters,
        }
    }

    fn tier_for(&self, family: ToolFamily) -> Option<&Tier> {
        match family {
            ToolFamily::Quote | ToolFamily::Series => Some(&self.realtime),
            ToolFamily::Fundamentals | ToolFamily::Statements(_) => Some(&self.fundamentals),
            ToolFamily::News => Some(&self.news),
            ToolFamily::Research => None,
        }
    }

    /// Get a live cached record, if any. Expired entries are evicted lazily
    /// by this lookup.
    pub async fn get(&self, family: ToolFamily, key: &CacheKey) -> Option<NormalizedRecord> {
        let tier = self.tier_for(family)?;
        let mut cache = tier.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a record, overwriting any previous (possibly expired) entry
    pub async fn insert(&self, family: ToolFamily, key: CacheKey, record: NormalizedRecord) {
        if let Some(tier) = self.tier_for(family) {
            let mut cache = tier.write().await;
            let _ = cache.cache_set(key, record);
        }
    }

    /// Suspend until the provider's minimum call interval has elapsed since
    /// the last granted call. Cooperative wait, not a busy loop.
    pub async fn throttle(&self, provider: ProviderId) {
        if let Some(limiter) = self.limiters.get(&provider) {
            limiter.until_ready().await;
        }
    }

    /// Serve from cache or compute through the provider's rate-limit gate.
    ///
    /// A cache hit never touches the limiter. On a miss the caller waits for
    /// the provider's call-spacing token, runs `compute`, and stores the
    /// result. Errors propagate without poisoning the cache.
    pub async fn get_or_compute<F, Fut>(
        &self,
        provider: ProviderId,
        family: ToolFamily,
        key: CacheKey,
        compute: F,
    ) -> Result<NormalizedRecord>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NormalizedRecord>>,
    {
        if let Some(hit) = self.get(family, &key).await {
            tracing::debug!(tool = %key.tool, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(tool = %key.tool, %provider, "cache miss");
        self.throttle(provider).await;

        let record = compute().await?;
        self.insert(family, key, record.clone()).await;
        Ok(record)
    }

    /// Clear every tier
    pub async fn clear(&self) {
        for tier in [&self.realtime, &self.fundamentals, &self.news] {
            tier.write().await.cache_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::record::ResearchRecord;
    use relay_core::{FundamentalsRecord, RelayError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;
    use tokio::sync::Mutex;

    fn test_config(ttl: Duration, interval: Duration) -> RelayConfig {
        RelayConfig::builder()
            .alpha_vantage_api_key("test_key")
            .cache_ttl_realtime(ttl)
            .cache_ttl_fundamentals(ttl)
            .cache_ttl_news(ttl)
            .alpha_vantage_min_interval(interval)
            .perplexity_min_interval(interval)
            .build()
            .expect("valid config")
    }

    fn overview(name: &str) -> NormalizedRecord {
        NormalizedRecord::Fundamentals(FundamentalsRecord {
            name: name.to_string(),
            symbol: None,
            description: None,
            exchange: None,
            sector: None,
            industry: None,
            market_cap: None,
            pe_ratio: None,
            eps: None,
            dividend_yield: None,
            book_value: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
        })
    }

    fn research(content: &str) -> NormalizedRecord {
        NormalizedRecord::Research(ResearchRecord {
            content: content.to_string(),
            citations: vec![],
            model: None,
        })
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let mut first = crate::tool::ToolArgs::new();
        first.insert("symbol".to_string(), "AAPL".into());
        first.insert("limit".to_string(), 10.into());

        let mut second = crate::tool::ToolArgs::new();
        second.insert("limit".to_string(), 10.into());
        second.insert("symbol".to_string(), "AAPL".into());

        assert_eq!(
            CacheKey::new("NEWS_SENTIMENT", &first),
            CacheKey::new("NEWS_SENTIMENT", &second)
        );
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_compute() {
        let cache = RateLimitedCache::new(&test_config(
            Duration::from_secs(60),
            Duration::from_millis(1),
        ));
        let key = CacheKey::new("OVERVIEW", &serde_json::json!({"symbol": "AAPL"}));
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let record = cache
                .get_or_compute(
                    ProviderId::AlphaVantage,
                    ToolFamily::Fundamentals,
                    key.clone(),
                    || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(overview("Apple Inc."))
                    },
                )
                .await
                .expect("computes");
            assert_eq!(record, overview("Apple Inc."));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_recomputed() {
        let cache = RateLimitedCache::new(&test_config(
            Duration::from_millis(50),
            Duration::from_millis(1),
        ));
        let key = CacheKey::new("NEWS_SENTIMENT", &serde_json::json!({"ticker": "TSLA"}));
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            cache
                .get_or_compute(ProviderId::AlphaVantage, ToolFamily::News, key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(overview("stale test"))
                })
                .await
                .expect("computes");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;

        cache
            .get_or_compute(ProviderId::AlphaVantage, ToolFamily::News, key.clone(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(overview("stale test"))
            })
            .await
            .expect("computes");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_research_is_never_cached() {
        let cache = RateLimitedCache::new(&test_config(
            Duration::from_secs(60),
            Duration::from_millis(1),
        ));
        let key = CacheKey::new("perplexity_research", &serde_json::json!({"query": "TSLA"}));
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            cache
                .get_or_compute(ProviderId::Perplexity, ToolFamily::Research, key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(research("fresh findings"))
                })
                .await
                .expect("computes");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = RateLimitedCache::new(&test_config(
            Duration::from_secs(60),
            Duration::from_millis(1),
        ));
        let key = CacheKey::new("OVERVIEW", &serde_json::json!({"symbol": "AAPL"}));
        let calls = AtomicU32::new(0);

        let result = cache
            .get_or_compute(
                ProviderId::AlphaVantage,
                ToolFamily::Fundamentals,
                key.clone(),
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(RelayError::Transient("flaky".to_string()))
                },
            )
            .await;
        assert!(result.is_err());

        // The failure did not populate the cache; the next call computes again
        cache
            .get_or_compute(
                ProviderId::AlphaVantage,
                ToolFamily::Fundamentals,
                key.clone(),
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(overview("Apple Inc."))
                },
            )
            .await
            .expect("computes");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sequential_misses_respect_min_interval() {
        let interval = Duration::from_millis(50);
        let cache = RateLimitedCache::new(&test_config(Duration::from_secs(60), interval));
        let mut call_times = Vec::new();

        for symbol in ["AAPL", "MSFT", "NVDA"] {
            let key = CacheKey::new("OVERVIEW", &serde_json::json!({ "symbol": symbol }));
            cache
                .get_or_compute(
                    ProviderId::AlphaVantage,
                    ToolFamily::Fundamentals,
                    key,
                    || async { Ok(overview(symbol)) },
                )
                .await
                .expect("computes");
            call_times.push(Instant::now());
        }

        for pair in call_times.windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            assert!(gap >= Duration::from_millis(45), "gap was {gap:?}");
        }
    }

    #[tokio::test]
    async fn test_concurrent_misses_respect_min_interval() {
        let interval = Duration::from_millis(50);
        let cache = Arc::new(RateLimitedCache::new(&test_config(
            Duration::from_secs(60),
            interval,
        )));
        let call_times = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for symbol in ["AAPL", "MSFT", "NVDA"] {
            let cache = Arc::clone(&cache);
            let call_times = Arc::clone(&call_times);
            handles.push(tokio::spawn(async move {
                let key = CacheKey::new("OVERVIEW", &serde_json::json!({ "symbol": symbol }));
                cache
                    .get_or_compute(
                        ProviderId::AlphaVantage,
                        ToolFamily::Fundamentals,
                        key,
                        || async {
                            call_times.lock().await.push(Instant::now());
                            Ok(overview(symbol))
                        },
                    )
                    .await
                    .expect("computes");
            }));
        }
        for handle in handles {
            handle.await.expect("task completes");
        }

        let mut times = call_times.lock().await.clone();
        times.sort();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            assert!(gap >= Duration::from_millis(45), "gap was {gap:?}");
        }
    }

    #[tokio::test]
    async fn test_clear_empties_every_tier() {
        let cache = RateLimitedCache::new(&test_config(
            Duration::from_secs(60),
            Duration::from_millis(1),
        ));
        let key = CacheKey::new("OVERVIEW", &serde_json::json!({"symbol": "AAPL"}));

        cache
            .insert(ToolFamily::Fundamentals, key.clone(), overview("Apple Inc."))
            .await;
        assert!(cache.get(ToolFamily::Fundamentals, &key).await.is_some());

        cache.clear().await;
        assert!(cache.get(ToolFamily::Fundamentals, &key).await.is_none());
    }
}
