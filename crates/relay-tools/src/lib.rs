//! Tool routing for finrelay
//!
//! The deterministic layer between an agent's function-calling loop and the
//! data providers: a registry of named tools, a dispatcher that validates
//! arguments and routes calls, a TTL cache fronted by per-provider rate
//! limiting, and a bounded exponential-backoff retry policy.
//!
//! The agent loop itself lives outside this workspace; it only sees
//! [`ToolDispatcher::dispatch`] and the normalized records it returns.

pub mod cache;
pub mod dispatch;
pub mod registry;
pub mod retry;
pub mod tool;

pub use cache::{CacheKey, RateLimitedCache};
pub use dispatch::ToolDispatcher;
pub use registry::ToolRegistry;
pub use retry::RetryPolicy;
pub use tool::{ParamKind, ParamSpec, ProviderCall, ToolArgs, ToolDescriptor, ToolInvocationRequest};
