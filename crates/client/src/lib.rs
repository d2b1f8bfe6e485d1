//! xbridge Client
//!
//! Resilience core for talking to an unreliable upstream: request throttling,
//! circuit breaking, bounded retries with backoff, short-lived caching, and
//! the default reqwest-backed transport.

pub mod cache;
pub mod circuit_breaker;
pub mod http;
pub mod rate_limiter;
pub mod requester;

pub use cache::TtlCache;
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use http::ReqwestTransport;
pub use rate_limiter::RateLimiter;
pub use requester::RetryingRequester;
