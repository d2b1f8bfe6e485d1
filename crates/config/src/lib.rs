//! xbridge Configuration
//!
//! Settings structures and file/environment loading for the aggregator.

pub mod loader;
pub mod settings;

pub use loader::{load_config, ConfigLoadError};
pub use settings::{
	CacheSettings, CircuitBreakerSettings, ConfigValidationError, LogFormat, LoggingSettings,
	RateLimitSettings, RetrySettings, Settings, SolverSettings, UpstreamSettings,
};
