//! Configuration settings structures

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
	#[serde(default)]
	pub upstream: UpstreamSettings,
	#[serde(default)]
	pub retry: RetrySettings,
	#[serde(default)]
	pub rate_limit: RateLimitSettings,
	#[serde(default)]
	pub circuit_breaker: CircuitBreakerSettings,
	#[serde(default)]
	pub cache: CacheSettings,
	#[serde(default)]
	pub solver: SolverSettings,
	#[serde(default)]
	pub logging: LoggingSettings,
}

/// Upstream API endpoint configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpstreamSettings {
	pub endpoint: String,
	pub user_agent: String,
}

impl Default for UpstreamSettings {
	fn default() -> Self {
		Self {
			endpoint: "https://api.bridge.example".to_string(),
			user_agent: "xbridge-aggregator/0.1".to_string(),
		}
	}
}

/// Retry and timeout configuration for one logical request
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetrySettings {
	pub max_retries: u32,
	pub base_delay_ms: u64,
	pub max_delay_ms: u64,
	/// Per-request timeout; a timed-out attempt is retried like any failure
	pub request_timeout_ms: u64,
	/// Hard transport-level guard against hung connections, independent of
	/// the per-request timeout
	pub transport_timeout_ms: u64,
}

impl Default for RetrySettings {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_delay_ms: 1000,
			max_delay_ms: 30_000,
			request_timeout_ms: 10_000,
			transport_timeout_ms: 30_000,
		}
	}
}

/// Outbound request throttling configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitSettings {
	pub enabled: bool,
	pub max_requests: u32,
	pub window_ms: u64,
}

impl Default for RateLimitSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			max_requests: 10,
			window_ms: 60_000,
		}
	}
}

/// Circuit breaker thresholds and timers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CircuitBreakerSettings {
	pub enabled: bool,
	/// Consecutive failures before the circuit opens
	pub failure_threshold: u32,
	/// Consecutive half-open successes before the circuit closes
	pub success_threshold: u32,
	/// Cooldown before a trial probe is admitted
	pub open_timeout_ms: u64,
	/// Window after which accumulated failures are forgiven
	pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			failure_threshold: 5,
			success_threshold: 2,
			open_timeout_ms: 30_000,
			reset_timeout_ms: 60_000,
		}
	}
}

/// TTL cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheSettings {
	pub ttl_ms: u64,
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self { ttl_ms: 60_000 }
	}
}

/// Liquidity depth solver configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SolverSettings {
	/// Fixed binary-search iteration budget per solve
	pub iterations: u32,
	/// Search upper bound in whole source-token units, scaled by the source
	/// asset's decimals at solve time
	pub upper_bound_units: u64,
	/// Slippage budgets to solve per route, in basis points
	pub slippage_budgets_bps: Vec<u32>,
}

impl Default for SolverSettings {
	fn default() -> Self {
		Self {
			iterations: 25,
			upper_bound_units: 1_000_000,
			slippage_budgets_bps: vec![50, 100],
		}
	}
}

/// Log output format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Compact,
		}
	}
}

/// Settings validation failures
#[derive(Error, Debug)]
pub enum ConfigValidationError {
	#[error("invalid value for {field}: {reason}")]
	InvalidValue { field: String, reason: String },
}

impl Settings {
	/// Reject configurations that would stall or divide by zero at runtime
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		if self.rate_limit.enabled && self.rate_limit.max_requests == 0 {
			return Err(ConfigValidationError::InvalidValue {
				field: "rate_limit.max_requests".to_string(),
				reason: "must be greater than zero when the limiter is enabled".to_string(),
			});
		}
		if self.rate_limit.enabled && self.rate_limit.window_ms == 0 {
			return Err(ConfigValidationError::InvalidValue {
				field: "rate_limit.window_ms".to_string(),
				reason: "must be greater than zero when the limiter is enabled".to_string(),
			});
		}
		if self.circuit_breaker.enabled && self.circuit_breaker.failure_threshold == 0 {
			return Err(ConfigValidationError::InvalidValue {
				field: "circuit_breaker.failure_threshold".to_string(),
				reason: "must be greater than zero when the breaker is enabled".to_string(),
			});
		}
		if self.circuit_breaker.enabled && self.circuit_breaker.success_threshold == 0 {
			return Err(ConfigValidationError::InvalidValue {
				field: "circuit_breaker.success_threshold".to_string(),
				reason: "must be greater than zero when the breaker is enabled".to_string(),
			});
		}
		if self.cache.ttl_ms == 0 {
			return Err(ConfigValidationError::InvalidValue {
				field: "cache.ttl_ms".to_string(),
				reason: "must be greater than zero".to_string(),
			});
		}
		if self.solver.iterations == 0 {
			return Err(ConfigValidationError::InvalidValue {
				field: "solver.iterations".to_string(),
				reason: "must be greater than zero".to_string(),
			});
		}
		if self.solver.slippage_budgets_bps.is_empty() {
			return Err(ConfigValidationError::InvalidValue {
				field: "solver.slippage_budgets_bps".to_string(),
				reason: "at least one slippage budget is required".to_string(),
			});
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		assert!(Settings::default().validate().is_ok());
	}

	#[test]
	fn test_default_constants_match_contract() {
		let settings = Settings::default();
		assert_eq!(settings.retry.max_retries, 3);
		assert_eq!(settings.retry.base_delay_ms, 1000);
		assert_eq!(settings.retry.max_delay_ms, 30_000);
		assert_eq!(settings.cache.ttl_ms, 60_000);
		assert_eq!(settings.solver.iterations, 25);
		assert_eq!(settings.solver.slippage_budgets_bps, vec![50, 100]);
	}

	#[test]
	fn test_zero_window_rejected() {
		let mut settings = Settings::default();
		settings.rate_limit.window_ms = 0;
		assert!(settings.validate().is_err());
	}

	#[test]
	fn test_disabled_limiter_skips_window_check() {
		let mut settings = Settings::default();
		settings.rate_limit.enabled = false;
		settings.rate_limit.window_ms = 0;
		assert!(settings.validate().is_ok());
	}

	#[test]
	fn test_empty_budgets_rejected() {
		let mut settings = Settings::default();
		settings.solver.slippage_budgets_bps.clear();
		assert!(settings.validate().is_err());
	}

	#[test]
	fn test_settings_deserialize_from_partial_json() {
		let json = r#"{"retry": {"max_retries": 1, "base_delay_ms": 10, "max_delay_ms": 100, "request_timeout_ms": 500, "transport_timeout_ms": 1000}}"#;
		let settings: Settings = serde_json::from_str(json).unwrap();
		assert_eq!(settings.retry.max_retries, 1);
		// Unspecified sections fall back to defaults
		assert_eq!(settings.rate_limit.max_requests, 10);
	}
}
