//! Error taxonomy for upstream calls and aggregation

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced while talking to the upstream API
#[derive(Error, Debug, Clone)]
pub enum ClientError {
	#[error("network error: {reason}")]
	Network { reason: String },

	#[error("request timed out after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("rate limited by upstream (retry after {retry_after_ms:?}ms)")]
	RateLimited { retry_after_ms: Option<u64> },

	#[error("upstream server error: HTTP {status}")]
	Server { status: u16 },

	#[error("validation failed: {reason}")]
	Validation { reason: String },

	#[error("circuit open until {open_until}")]
	CircuitOpen { open_until: DateTime<Utc> },
}

impl ClientError {
	/// Classify a non-success HTTP status into the error taxonomy
	pub fn from_http_status(status: u16, retry_after_ms: Option<u64>) -> Self {
		match status {
			429 => ClientError::RateLimited { retry_after_ms },
			500..=599 => ClientError::Server { status },
			_ => ClientError::Network {
				reason: format!("unexpected HTTP status {}", status),
			},
		}
	}

	/// Whether the retrying requester should attempt this call again
	///
	/// Validation failures and open circuits are deterministic; retrying them
	/// cannot succeed within the same attempt budget.
	pub fn is_retryable(&self) -> bool {
		!matches!(
			self,
			ClientError::Validation { .. } | ClientError::CircuitOpen { .. }
		)
	}

	/// HTTP status carried by the error, when one exists
	pub fn status_code(&self) -> Option<u16> {
		match self {
			ClientError::Server { status } => Some(*status),
			ClientError::RateLimited { .. } => Some(429),
			_ => None,
		}
	}

	/// Metrics classification for this failure
	pub fn outcome(&self) -> CallOutcome {
		match self {
			ClientError::Timeout { .. } => CallOutcome::Timeout,
			ClientError::RateLimited { .. } => CallOutcome::RateLimited,
			_ => CallOutcome::Failure,
		}
	}
}

/// Outcome classification recorded per API call attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
	Success,
	Failure,
	Timeout,
	RateLimited,
}

/// Errors surfaced to callers of the orchestrator
///
/// Per-item upstream failures never reach here; they are replaced by fallback
/// values. Only input validation and escaping internal errors become an
/// aggregate error.
#[derive(Error, Debug)]
pub enum AggregatorError {
	#[error("invalid snapshot request: {reason}")]
	InvalidRequest { reason: String },

	#[error("internal error: {reason}")]
	Internal { reason: String },
}

impl From<ClientError> for AggregatorError {
	fn from(err: ClientError) -> Self {
		match err {
			ClientError::Validation { reason } => AggregatorError::InvalidRequest { reason },
			other => AggregatorError::Internal {
				reason: other.to_string(),
			},
		}
	}
}

pub type ClientResult<T> = Result<T, ClientError>;
pub type AggregatorResult<T> = Result<T, AggregatorError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_http_status_classification() {
		assert!(matches!(
			ClientError::from_http_status(429, Some(1000)),
			ClientError::RateLimited {
				retry_after_ms: Some(1000)
			}
		));
		assert!(matches!(
			ClientError::from_http_status(503, None),
			ClientError::Server { status: 503 }
		));
		assert!(matches!(
			ClientError::from_http_status(404, None),
			ClientError::Network { .. }
		));
	}

	#[test]
	fn test_retryability() {
		assert!(ClientError::Server { status: 500 }.is_retryable());
		assert!(ClientError::Timeout { timeout_ms: 100 }.is_retryable());
		assert!(ClientError::RateLimited {
			retry_after_ms: None
		}
		.is_retryable());
		assert!(!ClientError::Validation {
			reason: "bad route".to_string()
		}
		.is_retryable());
		assert!(!ClientError::CircuitOpen {
			open_until: Utc::now()
		}
		.is_retryable());
	}

	#[test]
	fn test_status_code_extraction() {
		assert_eq!(ClientError::Server { status: 502 }.status_code(), Some(502));
		assert_eq!(
			ClientError::RateLimited {
				retry_after_ms: None
			}
			.status_code(),
			Some(429)
		);
		assert_eq!(
			ClientError::Network {
				reason: "dns".to_string()
			}
			.status_code(),
			None
		);
	}

	#[test]
	fn test_outcome_classification() {
		assert_eq!(
			ClientError::Timeout { timeout_ms: 5 }.outcome(),
			CallOutcome::Timeout
		);
		assert_eq!(
			ClientError::RateLimited {
				retry_after_ms: None
			}
			.outcome(),
			CallOutcome::RateLimited
		);
		assert_eq!(
			ClientError::Server { status: 500 }.outcome(),
			CallOutcome::Failure
		);
	}

	#[test]
	fn test_validation_error_becomes_invalid_request() {
		let err: AggregatorError = ClientError::Validation {
			reason: "empty routes".to_string(),
		}
		.into();
		assert!(matches!(err, AggregatorError::InvalidRequest { .. }));
	}
}
