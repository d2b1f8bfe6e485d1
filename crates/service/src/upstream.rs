//! Upstream fetch path
//!
//! Composes the circuit breaker and retrying requester over a prioritized
//! descriptor chain: descriptors are tried in order until one returns a
//! success status, and the last failure escapes if none does.

use serde_json::Value;
use tracing::{debug, warn};

use xbridge_client::{CircuitBreaker, RetryingRequester};
use xbridge_types::{ClientError, ClientResult};

use crate::endpoints::RequestDescriptor;

/// Resilient fetch client for one upstream dependency
pub struct UpstreamClient {
	requester: RetryingRequester,
	breaker: CircuitBreaker,
}

impl UpstreamClient {
	pub fn new(requester: RetryingRequester, breaker: CircuitBreaker) -> Self {
		Self { requester, breaker }
	}

	/// Fetch one logical document, trying each descriptor in priority order
	pub async fn fetch(&self, descriptors: &[RequestDescriptor]) -> ClientResult<Value> {
		let mut last_error: Option<ClientError> = None;

		for descriptor in descriptors {
			let outcome = self
				.breaker
				.execute(|| self.requester.send(&descriptor.request))
				.await;

			match outcome {
				Ok(response) => {
					debug!(label = %descriptor.label, "upstream fetch succeeded");
					return Ok(response.body);
				},
				Err(error) => {
					let circuit_open = matches!(error, ClientError::CircuitOpen { .. });
					warn!(
						label = %descriptor.label,
						%error,
						"upstream fetch attempt failed"
					);
					last_error = Some(error);

					// With the circuit open every remaining descriptor would
					// fail fast the same way
					if circuit_open {
						break;
					}
				},
			}
		}

		Err(last_error.unwrap_or(ClientError::Validation {
			reason: "no request descriptors provided".to_string(),
		}))
	}

	/// Breaker state for diagnostics
	pub async fn circuit_state(&self) -> xbridge_client::CircuitState {
		self.breaker.state().await
	}
}
