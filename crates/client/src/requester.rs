//! Retrying HTTP requester
//!
//! Performs one logical request with bounded retries and exponential backoff.
//! Rate-limit responses honor the server's `Retry-After`; successful responses
//! feed quota headers back into the rate limiter.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

use xbridge_config::RetrySettings;
use xbridge_types::{
	CallOutcome, ClientError, ClientResult, HttpTransport, MetricsCollector, TransportRequest,
	TransportResponse,
};

use crate::rate_limiter::RateLimiter;

/// Requester issuing one logical call as up to `max_retries + 1` attempts
pub struct RetryingRequester {
	transport: Arc<dyn HttpTransport>,
	rate_limiter: Arc<RateLimiter>,
	metrics: Arc<MetricsCollector>,
	settings: RetrySettings,
}

impl RetryingRequester {
	pub fn new(
		transport: Arc<dyn HttpTransport>,
		rate_limiter: Arc<RateLimiter>,
		metrics: Arc<MetricsCollector>,
		settings: RetrySettings,
	) -> Self {
		Self {
			transport,
			rate_limiter,
			metrics,
			settings,
		}
	}

	/// Perform the request, retrying every failure until the attempt budget
	/// is exhausted; the last observed error is returned
	pub async fn send(&self, request: &TransportRequest) -> ClientResult<TransportResponse> {
		let mut last_error: Option<ClientError> = None;

		for attempt in 0..=self.settings.max_retries {
			// Every physical attempt is a new outbound request and goes
			// through the limiter
			self.rate_limiter.acquire().await;

			let started = Instant::now();
			let outcome = self.attempt(request.clone()).await;
			let latency_ms = started.elapsed().as_millis() as u64;

			match outcome {
				Ok(response) => {
					self.metrics.record_call(CallOutcome::Success, latency_ms);
					if let Some(info) = response.rate_limit_info() {
						self.rate_limiter.update_from_server(info).await;
					}
					return Ok(response);
				},
				Err(error) => {
					self.metrics.record_call(error.outcome(), latency_ms);

					if attempt < self.settings.max_retries {
						let delay_ms = match &error {
							ClientError::RateLimited {
								retry_after_ms: Some(ms),
							} => *ms,
							_ => self.backoff_delay_ms(attempt),
						};
						debug!(
							attempt = attempt + 1,
							delay_ms,
							%error,
							url = %request.url,
							"request attempt failed, backing off"
						);
						sleep(Duration::from_millis(delay_ms)).await;
					} else {
						warn!(
							attempts = attempt + 1,
							%error,
							url = %request.url,
							"request failed after exhausting retry budget"
						);
					}

					last_error = Some(error);
				},
			}
		}

		Err(last_error.unwrap_or(ClientError::Network {
			reason: "no attempts were made".to_string(),
		}))
	}

	/// One physical attempt: transport call guarded by the per-request
	/// timeout, with the response status mapped into the error taxonomy
	async fn attempt(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
		let timeout_ms = self.settings.request_timeout_ms;
		let response = match timeout(
			Duration::from_millis(timeout_ms),
			self.transport.execute(request),
		)
		.await
		{
			Ok(result) => result?,
			Err(_) => return Err(ClientError::Timeout { timeout_ms }),
		};

		if response.is_success() {
			return Ok(response);
		}

		let retry_after_ms = response.retry_after_ms();
		Err(ClientError::from_http_status(response.status, retry_after_ms))
	}

	/// Exponential backoff without jitter, capped at `max_delay_ms`
	fn backoff_delay_ms(&self, attempt: u32) -> u64 {
		let factor = 1u64 << attempt.min(20);
		self.settings
			.base_delay_ms
			.saturating_mul(factor)
			.min(self.settings.max_delay_ms)
	}
}
