//! Circuit breaker for automatic failure protection
//!
//! Wraps a fallible upstream operation and fails fast while the upstream is
//! judged unhealthy, probing for recovery after a cooldown.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use xbridge_config::CircuitBreakerSettings;
use xbridge_types::{ClientError, ClientResult};

/// Circuit breaker state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
	/// Normal operation - calls pass through
	Closed,
	/// Failing fast - calls are rejected without reaching the upstream
	Open,
	/// Testing recovery - a single trial probe at a time is admitted
	HalfOpen,
}

#[derive(Debug)]
struct BreakerState {
	state: CircuitState,
	failure_count: u32,
	success_count: u32,
	last_failure_time: Option<DateTime<Utc>>,
	last_reset_time: DateTime<Utc>,
	probe_in_flight: bool,
}

/// Circuit breaker guarding one upstream dependency
///
/// `execute` is the sole entry point: it runs the wrapped operation and
/// updates counters from its outcome, or rejects with `CircuitOpen` without
/// invoking the operation at all.
#[derive(Debug)]
pub struct CircuitBreaker {
	settings: CircuitBreakerSettings,
	state: Mutex<BreakerState>,
}

impl CircuitBreaker {
	pub fn new(settings: CircuitBreakerSettings) -> Self {
		Self {
			settings,
			state: Mutex::new(BreakerState {
				state: CircuitState::Closed,
				failure_count: 0,
				success_count: 0,
				last_failure_time: None,
				last_reset_time: Utc::now(),
				probe_in_flight: false,
			}),
		}
	}

	/// Current state, primarily for tests and diagnostics
	pub async fn state(&self) -> CircuitState {
		self.state.lock().await.state
	}

	/// Run `operation` through the breaker
	pub async fn execute<T, F, Fut>(&self, operation: F) -> ClientResult<T>
	where
		F: FnOnce() -> Fut,
		Fut: std::future::Future<Output = ClientResult<T>>,
	{
		if !self.settings.enabled {
			return operation().await;
		}

		self.admit().await?;

		let result = operation().await;

		let mut state = self.state.lock().await;
		if state.state == CircuitState::HalfOpen {
			state.probe_in_flight = false;
		}
		match &result {
			Ok(_) => self.on_success(&mut state),
			Err(_) => self.on_failure(&mut state),
		}

		result
	}

	/// Decide whether a call may proceed, transitioning OPEN -> HALF_OPEN
	/// when the cooldown has elapsed
	async fn admit(&self) -> ClientResult<()> {
		let mut state = self.state.lock().await;
		self.forgive_stale_failures(&mut state);

		match state.state {
			CircuitState::Closed => Ok(()),
			CircuitState::Open => {
				let open_until = self.open_until(&state);
				if Utc::now() >= open_until {
					info!("circuit cooldown elapsed, admitting trial probe");
					state.state = CircuitState::HalfOpen;
					state.success_count = 0;
					state.probe_in_flight = true;
					Ok(())
				} else {
					debug!(%open_until, "circuit open, rejecting call");
					Err(ClientError::CircuitOpen { open_until })
				}
			},
			CircuitState::HalfOpen => {
				if state.probe_in_flight {
					// One probe at a time while testing recovery
					Err(ClientError::CircuitOpen {
						open_until: self.open_until(&state),
					})
				} else {
					state.probe_in_flight = true;
					Ok(())
				}
			},
		}
	}

	fn on_success(&self, state: &mut BreakerState) {
		match state.state {
			CircuitState::Closed => {
				state.failure_count = 0;
			},
			CircuitState::HalfOpen => {
				state.success_count += 1;
				if state.success_count >= self.settings.success_threshold {
					info!(
						successes = state.success_count,
						"circuit closed after successful recovery probes"
					);
					state.state = CircuitState::Closed;
					state.failure_count = 0;
					state.success_count = 0;
				}
			},
			CircuitState::Open => {},
		}
	}

	fn on_failure(&self, state: &mut BreakerState) {
		let now = Utc::now();
		match state.state {
			CircuitState::HalfOpen => {
				warn!("trial probe failed, reopening circuit");
				state.state = CircuitState::Open;
				state.last_failure_time = Some(now);
				state.success_count = 0;
				state.failure_count += 1;
			},
			CircuitState::Closed => {
				state.failure_count += 1;
				state.last_failure_time = Some(now);
				if state.failure_count >= self.settings.failure_threshold {
					warn!(
						consecutive_failures = state.failure_count,
						"failure threshold reached, opening circuit"
					);
					state.state = CircuitState::Open;
				}
			},
			CircuitState::Open => {},
		}
	}

	/// Forgive accumulated failures after the reset window, independent of
	/// state, so stale sporadic failures do not lower the trip threshold
	fn forgive_stale_failures(&self, state: &mut BreakerState) {
		let now = Utc::now();
		let reset_window = ChronoDuration::milliseconds(self.settings.reset_timeout_ms as i64);
		if now - state.last_reset_time >= reset_window {
			if state.failure_count > 0 {
				debug!(
					forgiven = state.failure_count,
					"forgiving stale failures after reset window"
				);
				state.failure_count = 0;
			}
			state.last_reset_time = now;
		}
	}

	fn open_until(&self, state: &BreakerState) -> DateTime<Utc> {
		let open_timeout = ChronoDuration::milliseconds(self.settings.open_timeout_ms as i64);
		state.last_failure_time.unwrap_or_else(Utc::now) + open_timeout
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};
	use tokio::time::{sleep, Duration};

	fn settings(failure_threshold: u32, open_timeout_ms: u64) -> CircuitBreakerSettings {
		CircuitBreakerSettings {
			enabled: true,
			failure_threshold,
			success_threshold: 2,
			open_timeout_ms,
			reset_timeout_ms: 60_000,
		}
	}

	async fn fail(breaker: &CircuitBreaker) -> ClientResult<()> {
		breaker
			.execute(|| async { Err(ClientError::Server { status: 500 }) })
			.await
	}

	async fn succeed(breaker: &CircuitBreaker) -> ClientResult<()> {
		breaker.execute(|| async { Ok(()) }).await
	}

	#[tokio::test]
	async fn test_opens_after_consecutive_failures() {
		let breaker = CircuitBreaker::new(settings(3, 60_000));

		for _ in 0..3 {
			let _ = fail(&breaker).await;
		}
		assert_eq!(breaker.state().await, CircuitState::Open);

		// Rejected without invoking the operation
		let calls = AtomicU32::new(0);
		let result = breaker
			.execute(|| async {
				calls.fetch_add(1, Ordering::SeqCst);
				Ok(())
			})
			.await;
		assert!(matches!(result, Err(ClientError::CircuitOpen { .. })));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_success_resets_consecutive_count() {
		let breaker = CircuitBreaker::new(settings(3, 60_000));

		let _ = fail(&breaker).await;
		let _ = fail(&breaker).await;
		succeed(&breaker).await.unwrap();
		let _ = fail(&breaker).await;
		let _ = fail(&breaker).await;

		// Never three in a row, so the circuit stays closed
		assert_eq!(breaker.state().await, CircuitState::Closed);
	}

	#[tokio::test]
	async fn test_half_open_after_cooldown_then_closes() {
		let breaker = CircuitBreaker::new(settings(2, 50));

		let _ = fail(&breaker).await;
		let _ = fail(&breaker).await;
		assert_eq!(breaker.state().await, CircuitState::Open);

		sleep(Duration::from_millis(80)).await;

		// First probe is admitted and succeeds; breaker stays half-open
		// until success_threshold consecutive successes
		succeed(&breaker).await.unwrap();
		assert_eq!(breaker.state().await, CircuitState::HalfOpen);

		succeed(&breaker).await.unwrap();
		assert_eq!(breaker.state().await, CircuitState::Closed);
	}

	#[tokio::test]
	async fn test_half_open_failure_reopens() {
		let breaker = CircuitBreaker::new(settings(2, 50));

		let _ = fail(&breaker).await;
		let _ = fail(&breaker).await;
		sleep(Duration::from_millis(80)).await;

		let _ = fail(&breaker).await;
		assert_eq!(breaker.state().await, CircuitState::Open);

		// Fails fast again until the next cooldown elapses
		let result = succeed(&breaker).await;
		assert!(matches!(result, Err(ClientError::CircuitOpen { .. })));
	}

	#[tokio::test]
	async fn test_single_probe_admitted_while_half_open() {
		let breaker = std::sync::Arc::new(CircuitBreaker::new(settings(2, 50)));

		let _ = fail(&breaker).await;
		let _ = fail(&breaker).await;
		sleep(Duration::from_millis(80)).await;

		// Long-running probe occupies the half-open slot
		let probe_breaker = std::sync::Arc::clone(&breaker);
		let probe = tokio::spawn(async move {
			probe_breaker
				.execute(|| async {
					sleep(Duration::from_millis(100)).await;
					Ok::<(), ClientError>(())
				})
				.await
		});

		sleep(Duration::from_millis(30)).await;
		assert_eq!(breaker.state().await, CircuitState::HalfOpen);

		// A second call during the probe is rejected
		let result = succeed(&breaker).await;
		assert!(matches!(result, Err(ClientError::CircuitOpen { .. })));

		probe.await.unwrap().unwrap();
	}

	#[tokio::test]
	async fn test_reset_timeout_forgives_stale_failures() {
		let breaker = CircuitBreaker::new(CircuitBreakerSettings {
			enabled: true,
			failure_threshold: 3,
			success_threshold: 2,
			open_timeout_ms: 60_000,
			reset_timeout_ms: 50,
		});

		let _ = fail(&breaker).await;
		let _ = fail(&breaker).await;
		sleep(Duration::from_millis(80)).await;

		// The two stale failures were forgiven; two fresh ones do not trip
		// the threshold of three
		let _ = fail(&breaker).await;
		let _ = fail(&breaker).await;
		assert_eq!(breaker.state().await, CircuitState::Closed);
	}

	#[tokio::test]
	async fn test_disabled_breaker_passes_through() {
		let breaker = CircuitBreaker::new(CircuitBreakerSettings {
			enabled: false,
			..settings(1, 60_000)
		});

		for _ in 0..10 {
			let _ = fail(&breaker).await;
		}
		// Still executes operations
		succeed(&breaker).await.unwrap();
	}
}
