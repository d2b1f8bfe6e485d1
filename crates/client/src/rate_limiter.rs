//! Outbound request throttling
//!
//! Admits at most `max_requests` request initiations per rolling window,
//! serving waiters in FIFO order. Server-advertised quota feedback shrinks
//! the local window so throttling kicks in before the server rejects.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::debug;

use xbridge_config::RateLimitSettings;
use xbridge_types::ServerRateInfo;

/// Minimum reschedule interval for waiters, in milliseconds
const MIN_RETRY_INTERVAL_MS: u64 = 10;

#[derive(Debug)]
struct WindowState {
	window_start: DateTime<Utc>,
	request_count: u32,
	/// Next ticket to hand out; tickets are served strictly in order
	next_ticket: u64,
	next_to_serve: u64,
	last_server_info: Option<ServerRateInfo>,
}

/// Windowed FIFO rate limiter
///
/// `acquire` never fails; it only ever delays the caller. The lock is held
/// only to inspect or mutate window accounting, never across a sleep.
#[derive(Debug)]
pub struct RateLimiter {
	settings: RateLimitSettings,
	state: Mutex<WindowState>,
}

impl RateLimiter {
	pub fn new(settings: RateLimitSettings) -> Self {
		Self {
			settings,
			state: Mutex::new(WindowState {
				window_start: Utc::now(),
				request_count: 0,
				next_ticket: 0,
				next_to_serve: 0,
				last_server_info: None,
			}),
		}
	}

	/// Limiter that admits everything immediately
	pub fn disabled() -> Self {
		Self::new(RateLimitSettings {
			enabled: false,
			..RateLimitSettings::default()
		})
	}

	/// Suspend until this caller is permitted to issue a request
	pub async fn acquire(&self) {
		if !self.settings.enabled {
			return;
		}

		let ticket = {
			let mut state = self.state.lock().await;
			let ticket = state.next_ticket;
			state.next_ticket += 1;
			ticket
		};

		loop {
			{
				let mut state = self.state.lock().await;
				self.roll_window(&mut state);

				if state.next_to_serve == ticket
					&& state.request_count < self.settings.max_requests
				{
					state.request_count += 1;
					state.next_to_serve += 1;
					return;
				}
			}

			sleep(Duration::from_millis(self.retry_interval_ms())).await;
		}
	}

	/// Feed server-reported quota back into the window accounting
	///
	/// When the server says less than half the local budget remains, the
	/// local count is raised to mirror the server's consumed quota and the
	/// window start is pulled earlier so the window ends at the server's
	/// reset boundary.
	pub async fn update_from_server(&self, info: ServerRateInfo) {
		if !self.settings.enabled {
			return;
		}

		let mut state = self.state.lock().await;
		state.last_server_info = Some(info);

		if info.remaining >= self.settings.max_requests / 2 {
			return;
		}

		let consumed = info
			.limit
			.saturating_sub(info.remaining)
			.min(self.settings.max_requests);
		state.request_count = state.request_count.max(consumed);

		let now = Utc::now();
		if let Some(reset_at) = DateTime::<Utc>::from_timestamp(info.reset_at_epoch_s as i64, 0) {
			let until_reset_ms = (reset_at - now)
				.num_milliseconds()
				.clamp(0, self.settings.window_ms as i64);
			let elapsed_ms = self.settings.window_ms as i64 - until_reset_ms;
			state.window_start = now - ChronoDuration::milliseconds(elapsed_ms);

			debug!(
				remaining = info.remaining,
				until_reset_ms, "server quota low, shrinking rate-limit window"
			);
		}
	}

	/// Last server feedback observed, for diagnostics
	pub async fn last_server_info(&self) -> Option<ServerRateInfo> {
		self.state.lock().await.last_server_info
	}

	fn roll_window(&self, state: &mut WindowState) {
		let now = Utc::now();
		let elapsed_ms = (now - state.window_start).num_milliseconds();
		if elapsed_ms >= self.settings.window_ms as i64 {
			state.window_start = now;
			state.request_count = 0;
		}
	}

	fn retry_interval_ms(&self) -> u64 {
		let per_slot = self.settings.window_ms / self.settings.max_requests.max(1) as u64;
		per_slot.max(MIN_RETRY_INTERVAL_MS)
	}
}
