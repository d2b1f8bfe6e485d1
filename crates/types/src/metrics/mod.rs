//! Call-outcome and latency metrics
//!
//! Tracks upstream call outcomes, a bounded rolling latency sample, and cache
//! effectiveness. Snapshots are derived on demand; nothing is persisted.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::errors::CallOutcome;

/// Number of most-recent latencies retained for percentile computation
const ROLLING_SAMPLE_SIZE: usize = 1000;

/// Counters for upstream API call outcomes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiCallStats {
	pub total: u64,
	pub success: u64,
	pub failures: u64,
	pub timeouts: u64,
	pub rate_limited: u64,
}

/// Latency distribution over the rolling sample, in milliseconds
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LatencyStats {
	pub min_ms: u64,
	pub max_ms: u64,
	pub avg_ms: f64,
	pub p95_ms: u64,
	pub p99_ms: u64,
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub hit_rate: f64,
}

/// Point-in-time view of all collected metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
	pub api_calls: ApiCallStats,
	pub latency: LatencyStats,
	pub cache: CacheStats,
}

#[derive(Debug, Default)]
struct MetricsInner {
	api_calls: ApiCallStats,
	latencies_ms: VecDeque<u64>,
	cache_hits: u64,
	cache_misses: u64,
}

/// Collector shared by the requester, cache, and orchestrator
///
/// The interior lock is held only for the duration of a counter update or
/// snapshot copy, never across an awaited call.
#[derive(Debug, Default)]
pub struct MetricsCollector {
	inner: Mutex<MetricsInner>,
}

impl MetricsCollector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record one upstream call attempt with its outcome and latency
	pub fn record_call(&self, outcome: CallOutcome, latency_ms: u64) {
		let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

		inner.api_calls.total += 1;
		match outcome {
			CallOutcome::Success => inner.api_calls.success += 1,
			CallOutcome::Failure => inner.api_calls.failures += 1,
			CallOutcome::Timeout => inner.api_calls.timeouts += 1,
			CallOutcome::RateLimited => inner.api_calls.rate_limited += 1,
		}

		if inner.latencies_ms.len() == ROLLING_SAMPLE_SIZE {
			inner.latencies_ms.pop_front();
		}
		inner.latencies_ms.push_back(latency_ms);
	}

	/// Record a cache lookup result
	pub fn record_cache(&self, hit: bool) {
		let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
		if hit {
			inner.cache_hits += 1;
		} else {
			inner.cache_misses += 1;
		}
	}

	/// Derive a snapshot from the current counters and rolling sample
	pub fn snapshot(&self) -> MetricsSnapshot {
		let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

		let latency = if inner.latencies_ms.is_empty() {
			LatencyStats::default()
		} else {
			let mut sorted: Vec<u64> = inner.latencies_ms.iter().copied().collect();
			sorted.sort_unstable();

			let sum: u64 = sorted.iter().sum();
			LatencyStats {
				min_ms: sorted[0],
				max_ms: sorted[sorted.len() - 1],
				avg_ms: sum as f64 / sorted.len() as f64,
				p95_ms: percentile(&sorted, 0.95),
				p99_ms: percentile(&sorted, 0.99),
			}
		};

		let cache_total = inner.cache_hits + inner.cache_misses;
		let cache = CacheStats {
			hits: inner.cache_hits,
			misses: inner.cache_misses,
			hit_rate: if cache_total > 0 {
				inner.cache_hits as f64 / cache_total as f64
			} else {
				0.0
			},
		};

		MetricsSnapshot {
			api_calls: inner.api_calls.clone(),
			latency,
			cache,
		}
	}
}

/// Nearest-rank percentile over an ascending-sorted sample
fn percentile(sorted: &[u64], quantile: f64) -> u64 {
	let index = ((sorted.len() - 1) as f64 * quantile).round() as usize;
	sorted[index.min(sorted.len() - 1)]
}
