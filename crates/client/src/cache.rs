//! Short-lived memoization for expensive aggregate lookups
//!
//! Entries live for a fixed per-instance TTL and are evicted lazily when an
//! expired entry is read. There is no background sweep.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use tracing::debug;

use xbridge_types::MetricsCollector;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
	value: V,
	expires_at: DateTime<Utc>,
}

/// TTL cache keyed by string, reporting hits and misses to the shared
/// metrics collector
#[derive(Debug)]
pub struct TtlCache<V: Clone> {
	entries: DashMap<String, CacheEntry<V>>,
	ttl: ChronoDuration,
	metrics: Arc<MetricsCollector>,
}

impl<V: Clone> TtlCache<V> {
	pub fn new(ttl_ms: u64, metrics: Arc<MetricsCollector>) -> Self {
		Self {
			entries: DashMap::new(),
			ttl: ChronoDuration::milliseconds(ttl_ms as i64),
			metrics,
		}
	}

	/// Return the stored value when it has not expired; an expired entry is
	/// removed and reported as a miss
	pub fn get(&self, key: &str) -> Option<V> {
		{
			if let Some(entry) = self.entries.get(key) {
				if Utc::now() < entry.expires_at {
					self.metrics.record_cache(true);
					return Some(entry.value.clone());
				}
			}
		}

		// Lazy eviction: only remove if it is still the expired entry
		let removed = self
			.entries
			.remove_if(key, |_, entry| Utc::now() >= entry.expires_at);
		if removed.is_some() {
			debug!(key, "evicted expired cache entry");
		}

		self.metrics.record_cache(false);
		None
	}

	/// Store a value with expiry `now + ttl`
	pub fn set(&self, key: &str, value: V) {
		self.entries.insert(
			key.to_string(),
			CacheEntry {
				value,
				expires_at: Utc::now() + self.ttl,
			},
		);
	}

	/// Drop an entry explicitly
	pub fn evict(&self, key: &str) {
		self.entries.remove(key);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::time::{sleep, Duration};

	fn cache(ttl_ms: u64) -> (TtlCache<String>, Arc<MetricsCollector>) {
		let metrics = Arc::new(MetricsCollector::new());
		(TtlCache::new(ttl_ms, Arc::clone(&metrics)), metrics)
	}

	#[tokio::test]
	async fn test_set_then_get_returns_value() {
		let (cache, metrics) = cache(60_000);

		cache.set("volumes:1d", "42".to_string());
		assert_eq!(cache.get("volumes:1d"), Some("42".to_string()));

		let snapshot = metrics.snapshot();
		assert_eq!(snapshot.cache.hits, 1);
		assert_eq!(snapshot.cache.misses, 0);
	}

	#[tokio::test]
	async fn test_expired_entry_is_evicted_on_read() {
		let (cache, metrics) = cache(50);

		cache.set("volumes:1d", "42".to_string());
		sleep(Duration::from_millis(80)).await;

		assert_eq!(cache.get("volumes:1d"), None);
		// The entry is gone, not merely hidden
		assert!(cache.is_empty());

		let snapshot = metrics.snapshot();
		assert_eq!(snapshot.cache.hits, 0);
		assert_eq!(snapshot.cache.misses, 1);
	}

	#[tokio::test]
	async fn test_missing_key_is_a_miss() {
		let (cache, metrics) = cache(60_000);
		assert_eq!(cache.get("absent"), None);
		assert_eq!(metrics.snapshot().cache.misses, 1);
	}

	#[tokio::test]
	async fn test_set_refreshes_expiry() {
		let (cache, _) = cache(100);

		cache.set("key", "v1".to_string());
		sleep(Duration::from_millis(60)).await;
		cache.set("key", "v2".to_string());
		sleep(Duration::from_millis(60)).await;

		// 120ms after the first set, but only 60ms after the refresh
		assert_eq!(cache.get("key"), Some("v2".to_string()));
	}

	#[tokio::test]
	async fn test_explicit_eviction() {
		let (cache, _) = cache(60_000);
		cache.set("key", "value".to_string());
		cache.evict("key");
		assert_eq!(cache.get("key"), None);
	}
}
