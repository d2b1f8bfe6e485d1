//! xbridge Types
//!
//! Core domain models, error taxonomy, transport abstraction, and metrics
//! types shared by every crate in the aggregator workspace.

pub mod errors;
pub mod metrics;
pub mod models;
pub mod transport;

pub use errors::{AggregatorError, AggregatorResult, CallOutcome, ClientError, ClientResult};
pub use metrics::{ApiCallStats, CacheStats, LatencyStats, MetricsCollector, MetricsSnapshot};
pub use models::{
	Amount, Asset, LiquidityThreshold, PingStatus, Quote, RateResult, Route, RouteLiquidity,
	Snapshot, SnapshotRequest, VolumeResult,
};
pub use transport::{
	HttpMethod, HttpTransport, ServerRateInfo, TransportRequest, TransportResponse,
};

// Re-export external dependencies used in public signatures for convenience
pub use alloy_primitives::U256;
pub use chrono;
pub use serde_json;
