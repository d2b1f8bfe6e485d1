//! Domain models for routes, quotes, and aggregation results

pub mod amount;
pub mod asset;
pub mod quote;
pub mod route;

pub use amount::Amount;
pub use asset::Asset;
pub use quote::{
	LiquidityThreshold, PingStatus, Quote, RateResult, RouteLiquidity, Snapshot, SnapshotRequest,
	VolumeResult,
};
pub use route::Route;
