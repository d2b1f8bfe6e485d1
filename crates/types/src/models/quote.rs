//! Quote, rate, liquidity, and snapshot result models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Amount, Asset, Route};

/// Single simulated exchange result for a probe amount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
	pub amount_in: Amount,
	pub amount_out: Amount,
}

impl Quote {
	pub fn new(amount_in: Amount, amount_out: Amount) -> Self {
		Self {
			amount_in,
			amount_out,
		}
	}
}

/// Rate answer for one route and notional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateResult {
	pub route: Route,
	pub amount_in: Amount,
	pub amount_out: Amount,
	/// Destination units per source unit, both decimal-normalized
	pub effective_rate: f64,
	pub total_fees_usd: f64,
	pub quoted_at: DateTime<Utc>,
	/// True when this entry was derived from the static fee model instead of
	/// a live quote
	pub estimated: bool,
}

/// Maximum input amount that stays within one slippage budget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiquidityThreshold {
	pub max_amount_in: Amount,
	pub slippage_bps: u32,
	pub estimated: bool,
}

/// Liquidity depth answer for one route, thresholds ordered by ascending
/// slippage budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLiquidity {
	pub route: Route,
	pub thresholds: Vec<LiquidityThreshold>,
}

/// Aggregate volume for one reporting window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeResult {
	/// Window label, e.g. "1d", "7d", "30d"
	pub window: String,
	pub volume_usd: f64,
	pub estimated: bool,
}

/// Request for a full aggregation snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRequest {
	pub request_id: String,
	pub routes: Vec<Route>,
	/// Raw smallest-unit input amounts to quote per route
	pub notionals: Vec<Amount>,
	/// Volume reporting windows
	pub windows: Vec<String>,
}

impl SnapshotRequest {
	pub fn new(routes: Vec<Route>, notionals: Vec<Amount>, windows: Vec<String>) -> Self {
		Self {
			request_id: Uuid::new_v4().to_string(),
			routes,
			notionals,
			windows,
		}
	}
}

/// Full aggregation answer; every category is populated, falling back to
/// estimates item-by-item when the upstream is unavailable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
	pub request_id: String,
	pub volumes: Vec<VolumeResult>,
	pub rates: Vec<RateResult>,
	pub liquidity: Vec<RouteLiquidity>,
	pub assets: Vec<Asset>,
	pub generated_at: DateTime<Utc>,
}

/// Health probe answer; always reports available
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingStatus {
	pub status: String,
	pub timestamp: DateTime<Utc>,
}

impl PingStatus {
	pub fn available() -> Self {
		Self {
			status: "available".to_string(),
			timestamp: Utc::now(),
		}
	}
}
