//! Static fallback estimates
//!
//! The numbers substituted when the upstream is unreachable are policy, not
//! mechanism: they live behind a provider trait so they can be revised or
//! replaced without touching the resilience core.

use alloy_primitives::U256;

use xbridge_types::{Amount, Asset, Route};

/// Source of fallback values and fee-model constants
#[cfg_attr(test, mockall::automock)]
pub trait EstimateProvider: Send + Sync {
	/// Estimated aggregate volume for a reporting window, in USD
	fn fallback_volume_usd(&self, window: &str) -> f64;

	/// Estimated liquidity depth for a route and slippage budget, in the
	/// source asset's raw units
	fn fallback_liquidity(&self, route: &Route, budget_bps: u32) -> Amount;

	/// Bridge fee assumed by the fallback rate model, in basis points
	fn fee_bps(&self) -> u32;

	/// USD price per whole unit of an asset
	fn usd_price(&self, asset: &Asset) -> f64;

	/// Asset table substituted when the live list cannot be fetched
	fn fallback_assets(&self) -> Vec<Asset>;
}

/// Built-in estimate tables
#[derive(Debug, Clone, Default)]
pub struct StaticEstimates;

impl StaticEstimates {
	pub fn new() -> Self {
		Self
	}
}

impl EstimateProvider for StaticEstimates {
	fn fallback_volume_usd(&self, window: &str) -> f64 {
		match window {
			"1d" => 5_000_000.0,
			"7d" => 35_000_000.0,
			"30d" => 150_000_000.0,
			_ => 1_000_000.0,
		}
	}

	fn fallback_liquidity(&self, route: &Route, budget_bps: u32) -> Amount {
		// Whole source-token units, deeper for looser budgets
		let units: u64 = if budget_bps <= 50 {
			100_000
		} else if budget_bps <= 100 {
			250_000
		} else {
			500_000
		};

		Amount::new(U256::from(units).saturating_mul(Amount::pow10(route.source.decimals)))
	}

	fn fee_bps(&self) -> u32 {
		25
	}

	fn usd_price(&self, asset: &Asset) -> f64 {
		match asset.symbol.as_str() {
			"USDC" | "USDT" | "DAI" => 1.0,
			"ETH" | "WETH" => 2500.0,
			"WBTC" => 60_000.0,
			"MATIC" => 0.5,
			_ => 1.0,
		}
	}

	fn fallback_assets(&self) -> Vec<Asset> {
		vec![
			Asset::eth(),
			Asset::usdc_ethereum(),
			Asset::usdc_polygon(),
			Asset::matic(),
			Asset::usdc_arbitrum(),
		]
	}
}
