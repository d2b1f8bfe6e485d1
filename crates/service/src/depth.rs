//! Liquidity depth solver
//!
//! Binary search for the largest input amount whose realized slippage stays
//! within a basis-point budget, probing amounts through a quote function.

use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::debug;

use xbridge_config::SolverSettings;
use xbridge_types::{Amount, ClientResult, Quote, Route};

use crate::rates;

/// Quote function probed by the solver
///
/// Each probe is a live or fallback-derived estimate; results are never
/// cached between probes.
#[async_trait]
pub trait QuoteProbe: Send + Sync {
	async fn probe(&self, route: &Route, amount_in: &Amount) -> ClientResult<Quote>;
}

/// Binary-search solver with a fixed iteration budget
///
/// The fixed budget bounds worst-case probe count per route instead of
/// resolving to an exact integer; callers accept the quantization.
#[derive(Debug, Clone)]
pub struct DepthSolver {
	settings: SolverSettings,
}

impl DepthSolver {
	pub fn new(settings: SolverSettings) -> Self {
		Self { settings }
	}

	/// Search upper bound for a route, in the source asset's raw units
	pub fn upper_bound(&self, route: &Route) -> Amount {
		let units = U256::from(self.settings.upper_bound_units);
		Amount::new(units.saturating_mul(Amount::pow10(route.source.decimals)))
	}

	/// Largest input amount with slippage at or below `budget_bps`
	///
	/// A failed probe narrows the search downward, so an unreachable
	/// upstream converges to zero. The returned amount is always zero or a
	/// previously confirmed-feasible midpoint.
	pub async fn solve(&self, probe: &dyn QuoteProbe, route: &Route, budget_bps: u32) -> Amount {
		let upper = self.upper_bound(route);

		// When the full bound is already within budget there is nothing to
		// search
		if self.is_feasible(probe, route, &upper, budget_bps).await {
			debug!(route = %route, budget_bps, "upper bound feasible, saturating");
			return upper;
		}

		let mut low = U256::ZERO;
		let mut high = upper.value();

		for iteration in 0..self.settings.iterations {
			let mid = low + (high - low) / U256::from(2u64);
			if mid == low || mid == high {
				// No further resolution at integer precision
				break;
			}

			let mid_amount = Amount::new(mid);
			if self.is_feasible(probe, route, &mid_amount, budget_bps).await {
				low = mid;
			} else {
				high = mid;
			}

			debug!(
				route = %route,
				budget_bps,
				iteration,
				low = %low,
				high = %high,
				"depth search narrowed"
			);
		}

		Amount::new(low)
	}

	async fn is_feasible(
		&self,
		probe: &dyn QuoteProbe,
		route: &Route,
		amount_in: &Amount,
		budget_bps: u32,
	) -> bool {
		match probe.probe(route, amount_in).await {
			Ok(quote) => realized_slippage_bps(route, amount_in, &quote) <= budget_bps as u64,
			// A failed probe is treated as infeasible rather than aborting
			// the search
			Err(_) => false,
		}
	}
}

/// Slippage of a quote against the decimal-adjusted 1:1 expectation
pub fn realized_slippage_bps(route: &Route, amount_in: &Amount, quote: &Quote) -> u64 {
	let expected_out = rates::scale_decimals(
		amount_in,
		route.source.decimals,
		route.destination.decimals,
	);
	rates::slippage_bps(&expected_out, &quote.amount_out)
}
