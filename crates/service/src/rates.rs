//! Decimal-safe rate and fee arithmetic
//!
//! Raw amounts stay in 256-bit unsigned integers; only the final normalized
//! rate or fee becomes a float.

use alloy_primitives::U256;

use xbridge_types::Amount;

const BPS_DENOMINATOR: u64 = 10_000;

/// Rescale a raw amount between token decimal precisions
pub fn scale_decimals(amount: &Amount, from_decimals: u8, to_decimals: u8) -> Amount {
	if to_decimals >= from_decimals {
		let factor = Amount::pow10(to_decimals - from_decimals);
		Amount::new(amount.value().saturating_mul(factor))
	} else {
		let factor = Amount::pow10(from_decimals - to_decimals);
		Amount::new(amount.value() / factor)
	}
}

/// Destination units per source unit, both decimal-normalized
///
/// Defined as 0 when `amount_in` is zero.
pub fn effective_rate(
	amount_in: &Amount,
	amount_out: &Amount,
	decimals_in: u8,
	decimals_out: u8,
) -> f64 {
	if amount_in.is_zero() {
		return 0.0;
	}

	let normalized_in = amount_in.to_f64() / 10f64.powi(decimals_in as i32);
	let normalized_out = amount_out.to_f64() / 10f64.powi(decimals_out as i32);
	normalized_out / normalized_in
}

/// USD fee for a raw amount at the given per-unit price and fee rate
pub fn fee_usd(amount: &Amount, decimals: u8, usd_price_per_unit: f64, fee_bps: u32) -> f64 {
	let normalized = amount.to_f64() / 10f64.powi(decimals as i32);
	normalized * usd_price_per_unit * fee_bps as f64 / BPS_DENOMINATOR as f64
}

/// Deduct a basis-point fee from a raw amount
pub fn apply_fee_bps(amount: &Amount, fee_bps: u32) -> Amount {
	let fee_bps = (fee_bps as u64).min(BPS_DENOMINATOR);
	let kept = U256::from(BPS_DENOMINATOR - fee_bps);
	Amount::new(amount.value().saturating_mul(kept) / U256::from(BPS_DENOMINATOR))
}

/// Realized slippage of `actual_out` against `expected_out`, in basis points
///
/// Defined as 0 when `expected_out` is zero. Saturates instead of
/// overflowing for absurdly large deviations.
pub fn slippage_bps(expected_out: &Amount, actual_out: &Amount) -> u64 {
	let expected = expected_out.value();
	if expected.is_zero() {
		return 0;
	}

	let actual = actual_out.value();
	let diff = if expected >= actual {
		expected - actual
	} else {
		actual - expected
	};

	let bps = diff
		.checked_mul(U256::from(BPS_DENOMINATOR))
		.map(|scaled| scaled / expected)
		.unwrap_or(U256::from(u64::MAX));

	bps.min(U256::from(u64::MAX)).to::<u64>()
}
