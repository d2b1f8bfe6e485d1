//! Amount model for raw token quantities

use alloy_primitives::U256;
use serde;

/// Raw token amount in the token's smallest unit, represented as a decimal
/// string on the wire to preserve precision
///
/// Arithmetic is performed on the underlying 256-bit unsigned integer so that
/// 18-decimal token scales never overflow or round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(U256);

impl Amount {
	pub const ZERO: Amount = Amount(U256::ZERO);

	/// Create a new amount from a raw U256 value
	pub fn new(value: U256) -> Self {
		Self(value)
	}

	/// Parse a decimal string into an amount
	pub fn from_decimal_str(value: &str) -> Result<Self, String> {
		if value.is_empty() {
			return Err("amount cannot be empty".to_string());
		}

		if !value.chars().all(|c| c.is_ascii_digit()) {
			return Err(format!("amount must contain only digits: '{}'", value));
		}

		U256::from_str_radix(value, 10)
			.map(Self)
			.map_err(|e| format!("amount '{}' does not fit in 256 bits: {}", value, e))
	}

	/// Get the underlying 256-bit value
	pub fn value(&self) -> U256 {
		self.0
	}

	/// Check if the value is zero
	pub fn is_zero(&self) -> bool {
		self.0.is_zero()
	}

	/// 10^exp as a U256, for decimal scaling
	pub fn pow10(exp: u8) -> U256 {
		U256::from(10u64).pow(U256::from(exp))
	}

	/// Approximate the raw value as an f64
	///
	/// Lossy above 2^53; used only for final normalized rate/fee output.
	pub fn to_f64(&self) -> f64 {
		self.0.to_string().parse::<f64>().unwrap_or(f64::MAX)
	}
}

impl std::fmt::Display for Amount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<U256> for Amount {
	fn from(value: U256) -> Self {
		Self(value)
	}
}

impl From<u128> for Amount {
	fn from(value: u128) -> Self {
		Self(U256::from(value))
	}
}

impl From<u64> for Amount {
	fn from(value: u64) -> Self {
		Self(U256::from(value))
	}
}

// Serialize/deserialize as a decimal string to preserve precision in JSON
impl serde::Serialize for Amount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0.to_string())
	}
}

impl<'de> serde::Deserialize<'de> for Amount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		Self::from_decimal_str(&value).map_err(serde::de::Error::custom)
	}
}
