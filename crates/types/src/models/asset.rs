//! Blockchain asset/token models

use serde::{Deserialize, Serialize};

/// Supported blockchain asset/token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Asset {
	/// Chain identifier where this asset exists (e.g., "ethereum", "polygon")
	pub chain_id: String,
	/// Contract address (use "0x0" for native tokens)
	pub address: String,
	/// Token symbol (e.g., "ETH", "USDC")
	pub symbol: String,
	/// Number of decimal places (0-18)
	pub decimals: u8,
}

impl Asset {
	pub fn new(chain_id: String, address: String, symbol: String, decimals: u8) -> Self {
		Self {
			chain_id,
			address,
			symbol,
			decimals,
		}
	}

	/// Stable label for logs and cache keys
	pub fn label(&self) -> String {
		format!("{}:{}", self.chain_id, self.symbol)
	}
}

/// Common asset constants used by tests and mock tables
impl Asset {
	pub fn eth() -> Self {
		Self::new(
			"ethereum".to_string(),
			"0x0000000000000000000000000000000000000000".to_string(),
			"ETH".to_string(),
			18,
		)
	}

	pub fn usdc_ethereum() -> Self {
		Self::new(
			"ethereum".to_string(),
			"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
			"USDC".to_string(),
			6,
		)
	}

	pub fn usdc_polygon() -> Self {
		Self::new(
			"polygon".to_string(),
			"0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".to_string(),
			"USDC".to_string(),
			6,
		)
	}

	pub fn matic() -> Self {
		Self::new(
			"polygon".to_string(),
			"0x0000000000000000000000000000000000001010".to_string(),
			"MATIC".to_string(),
			18,
		)
	}

	pub fn usdc_arbitrum() -> Self {
		Self::new(
			"arbitrum".to_string(),
			"0xaf88d065e77c8cC2239327C5EDb3A432268e5831".to_string(),
			"USDC".to_string(),
			6,
		)
	}
}
