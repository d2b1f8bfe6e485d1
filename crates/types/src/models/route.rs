//! Cross-chain route model

use serde::{Deserialize, Serialize};

use crate::errors::ClientError;
use crate::models::Asset;

/// Ordered source/destination pair across two different chains
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Route {
	pub source: Asset,
	pub destination: Asset,
}

impl Route {
	/// Create a route, rejecting same-chain pairs
	pub fn new(source: Asset, destination: Asset) -> Result<Self, ClientError> {
		if source.chain_id == destination.chain_id {
			return Err(ClientError::Validation {
				reason: format!(
					"route source and destination must be on different chains (both '{}')",
					source.chain_id
				),
			});
		}

		Ok(Self {
			source,
			destination,
		})
	}

	/// Stable label for logs and cache keys, e.g. "ethereum:USDC->polygon:USDC"
	pub fn key(&self) -> String {
		format!("{}->{}", self.source.label(), self.destination.label())
	}
}

impl std::fmt::Display for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.key())
	}
}
