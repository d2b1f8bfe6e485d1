//! Prioritized request descriptors per data category
//!
//! Endpoint fallback chains are expressed as data: an ordered list of request
//! descriptors tried until one returns a success status. Every attempt still
//! goes through the shared retry/backoff contract.

use serde_json::json;
use url::Url;

use xbridge_types::{Amount, ClientError, ClientResult, Route, TransportRequest};

/// One candidate request for a logical fetch
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
	/// Short label for logs
	pub label: String,
	pub request: TransportRequest,
}

impl RequestDescriptor {
	pub fn new(label: impl Into<String>, request: TransportRequest) -> Self {
		Self {
			label: label.into(),
			request,
		}
	}
}

/// Builder of descriptor chains against one upstream base URL
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
	base: Url,
}

impl EndpointCatalog {
	pub fn new(base_url: &str) -> ClientResult<Self> {
		let mut base = Url::parse(base_url).map_err(|e| ClientError::Validation {
			reason: format!("invalid upstream endpoint '{}': {}", base_url, e),
		})?;

		// Treat the base as a directory so joins append instead of replace
		if !base.path().ends_with('/') {
			base.set_path(&format!("{}/", base.path()));
		}

		Ok(Self { base })
	}

	fn url(&self, path: &str, query: &[(&str, String)]) -> String {
		match self.base.join(path) {
			Ok(mut url) => {
				if !query.is_empty() {
					let mut pairs = url.query_pairs_mut();
					for (key, value) in query {
						pairs.append_pair(key, value);
					}
				}
				url.to_string()
			},
			Err(_) => format!("{}{}", self.base, path),
		}
	}

	/// Volume endpoints, newest API first
	pub fn volume_requests(&self, window: &str) -> Vec<RequestDescriptor> {
		vec![
			RequestDescriptor::new(
				format!("volumes:{}:analytics", window),
				TransportRequest::get(
					self.url("v1/analytics/volume", &[("window", window.to_string())]),
				),
			),
			RequestDescriptor::new(
				format!("volumes:{}:stats", window),
				TransportRequest::get(self.url("v1/stats", &[("period", window.to_string())])),
			),
		]
	}

	/// Quote endpoints for one route and input amount
	pub fn quote_requests(&self, route: &Route, amount_in: &Amount) -> Vec<RequestDescriptor> {
		let body = json!({
			"fromChain": route.source.chain_id,
			"toChain": route.destination.chain_id,
			"fromToken": route.source.address,
			"toToken": route.destination.address,
			"amount": amount_in.to_string(),
		});

		vec![
			RequestDescriptor::new(
				format!("quote:{}", route.key()),
				TransportRequest::post(self.url("v1/quote", &[]), body),
			),
			RequestDescriptor::new(
				format!("quote:{}:get", route.key()),
				TransportRequest::get(self.url(
					"v1/quote",
					&[
						("fromChain", route.source.chain_id.clone()),
						("toChain", route.destination.chain_id.clone()),
						("fromToken", route.source.address.clone()),
						("toToken", route.destination.address.clone()),
						("amount", amount_in.to_string()),
					],
				)),
			),
		]
	}

	/// Supported-asset list endpoints
	pub fn asset_requests(&self) -> Vec<RequestDescriptor> {
		vec![
			RequestDescriptor::new("assets:tokens", TransportRequest::get(self.url("v1/tokens", &[]))),
			RequestDescriptor::new("assets:assets", TransportRequest::get(self.url("v1/assets", &[]))),
		]
	}

	/// Health probe endpoints
	pub fn health_requests(&self) -> Vec<RequestDescriptor> {
		vec![RequestDescriptor::new(
			"health",
			TransportRequest::get(self.url("v1/health", &[])),
		)]
	}
}
