//! Mock transport and fixtures for tests and examples
//!
//! The mock transport matches scripted rules against each outbound request
//! (URL plus serialized body) and replays configured responses, so tests can
//! script per-route failures, rate-limit headers, and recovery sequences
//! without a network.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use xbridge_types::{
	Amount, Asset, ClientError, ClientResult, HttpTransport, Route, TransportRequest,
	TransportResponse,
};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockResponse {
	/// JSON body with the given status
	Json { status: u16, body: Value },
	/// Status with an empty body
	Status(u16),
	/// Status with extra response headers (e.g. Retry-After)
	WithHeaders {
		status: u16,
		headers: Vec<(String, String)>,
		body: Value,
	},
	/// Transport-level failure
	Error(ClientError),
	/// Quote computed from the request's own amount at the given fee
	QuoteFromAmount { fee_bps: u32 },
}

struct MockRule {
	matcher: String,
	responses: Vec<MockResponse>,
	next: usize,
}

impl MockRule {
	/// Advance through the script, repeating the last entry forever
	fn next_response(&mut self) -> MockResponse {
		let index = self.next.min(self.responses.len() - 1);
		self.next += 1;
		self.responses[index].clone()
	}
}

/// Scripted in-memory transport
///
/// Rules are matched in registration order against the request URL and
/// serialized body; the first match wins. Unmatched requests get a 404.
#[derive(Default)]
pub struct MockTransport {
	rules: Mutex<Vec<MockRule>>,
	requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Respond to every matching request with the same reply
	pub fn respond(&self, matcher: &str, response: MockResponse) {
		self.respond_sequence(matcher, vec![response]);
	}

	/// Respond with a sequence, repeating the last entry once exhausted
	pub fn respond_sequence(&self, matcher: &str, responses: Vec<MockResponse>) {
		assert!(!responses.is_empty(), "mock response sequence cannot be empty");
		self.rules
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(MockRule {
				matcher: matcher.to_string(),
				responses,
				next: 0,
			});
	}

	/// Register a rule ahead of all existing ones; lets a test change the
	/// upstream's behavior between phases (e.g. outage, then recovery)
	pub fn respond_first(&self, matcher: &str, response: MockResponse) {
		self.rules
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.insert(
				0,
				MockRule {
					matcher: matcher.to_string(),
					responses: vec![response],
					next: 0,
				},
			);
	}

	/// Transport with every category healthy: ideal quotes, live volumes,
	/// a small token table, and a passing health endpoint
	pub fn healthy() -> Self {
		let transport = Self::new();
		transport.respond(
			"analytics/volume",
			MockResponse::Json {
				status: 200,
				body: json!({"volumeUsd": 12_500_000.0}),
			},
		);
		transport.respond("v1/quote", MockResponse::QuoteFromAmount { fee_bps: 0 });
		transport.respond(
			"v1/tokens",
			MockResponse::Json {
				status: 200,
				body: tokens_body(),
			},
		);
		transport.respond("v1/health", MockResponse::Json {
			status: 200,
			body: json!({"status": "ok"}),
		});
		transport
	}

	/// Number of requests whose URL or body matched the needle
	pub fn request_count(&self, needle: &str) -> usize {
		self.requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.iter()
			.filter(|request| request_text(request).contains(needle))
			.count()
	}

	pub fn total_requests(&self) -> usize {
		self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
	}

	fn scripted_response(&self, request: &TransportRequest) -> MockResponse {
		let text = request_text(request);
		let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
		for rule in rules.iter_mut() {
			if text.contains(&rule.matcher) {
				return rule.next_response();
			}
		}
		MockResponse::Status(404)
	}
}

fn request_text(request: &TransportRequest) -> String {
	match &request.body {
		Some(body) => format!("{} {}", request.url, body),
		None => request.url.clone(),
	}
}

/// Pull the raw input amount out of a quote request (POST body or query)
fn request_amount(request: &TransportRequest) -> Option<Amount> {
	if let Some(body) = &request.body {
		if let Some(amount) = body.get("amount").and_then(Value::as_str) {
			return Amount::from_decimal_str(amount).ok();
		}
	}

	let (_, query) = request.url.split_once('?')?;
	query
		.split('&')
		.find_map(|pair| pair.strip_prefix("amount="))
		.and_then(|amount| Amount::from_decimal_str(amount).ok())
}

#[async_trait]
impl HttpTransport for MockTransport {
	async fn execute(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
		let response = self.scripted_response(&request);
		self.requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(request.clone());

		match response {
			MockResponse::Json { status, body } => Ok(TransportResponse {
				status,
				headers: vec![],
				body,
			}),
			MockResponse::Status(status) => Ok(TransportResponse {
				status,
				headers: vec![],
				body: Value::Null,
			}),
			MockResponse::WithHeaders {
				status,
				headers,
				body,
			} => Ok(TransportResponse {
				status,
				headers,
				body,
			}),
			MockResponse::Error(error) => Err(error),
			MockResponse::QuoteFromAmount { fee_bps } => {
				let amount_in = request_amount(&request).unwrap_or(Amount::ZERO);
				let kept = 10_000u64.saturating_sub(fee_bps as u64);
				let amount_out = Amount::new(
					amount_in.value() * xbridge_types::U256::from(kept)
						/ xbridge_types::U256::from(10_000u64),
				);
				Ok(TransportResponse {
					status: 200,
					headers: vec![],
					body: json!({"toAmount": amount_out.to_string()}),
				})
			},
		}
	}
}

/// Token-table body in the upstream's wire shape
pub fn tokens_body() -> Value {
	json!({
		"tokens": [
			{"chainId": "ethereum", "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "symbol": "USDC", "decimals": 6},
			{"chainId": "polygon", "address": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "symbol": "USDC", "decimals": 6},
			{"chainId": "arbitrum", "address": "0xaf88d065e77c8cC2239327C5EDb3A432268e5831", "symbol": "USDC", "decimals": 6}
		]
	})
}

/// USDC route from Ethereum to Polygon
pub fn route_eth_polygon() -> Route {
	Route::new(Asset::usdc_ethereum(), Asset::usdc_polygon())
		.expect("fixture route must be cross-chain")
}

/// USDC route from Ethereum to Arbitrum
pub fn route_eth_arbitrum() -> Route {
	Route::new(Asset::usdc_ethereum(), Asset::usdc_arbitrum())
		.expect("fixture route must be cross-chain")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_rules_match_in_order() {
		let transport = MockTransport::new();
		transport.respond("v1/quote", MockResponse::Status(503));
		transport.respond("v1", MockResponse::Status(200));

		let quote = transport
			.execute(TransportRequest::get("http://up/v1/quote"))
			.await
			.unwrap();
		assert_eq!(quote.status, 503);

		let other = transport
			.execute(TransportRequest::get("http://up/v1/tokens"))
			.await
			.unwrap();
		assert_eq!(other.status, 200);
	}

	#[tokio::test]
	async fn test_sequence_repeats_last() {
		let transport = MockTransport::new();
		transport.respond_sequence(
			"v1/quote",
			vec![MockResponse::Status(500), MockResponse::Status(200)],
		);

		let request = TransportRequest::get("http://up/v1/quote");
		assert_eq!(transport.execute(request.clone()).await.unwrap().status, 500);
		assert_eq!(transport.execute(request.clone()).await.unwrap().status, 200);
		assert_eq!(transport.execute(request).await.unwrap().status, 200);
	}

	#[tokio::test]
	async fn test_unmatched_requests_get_404() {
		let transport = MockTransport::new();
		let response = transport
			.execute(TransportRequest::get("http://up/anything"))
			.await
			.unwrap();
		assert_eq!(response.status, 404);
	}

	#[tokio::test]
	async fn test_quote_from_amount_reads_post_body() {
		let transport = MockTransport::new();
		transport.respond("v1/quote", MockResponse::QuoteFromAmount { fee_bps: 25 });

		let response = transport
			.execute(TransportRequest::post(
				"http://up/v1/quote",
				json!({"amount": "1000000"}),
			))
			.await
			.unwrap();
		assert_eq!(response.body["toAmount"], "997500");
	}

	#[tokio::test]
	async fn test_request_counting_by_body_content() {
		let transport = MockTransport::new();
		transport.respond("v1/quote", MockResponse::Status(200));

		let body = json!({"toChain": "polygon", "amount": "1"});
		transport
			.execute(TransportRequest::post("http://up/v1/quote", body))
			.await
			.unwrap();

		assert_eq!(transport.request_count("polygon"), 1);
		assert_eq!(transport.request_count("arbitrum"), 0);
	}
}
