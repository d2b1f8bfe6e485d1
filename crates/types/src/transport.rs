//! Abstract transport boundary
//!
//! The resilience core never touches a socket directly; it performs one
//! network request through this trait and interprets the response or failure.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ClientResult;

/// HTTP method for a transport request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
	Get,
	Post,
}

impl HttpMethod {
	pub fn as_str(&self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}

/// One outbound request
#[derive(Debug, Clone)]
pub struct TransportRequest {
	pub url: String,
	pub method: HttpMethod,
	pub headers: Vec<(String, String)>,
	pub body: Option<Value>,
}

impl TransportRequest {
	pub fn get(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			method: HttpMethod::Get,
			headers: Vec::new(),
			body: None,
		}
	}

	pub fn post(url: impl Into<String>, body: Value) -> Self {
		Self {
			url: url.into(),
			method: HttpMethod::Post,
			headers: Vec::new(),
			body: Some(body),
		}
	}
}

/// Rate-limit feedback advertised by the server on a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerRateInfo {
	pub limit: u32,
	pub remaining: u32,
	/// Seconds since epoch at which the server-side window resets
	pub reset_at_epoch_s: u64,
}

/// One response from the transport layer
#[derive(Debug, Clone)]
pub struct TransportResponse {
	pub status: u16,
	pub headers: Vec<(String, String)>,
	pub body: Value,
}

impl TransportResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Case-insensitive header lookup
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Parse `X-RateLimit-*` feedback headers, if all three are present
	pub fn rate_limit_info(&self) -> Option<ServerRateInfo> {
		let limit = self.header("X-RateLimit-Limit")?.trim().parse().ok()?;
		let remaining = self.header("X-RateLimit-Remaining")?.trim().parse().ok()?;
		let reset_at_epoch_s = self.header("X-RateLimit-Reset")?.trim().parse().ok()?;

		Some(ServerRateInfo {
			limit,
			remaining,
			reset_at_epoch_s,
		})
	}

	/// Parse a `Retry-After` header (seconds) into milliseconds
	pub fn retry_after_ms(&self) -> Option<u64> {
		self.header("Retry-After")?
			.trim()
			.parse::<u64>()
			.ok()
			.map(|seconds| seconds * 1000)
	}
}

/// Capability to perform one network request
///
/// Implementations own connection management and protocol details; the core
/// only sees status, headers, and a JSON body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
	async fn execute(&self, request: TransportRequest) -> ClientResult<TransportResponse>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn response_with_headers(headers: Vec<(&str, &str)>) -> TransportResponse {
		TransportResponse {
			status: 200,
			headers: headers
				.into_iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
			body: Value::Null,
		}
	}

	#[test]
	fn test_header_lookup_is_case_insensitive() {
		let response = response_with_headers(vec![("x-ratelimit-limit", "10")]);
		assert_eq!(response.header("X-RateLimit-Limit"), Some("10"));
	}

	#[test]
	fn test_rate_limit_info_requires_all_headers() {
		let response = response_with_headers(vec![
			("X-RateLimit-Limit", "10"),
			("X-RateLimit-Remaining", "3"),
		]);
		assert!(response.rate_limit_info().is_none());

		let response = response_with_headers(vec![
			("X-RateLimit-Limit", "10"),
			("X-RateLimit-Remaining", "3"),
			("X-RateLimit-Reset", "1700000000"),
		]);
		let info = response.rate_limit_info().unwrap();
		assert_eq!(info.limit, 10);
		assert_eq!(info.remaining, 3);
		assert_eq!(info.reset_at_epoch_s, 1_700_000_000);
	}

	#[test]
	fn test_retry_after_seconds_to_ms() {
		let response = response_with_headers(vec![("Retry-After", "2")]);
		assert_eq!(response.retry_after_ms(), Some(2000));

		let response = response_with_headers(vec![("Retry-After", "soon")]);
		assert_eq!(response.retry_after_ms(), None);
	}

	#[test]
	fn test_is_success_boundaries() {
		let mut response = response_with_headers(vec![]);
		assert!(response.is_success());
		response.status = 299;
		assert!(response.is_success());
		response.status = 300;
		assert!(!response.is_success());
		response.status = 199;
		assert!(!response.is_success());
	}
}
