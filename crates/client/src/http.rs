//! Default reqwest-backed transport
//!
//! Pooled, keep-alive-optimized HTTP client carrying the transport-level hard
//! timeout that guards against hung connections regardless of per-request
//! retry configuration.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

use xbridge_config::UpstreamSettings;
use xbridge_types::{
	ClientError, ClientResult, HttpMethod, HttpTransport, TransportRequest, TransportResponse,
};

/// Idle connections kept per host
const MAX_IDLE_PER_HOST: usize = 10;
/// Keep-alive for pooled connections
const KEEP_ALIVE_SECS: u64 = 90;

/// reqwest-backed implementation of the transport capability
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Client,
	transport_timeout_ms: u64,
}

impl ReqwestTransport {
	pub fn new(settings: &UpstreamSettings, transport_timeout_ms: u64) -> ClientResult<Self> {
		let mut headers = HeaderMap::new();
		headers.insert("Accept", HeaderValue::from_static("application/json"));
		headers.insert(
			"Content-Type",
			HeaderValue::from_static("application/json"),
		);
		if let Ok(user_agent) = HeaderValue::from_str(&settings.user_agent) {
			headers.insert("User-Agent", user_agent);
		}

		let client = Client::builder()
			.pool_max_idle_per_host(MAX_IDLE_PER_HOST)
			.pool_idle_timeout(Duration::from_secs(KEEP_ALIVE_SECS))
			.tcp_keepalive(Duration::from_secs(60))
			.timeout(Duration::from_millis(transport_timeout_ms))
			.default_headers(headers)
			.build()
			.map_err(|e| ClientError::Network {
				reason: format!("failed to build HTTP client: {}", e),
			})?;

		Ok(Self {
			client,
			transport_timeout_ms,
		})
	}

	fn map_error(&self, error: reqwest::Error) -> ClientError {
		if error.is_timeout() {
			ClientError::Timeout {
				timeout_ms: self.transport_timeout_ms,
			}
		} else {
			ClientError::Network {
				reason: error.to_string(),
			}
		}
	}
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn execute(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
		let mut builder = match request.method {
			HttpMethod::Get => self.client.get(&request.url),
			HttpMethod::Post => self.client.post(&request.url),
		};

		for (key, value) in &request.headers {
			if let (Ok(name), Ok(value)) = (
				HeaderName::from_str(key),
				HeaderValue::from_str(value),
			) {
				builder = builder.header(name, value);
			}
		}

		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		let response = builder.send().await.map_err(|e| self.map_error(e))?;

		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value
					.to_str()
					.ok()
					.map(|v| (name.as_str().to_string(), v.to_string()))
			})
			.collect();

		let text = response.text().await.map_err(|e| self.map_error(e))?;
		let body = if text.is_empty() {
			Value::Null
		} else {
			// Non-JSON bodies are preserved verbatim for error reporting
			serde_json::from_str(&text).unwrap_or(Value::String(text))
		};

		Ok(TransportResponse {
			status,
			headers,
			body,
		})
	}
}
