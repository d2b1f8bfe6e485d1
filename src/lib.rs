//! xbridge Aggregator Library
//!
//! A resilient client layer for aggregating pricing, liquidity, and asset
//! data from an unreliable cross-chain bridge API, falling back to estimated
//! values when the API is unreachable.

// Core domain types - the most commonly used types
pub use xbridge_types::{
	chrono,
	// External dependencies for convenience
	serde_json,
	AggregatorError,
	AggregatorResult,
	// Primary domain entities
	Amount,
	Asset,
	// Error types
	ClientError,
	ClientResult,
	// Transport boundary
	HttpMethod,
	HttpTransport,
	LiquidityThreshold,
	MetricsCollector,
	MetricsSnapshot,
	PingStatus,
	Quote,
	RateResult,
	Route,
	RouteLiquidity,
	ServerRateInfo,
	Snapshot,
	SnapshotRequest,
	TransportRequest,
	TransportResponse,
	VolumeResult,
};

// Resilience core
pub use xbridge_client::{
	CircuitBreaker, CircuitState, RateLimiter, ReqwestTransport, RetryingRequester, TtlCache,
};

// Service layer
pub use xbridge_service::{
	DepthSolver, EndpointCatalog, EstimateProvider, Orchestrator, QuoteProbe, RequestDescriptor,
	StaticEstimates, UpstreamClient,
};

// Config
pub use xbridge_config::{load_config, LogFormat, Settings};

// Module aliases for finer-grained imports
pub mod types {
	pub use xbridge_types::*;
}

pub mod client {
	pub use xbridge_client::*;
}

pub mod service {
	pub use xbridge_service::*;
}

pub mod config {
	pub use xbridge_config::*;
}

pub mod mocks;

use std::sync::Arc;
use tracing::info;

/// Builder pattern for wiring an aggregation orchestrator
///
/// Defaults to loaded settings, the reqwest transport, and the static
/// estimate tables; each can be overridden independently.
pub struct AggregatorBuilder {
	settings: Option<Settings>,
	transport: Option<Arc<dyn HttpTransport>>,
	estimates: Option<Arc<dyn EstimateProvider>>,
}

impl AggregatorBuilder {
	pub fn new() -> Self {
		Self {
			settings: None,
			transport: None,
			estimates: None,
		}
	}

	/// Use explicit settings instead of loading from file/environment
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Use a custom transport (e.g. a mock for tests)
	pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Use a custom estimate provider
	pub fn with_estimates(mut self, estimates: Arc<dyn EstimateProvider>) -> Self {
		self.estimates = Some(estimates);
		self
	}

	/// Wire the orchestrator
	pub fn build(self) -> AggregatorResult<Orchestrator> {
		let settings = match self.settings {
			Some(settings) => settings,
			None => load_config().map_err(|e| AggregatorError::Internal {
				reason: format!("failed to load configuration: {}", e),
			})?,
		};

		let estimates = self
			.estimates
			.unwrap_or_else(|| Arc::new(StaticEstimates::new()));

		let orchestrator = match self.transport {
			Some(transport) => Orchestrator::new(&settings, transport, estimates)?,
			None => Orchestrator::with_default_transport(&settings, estimates)?,
		};

		info!(
			endpoint = %settings.upstream.endpoint,
			"aggregator wired and ready"
		);
		Ok(orchestrator)
	}
}

impl Default for AggregatorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Initialize tracing from logging settings; safe to call once per process
pub fn init_logging(settings: &Settings) {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

	match settings.logging.format {
		LogFormat::Json => {
			tracing_subscriber::fmt()
				.json()
				.with_env_filter(env_filter)
				.init();
		},
		LogFormat::Pretty => {
			tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter)
				.init();
		},
		LogFormat::Compact => {
			tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter)
				.init();
		},
	}
}
