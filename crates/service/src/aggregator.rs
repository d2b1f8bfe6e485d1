//! Aggregation orchestrator
//!
//! Answers volumes / rates / liquidity / assets requests with concurrent
//! fan-out and per-category fallback. Every per-item upstream failure is
//! replaced by a deterministic estimate; only input validation and escaping
//! internal errors surface to the caller.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use xbridge_client::{
	CircuitBreaker, RateLimiter, ReqwestTransport, RetryingRequester, TtlCache,
};
use xbridge_config::Settings;
use xbridge_types::{
	AggregatorError, AggregatorResult, Amount, Asset, ClientError, ClientResult, HttpTransport,
	LiquidityThreshold, MetricsCollector, MetricsSnapshot, PingStatus, Quote, RateResult, Route,
	RouteLiquidity, Snapshot, SnapshotRequest, VolumeResult,
};

use crate::depth::{DepthSolver, QuoteProbe};
use crate::endpoints::EndpointCatalog;
use crate::estimates::EstimateProvider;
use crate::extract;
use crate::rates;
use crate::upstream::UpstreamClient;

/// One orchestrator instance per configured upstream
///
/// The cache, limiter, breaker, and metrics are plain owned fields created at
/// construction and destroyed with the orchestrator; there are no process-wide
/// singletons.
pub struct Orchestrator {
	upstream: UpstreamClient,
	catalog: EndpointCatalog,
	solver: DepthSolver,
	estimates: Arc<dyn EstimateProvider>,
	metrics: Arc<MetricsCollector>,
	volumes_cache: TtlCache<VolumeResult>,
	assets_cache: TtlCache<Vec<Asset>>,
	slippage_budgets_bps: Vec<u32>,
}

impl Orchestrator {
	/// Wire an orchestrator from settings, a transport, and an estimate
	/// provider
	pub fn new(
		settings: &Settings,
		transport: Arc<dyn HttpTransport>,
		estimates: Arc<dyn EstimateProvider>,
	) -> ClientResult<Self> {
		let metrics = Arc::new(MetricsCollector::new());
		let rate_limiter = Arc::new(RateLimiter::new(settings.rate_limit.clone()));
		let requester = RetryingRequester::new(
			transport,
			rate_limiter,
			Arc::clone(&metrics),
			settings.retry.clone(),
		);
		let breaker = CircuitBreaker::new(settings.circuit_breaker.clone());

		let mut slippage_budgets_bps = settings.solver.slippage_budgets_bps.clone();
		slippage_budgets_bps.sort_unstable();

		Ok(Self {
			upstream: UpstreamClient::new(requester, breaker),
			catalog: EndpointCatalog::new(&settings.upstream.endpoint)?,
			solver: DepthSolver::new(settings.solver.clone()),
			estimates,
			volumes_cache: TtlCache::new(settings.cache.ttl_ms, Arc::clone(&metrics)),
			assets_cache: TtlCache::new(settings.cache.ttl_ms, Arc::clone(&metrics)),
			metrics,
			slippage_budgets_bps,
		})
	}

	/// Wire an orchestrator with the default reqwest transport
	pub fn with_default_transport(
		settings: &Settings,
		estimates: Arc<dyn EstimateProvider>,
	) -> ClientResult<Self> {
		let transport = Arc::new(ReqwestTransport::new(
			&settings.upstream,
			settings.retry.transport_timeout_ms,
		)?);
		Self::new(settings, transport, estimates)
	}

	/// Aggregate a full snapshot: all four categories fetched concurrently,
	/// each falling back item-by-item
	pub async fn get_snapshot(&self, request: &SnapshotRequest) -> AggregatorResult<Snapshot> {
		self.validate_request(request)?;

		info!(
			request_id = %request.request_id,
			routes = request.routes.len(),
			notionals = request.notionals.len(),
			windows = request.windows.len(),
			"aggregating snapshot"
		);

		let (volumes, rates, liquidity, assets) = tokio::join!(
			self.fetch_volumes(&request.windows),
			self.fetch_rates(&request.routes, &request.notionals),
			self.fetch_liquidity(&request.routes),
			self.fetch_assets(),
		);

		Ok(Snapshot {
			request_id: request.request_id.clone(),
			volumes,
			rates,
			liquidity,
			assets,
			generated_at: Utc::now(),
		})
	}

	/// Health probe; failures are logged, never surfaced
	pub async fn ping(&self) -> PingStatus {
		if let Err(error) = self.upstream.fetch(&self.catalog.health_requests()).await {
			warn!(%error, "health probe failed; still reporting available");
		}
		PingStatus::available()
	}

	/// Current metrics snapshot
	pub fn get_metrics(&self) -> MetricsSnapshot {
		self.metrics.snapshot()
	}

	fn validate_request(&self, request: &SnapshotRequest) -> AggregatorResult<()> {
		if request.routes.is_empty() {
			return Err(AggregatorError::InvalidRequest {
				reason: "at least one route is required".to_string(),
			});
		}
		if request.notionals.is_empty() {
			return Err(AggregatorError::InvalidRequest {
				reason: "at least one notional is required".to_string(),
			});
		}
		if let Some(zero) = request.notionals.iter().find(|n| n.is_zero()) {
			return Err(AggregatorError::InvalidRequest {
				reason: format!("notional must be non-zero, got {}", zero),
			});
		}
		for route in &request.routes {
			if route.source.chain_id == route.destination.chain_id {
				return Err(AggregatorError::InvalidRequest {
					reason: format!("route {} stays on one chain", route.key()),
				});
			}
		}
		Ok(())
	}

	async fn fetch_volumes(&self, windows: &[String]) -> Vec<VolumeResult> {
		join_all(windows.iter().map(|window| self.fetch_volume(window))).await
	}

	async fn fetch_volume(&self, window: &str) -> VolumeResult {
		let cache_key = format!("volumes:{}", window);
		if let Some(cached) = self.volumes_cache.get(&cache_key) {
			return cached;
		}

		match self.live_volume(window).await {
			Ok(result) => {
				self.volumes_cache.set(&cache_key, result.clone());
				result
			},
			Err(error) => {
				warn!(window, %error, "volume fetch failed, using estimate");
				VolumeResult {
					window: window.to_string(),
					volume_usd: self.estimates.fallback_volume_usd(window),
					estimated: true,
				}
			},
		}
	}

	async fn live_volume(&self, window: &str) -> ClientResult<VolumeResult> {
		let body = self
			.upstream
			.fetch(&self.catalog.volume_requests(window))
			.await?;

		let volume_usd = extract::extract_f64(&body, extract::VOLUME_USD_FIELDS).ok_or(
			ClientError::Validation {
				reason: "volume response carries no recognizable volume field".to_string(),
			},
		)?;

		Ok(VolumeResult {
			window: window.to_string(),
			volume_usd,
			estimated: false,
		})
	}

	async fn fetch_rates(&self, routes: &[Route], notionals: &[Amount]) -> Vec<RateResult> {
		let pairs: Vec<(&Route, &Amount)> = routes
			.iter()
			.flat_map(|route| notionals.iter().map(move |notional| (route, notional)))
			.collect();

		join_all(
			pairs
				.into_iter()
				.map(|(route, notional)| self.fetch_rate(route, notional)),
		)
		.await
	}

	async fn fetch_rate(&self, route: &Route, notional: &Amount) -> RateResult {
		match self.live_rate(route, notional).await {
			Ok(result) => result,
			Err(error) => {
				warn!(
					route = %route,
					notional = %notional,
					%error,
					"rate fetch failed, using fee-model estimate"
				);
				self.fallback_rate(route, notional)
			},
		}
	}

	async fn live_rate(&self, route: &Route, notional: &Amount) -> ClientResult<RateResult> {
		let body = self
			.upstream
			.fetch(&self.catalog.quote_requests(route, notional))
			.await?;

		let amount_out = extract::extract_amount(&body, extract::AMOUNT_OUT_FIELDS).ok_or(
			ClientError::Validation {
				reason: "quote response carries no recognizable output amount".to_string(),
			},
		)?;

		let total_fees_usd = extract::extract_f64(&body, extract::FEE_USD_FIELDS)
			.unwrap_or_else(|| self.model_fee_usd(route, notional));

		Ok(RateResult {
			route: route.clone(),
			amount_in: *notional,
			amount_out,
			effective_rate: rates::effective_rate(
				notional,
				&amount_out,
				route.source.decimals,
				route.destination.decimals,
			),
			total_fees_usd,
			quoted_at: Utc::now(),
			estimated: false,
		})
	}

	/// Deterministic rate from the static fee model: decimal-adjusted 1:1
	/// minus the assumed bridge fee
	fn fallback_rate(&self, route: &Route, notional: &Amount) -> RateResult {
		let scaled = rates::scale_decimals(
			notional,
			route.source.decimals,
			route.destination.decimals,
		);
		let amount_out = rates::apply_fee_bps(&scaled, self.estimates.fee_bps());

		RateResult {
			route: route.clone(),
			amount_in: *notional,
			amount_out,
			effective_rate: rates::effective_rate(
				notional,
				&amount_out,
				route.source.decimals,
				route.destination.decimals,
			),
			total_fees_usd: self.model_fee_usd(route, notional),
			quoted_at: Utc::now(),
			estimated: true,
		}
	}

	fn model_fee_usd(&self, route: &Route, notional: &Amount) -> f64 {
		rates::fee_usd(
			notional,
			route.source.decimals,
			self.estimates.usd_price(&route.source),
			self.estimates.fee_bps(),
		)
	}

	async fn fetch_liquidity(&self, routes: &[Route]) -> Vec<RouteLiquidity> {
		join_all(routes.iter().map(|route| self.route_liquidity(route))).await
	}

	async fn route_liquidity(&self, route: &Route) -> RouteLiquidity {
		let probe = LiveQuoteProbe {
			upstream: &self.upstream,
			catalog: &self.catalog,
			successes: AtomicU32::new(0),
		};

		// Independent searches per budget run concurrently; results are
		// order-insensitive
		let depths = join_all(
			self.slippage_budgets_bps
				.iter()
				.map(|budget| self.solver.solve(&probe, route, *budget)),
		)
		.await;

		if probe.successes.load(Ordering::SeqCst) == 0 {
			warn!(route = %route, "no live depth probes succeeded, using static thresholds");
			return RouteLiquidity {
				route: route.clone(),
				thresholds: self
					.slippage_budgets_bps
					.iter()
					.map(|budget| LiquidityThreshold {
						max_amount_in: self.estimates.fallback_liquidity(route, *budget),
						slippage_bps: *budget,
						estimated: true,
					})
					.collect(),
			};
		}

		debug!(route = %route, "live depth search completed");
		RouteLiquidity {
			route: route.clone(),
			thresholds: self
				.slippage_budgets_bps
				.iter()
				.zip(depths)
				.map(|(budget, max_amount_in)| LiquidityThreshold {
					max_amount_in,
					slippage_bps: *budget,
					estimated: false,
				})
				.collect(),
		}
	}

	async fn fetch_assets(&self) -> Vec<Asset> {
		if let Some(cached) = self.assets_cache.get("assets") {
			return cached;
		}

		match self.live_assets().await {
			Ok(assets) => {
				self.assets_cache.set("assets", assets.clone());
				assets
			},
			Err(error) => {
				warn!(%error, "asset list fetch failed, using static table");
				self.estimates.fallback_assets()
			},
		}
	}

	async fn live_assets(&self) -> ClientResult<Vec<Asset>> {
		let body = self.upstream.fetch(&self.catalog.asset_requests()).await?;

		let entries = extract::extract_array(&body, extract::ASSET_LIST_FIELDS).ok_or(
			ClientError::Validation {
				reason: "asset response carries no recognizable token list".to_string(),
			},
		)?;

		let assets: Vec<Asset> = entries.iter().filter_map(parse_asset).collect();
		if assets.is_empty() {
			return Err(ClientError::Validation {
				reason: "asset response contained no parseable entries".to_string(),
			});
		}

		Ok(assets)
	}
}

/// Depth-solver probe backed by live quote endpoints
struct LiveQuoteProbe<'a> {
	upstream: &'a UpstreamClient,
	catalog: &'a EndpointCatalog,
	successes: AtomicU32,
}

#[async_trait]
impl QuoteProbe for LiveQuoteProbe<'_> {
	async fn probe(&self, route: &Route, amount_in: &Amount) -> ClientResult<Quote> {
		let body = self
			.upstream
			.fetch(&self.catalog.quote_requests(route, amount_in))
			.await?;

		let amount_out = extract::extract_amount(&body, extract::AMOUNT_OUT_FIELDS).ok_or(
			ClientError::Validation {
				reason: "quote response carries no recognizable output amount".to_string(),
			},
		)?;

		self.successes.fetch_add(1, Ordering::SeqCst);
		Ok(Quote::new(*amount_in, amount_out))
	}
}

/// Parse one heterogeneous asset entry via field extractors
fn parse_asset(entry: &serde_json::Value) -> Option<Asset> {
	const ADDRESS: &[extract::FieldExtractor] = &[extract::FieldExtractor {
		name: "address",
		path: &["address"],
	}];
	const SYMBOL: &[extract::FieldExtractor] = &[extract::FieldExtractor {
		name: "symbol",
		path: &["symbol"],
	}];
	const DECIMALS: &[extract::FieldExtractor] = &[extract::FieldExtractor {
		name: "decimals",
		path: &["decimals"],
	}];

	let chain_id = extract::extract_string(entry, extract::ASSET_CHAIN_FIELDS)?;
	let address = extract::extract_string(entry, ADDRESS)?;
	let symbol = extract::extract_string(entry, SYMBOL)?;
	let decimals = extract::extract_f64(entry, DECIMALS)? as u8;
	if decimals > 18 {
		return None;
	}

	Some(Asset::new(chain_id, address, symbol, decimals))
}
