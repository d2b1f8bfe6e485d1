//! Full-outage fallback behavior: every endpoint down, snapshot still answers

use std::sync::Arc;

use xbridge_aggregator::mocks::{route_eth_polygon, MockResponse, MockTransport};
use xbridge_aggregator::{
	AggregatorBuilder, Amount, ClientError, Orchestrator, Settings, SnapshotRequest,
};

fn outage_settings() -> Settings {
	let mut settings = Settings::default();
	settings.retry.max_retries = 1;
	settings.retry.base_delay_ms = 1;
	settings.retry.max_delay_ms = 4;
	settings.rate_limit.enabled = false;
	settings.circuit_breaker.failure_threshold = 10_000;
	settings.solver.iterations = 5;
	settings
}

/// Transport where every request fails at the connection level
fn dead_transport() -> Arc<MockTransport> {
	let transport = Arc::new(MockTransport::new());
	transport.respond(
		"http",
		MockResponse::Error(ClientError::Network {
			reason: "connection refused".to_string(),
		}),
	);
	transport
}

fn orchestrator(transport: Arc<MockTransport>) -> Orchestrator {
	AggregatorBuilder::new()
		.with_settings(outage_settings())
		.with_transport(transport)
		.build()
		.expect("orchestrator should build")
}

#[tokio::test]
async fn test_full_outage_rate_falls_back_to_fee_model() {
	let orchestrator = orchestrator(dead_transport());

	// ETH->Polygon USDC route, 6-decimal notional of 1,000,000
	let request = SnapshotRequest::new(
		vec![route_eth_polygon()],
		vec![Amount::from_decimal_str("1000000").unwrap()],
		vec!["1d".to_string()],
	);

	let snapshot = orchestrator
		.get_snapshot(&request)
		.await
		.expect("outage must not surface an error");

	// amount_out = notional * 9975 / 10000 under the 25bps fee model
	assert_eq!(snapshot.rates.len(), 1);
	let rate = &snapshot.rates[0];
	assert!(rate.estimated);
	assert_eq!(rate.amount_out, Amount::from_decimal_str("997500").unwrap());
	assert!((rate.effective_rate - 0.9975).abs() < 1e-12);

	// totalFeesUsd from the 25bps model: 1.0 USDC * $1.00 * 0.25%
	assert!((rate.total_fees_usd - 0.0025).abs() < 1e-12);
}

#[tokio::test]
async fn test_full_outage_populates_every_category() {
	let transport = dead_transport();
	let orchestrator = orchestrator(Arc::clone(&transport));

	let request = SnapshotRequest::new(
		vec![route_eth_polygon()],
		vec![Amount::from_decimal_str("1000000").unwrap()],
		vec!["1d".to_string(), "30d".to_string()],
	);

	let snapshot = orchestrator.get_snapshot(&request).await.unwrap();

	// Volumes come from the static estimate tables
	assert_eq!(snapshot.volumes.len(), 2);
	assert!(snapshot.volumes.iter().all(|v| v.estimated));
	assert_eq!(snapshot.volumes[0].volume_usd, 5_000_000.0);
	assert_eq!(snapshot.volumes[1].volume_usd, 150_000_000.0);

	// Liquidity thresholds come from the static tables, scaled to the
	// source asset's 6 decimals
	assert_eq!(snapshot.liquidity.len(), 1);
	let thresholds = &snapshot.liquidity[0].thresholds;
	assert_eq!(thresholds.len(), 2);
	assert!(thresholds.iter().all(|t| t.estimated));
	assert_eq!(
		thresholds[0].max_amount_in,
		Amount::from_decimal_str("100000000000").unwrap()
	);
	assert_eq!(
		thresholds[1].max_amount_in,
		Amount::from_decimal_str("250000000000").unwrap()
	);

	// Assets come from the static table
	assert!(!snapshot.assets.is_empty());
}

#[tokio::test]
async fn test_outage_is_visible_in_metrics_not_errors() {
	let transport = dead_transport();
	let orchestrator = orchestrator(Arc::clone(&transport));

	let request = SnapshotRequest::new(
		vec![route_eth_polygon()],
		vec![Amount::from_decimal_str("1000000").unwrap()],
		vec!["1d".to_string()],
	);

	orchestrator.get_snapshot(&request).await.unwrap();

	let metrics = orchestrator.get_metrics();
	assert!(metrics.api_calls.total > 0);
	assert_eq!(metrics.api_calls.success, 0);
	assert_eq!(
		metrics.api_calls.failures + metrics.api_calls.timeouts,
		metrics.api_calls.total
	);
}

#[tokio::test]
async fn test_recovery_after_outage_serves_live_data() {
	let transport = Arc::new(MockTransport::new());
	// Two connection failures, then the endpoint comes back
	transport.respond_sequence(
		"analytics/volume",
		vec![
			MockResponse::Error(ClientError::Network {
				reason: "connection refused".to_string(),
			}),
			MockResponse::Error(ClientError::Network {
				reason: "connection refused".to_string(),
			}),
			MockResponse::Json {
				status: 200,
				body: serde_json::json!({"volumeUsd": 777.0}),
			},
		],
	);
	transport.respond("v1/quote", MockResponse::QuoteFromAmount { fee_bps: 0 });
	transport.respond(
		"v1/tokens",
		MockResponse::Json {
			status: 200,
			body: xbridge_aggregator::mocks::tokens_body(),
		},
	);

	// max_retries = 1 consumes both scripted failures within the first
	// fetch's retry budget
	let orchestrator = AggregatorBuilder::new()
		.with_settings(outage_settings())
		.with_transport(transport.clone())
		.build()
		.unwrap();

	let request = SnapshotRequest::new(
		vec![route_eth_polygon()],
		vec![Amount::from_decimal_str("1000000").unwrap()],
		vec!["1d".to_string()],
	);

	// First snapshot: volume estimate (both volume descriptors fail)
	let first = orchestrator.get_snapshot(&request).await.unwrap();
	assert!(first.volumes[0].estimated);

	// Second snapshot: the estimate was not cached, so the recovered
	// endpoint is consulted again and serves live data
	let second = orchestrator.get_snapshot(&request).await.unwrap();
	assert!(!second.volumes[0].estimated);
	assert_eq!(second.volumes[0].volume_usd, 777.0);
}
