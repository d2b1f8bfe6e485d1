//! xbridge Service
//!
//! Aggregation logic on top of the resilience core: the liquidity depth
//! solver, decimal-safe rate math, upstream response field extraction, static
//! fallback estimates, and the orchestrator that composes them.

pub mod aggregator;
pub mod depth;
pub mod endpoints;
pub mod estimates;
pub mod extract;
pub mod rates;
pub mod upstream;

pub use aggregator::Orchestrator;
pub use depth::{DepthSolver, QuoteProbe};
pub use endpoints::{EndpointCatalog, RequestDescriptor};
pub use estimates::{EstimateProvider, StaticEstimates};
pub use extract::FieldExtractor;
pub use upstream::UpstreamClient;
