//! HTTP API
//!
//! Routes requests to the dataset loaders, the document store, the assistant
//! and the analyzer. Uses axum for routing and tower-http for tracing/CORS.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod types;

/// Collection used when a request names none
pub const DEFAULT_DATASET: &str = "olympics";
