//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use crate::context::AppContext;
use crate::server::handlers::{analyze, datasets, query, status};
use crate::server::middleware::request_context_middleware;

/// Create the application router over a shared context
pub fn create_router(ctx: AppContext) -> Router {
  Router::new()
    .route("/status", get(status::status))
    // Ingestion
    .route("/load/custom", post(datasets::load_custom))
    .route("/load/{dataset}", post(datasets::load_dataset))
    .route("/create-index/{dataset}", post(datasets::create_index))
    .route("/datasets", get(datasets::list_datasets))
    // Retrieval and statistics
    .route("/query", post(query::query))
    .route("/analyze", post(analyze::analyze_dataset))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(ctx)
}
