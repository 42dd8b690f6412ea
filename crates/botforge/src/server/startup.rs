//! Server startup and configuration

use anyhow::{anyhow, Result};
use axum::serve;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::context::AppContext;
use crate::server::routing::create_router;

/// Build the shared context and serve until the process is stopped
pub async fn start_server(settings: &Settings) -> Result<()> {
  let ctx = AppContext::from_settings(settings).await?;

  let app = create_router(ctx)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(settings.bind).await?;
  tracing::info!("Server listening on http://{}", settings.bind);

  serve(listener, app).await.map_err(|e| anyhow!("Server error: {}", e))?;
  tracing::info!("Server shutdown gracefully");
  Ok(())
}
