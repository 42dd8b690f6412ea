//! BotForge REST Server
//!
//! Loads configuration from the environment, connects to the vector store and
//! serves the dataset, query and analysis endpoints.

use anyhow::Result;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use botforge::config::Settings;
use botforge::server::startup::start_server;

#[tokio::main]
async fn main() -> Result<()> {
  let settings = Settings::load();

  // Lance and DataFusion are chatty at info level
  let filter = if settings.verbose {
    EnvFilter::new("debug,lance=warn,lance_datafusion=warn,datafusion=warn,hyper=info")
  } else {
    EnvFilter::new("botforge=info,botforge_server=info,tower_http=info,lance=error,lance_datafusion=error,datafusion=error,warn")
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  tracing::info!("Starting BotForge server v{}", env!("CARGO_PKG_VERSION"));
  tracing::info!("Binding to address: {}", settings.bind);

  start_server(&settings).await
}
