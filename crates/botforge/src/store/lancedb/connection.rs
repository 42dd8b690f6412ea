//! Database connection management for LanceDB

use anyhow::{anyhow, Result};
use lancedb::{connect, Connection};
use std::path::Path;

/// Create a LanceDB connection, creating the local data directory if needed
pub async fn create_connection(uri: &str) -> Result<Connection> {
  if !uri.contains("://") {
    ensure_data_directory_exists(Path::new(uri))?;
  }

  connect(uri).execute().await.map_err(|e| anyhow!("Failed to connect to LanceDB at '{}': {}", uri, e))
}

/// Create data directory if it doesn't exist
fn ensure_data_directory_exists(data_dir: &Path) -> Result<()> {
  if !data_dir.exists() {
    std::fs::create_dir_all(data_dir).map_err(|e| anyhow!("Failed to create data directory: {}", e))?;
  }
  Ok(())
}
