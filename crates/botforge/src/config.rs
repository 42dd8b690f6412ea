//! Process configuration
//!
//! Everything is read once at start-up from flags or the environment (an
//! optional `.env` file is loaded first). Required values have no default, so
//! clap refuses to start the server when one of them is missing.

use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
pub const DEFAULT_GENERATION_MODEL: &str = "models/gemini-1.5-flash";

/// Embedding width the similarity index is declared with
pub const INDEX_DIMENSIONS: usize = 768;

#[derive(Parser, Debug, Clone)]
#[command(name = "botforge_server")]
#[command(about = "BotForge dataset and AI query server")]
#[command(version)]
pub struct Settings {
  /// Gemini API key
  #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
  pub gemini_api_key: String,

  /// Vector store location (a directory, or a remote LanceDB uri)
  #[arg(long, env = "MONGODB_URI")]
  pub database_uri: String,

  /// Database name, appended to local store locations
  #[arg(long, env = "MONGODB_DATABASE")]
  pub database_name: String,

  /// Google Cloud project the API key belongs to
  #[arg(long, env = "GOOGLE_PROJECT_ID")]
  pub project_id: String,

  /// Server bind address
  #[arg(long, env = "BOTFORGE_BIND", default_value = "127.0.0.1:5000")]
  pub bind: SocketAddr,

  /// Gemini REST endpoint
  #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
  pub gemini_base_url: Url,

  #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
  pub embedding_model: String,

  #[arg(long, default_value = DEFAULT_GENERATION_MODEL)]
  pub generation_model: String,

  /// Enable verbose logging
  #[arg(short, long)]
  pub verbose: bool,
}

impl Settings {
  /// Parse settings after loading `.env` from the working directory, if any
  pub fn load() -> Self {
    dotenv::dotenv().ok();
    Self::parse()
  }

  /// Location handed to the store connection
  pub fn store_location(&self) -> String {
    store_location(&self.database_uri, &self.database_name)
  }
}

/// Remote LanceDB databases are addressed by uri alone; everything else is
/// treated as a root under which each named database gets its own directory.
pub fn store_location(uri: &str, database: &str) -> String {
  if uri.starts_with("db://") {
    return uri.to_string();
  }
  if uri.contains("://") {
    return format!("{}/{}", uri.trim_end_matches('/'), database);
  }
  Path::new(uri).join(database).to_string_lossy().to_string()
}
