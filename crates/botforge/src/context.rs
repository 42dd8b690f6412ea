//! Process-wide state shared by every request

use anyhow::Result;
use std::sync::Arc;

use crate::config::{Settings, INDEX_DIMENSIONS};
use crate::datasets::{CsvSource, HttpCsvSource};
use crate::genai::{Embedder, GeminiClient, TextGenerator};
use crate::store::{DocumentStore, LanceDbStore};

/// The store connection and AI clients, built once at start-up
#[derive(Clone)]
pub struct AppContext {
  pub store: Arc<dyn DocumentStore>,
  pub embedder: Arc<dyn Embedder>,
  pub generator: Arc<dyn TextGenerator>,
  pub csv_source: Arc<dyn CsvSource>,
}

impl AppContext {
  pub fn new(
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    csv_source: Arc<dyn CsvSource>,
  ) -> Self {
    Self { store, embedder, generator, csv_source }
  }

  /// Connect to the store, then configure the Gemini client
  pub async fn from_settings(settings: &Settings) -> Result<Self> {
    let store = LanceDbStore::open(&settings.store_location(), INDEX_DIMENSIONS).await?;

    let gemini = Arc::new(
      GeminiClient::new(settings.gemini_base_url.clone(), settings.gemini_api_key.clone())
        .with_models(settings.embedding_model.clone(), settings.generation_model.clone()),
    );
    tracing::info!(
      project = %settings.project_id,
      embedding_model = %settings.embedding_model,
      generation_model = %settings.generation_model,
      "Configured Gemini client"
    );

    Ok(Self::new(Arc::new(store), gemini.clone(), gemini, Arc::new(HttpCsvSource::new())))
  }
}
