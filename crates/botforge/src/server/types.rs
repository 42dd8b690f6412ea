//! Request and response bodies

use serde::{Deserialize, Serialize};

use crate::store::SearchHit;

/// Body of most successful write operations
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
  pub message: String,
}

impl MessageResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }
}

/// Query string of /load/custom
#[derive(Debug, Deserialize)]
pub struct CustomLoadParams {
  /// Target collection
  pub collection: Option<String>,
  /// Column to embed; defaults to `text` or all columns
  pub text_column: Option<String>,
}

/// Request for /query
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
  pub query: Option<String>,
  pub dataset: Option<String>,
}

/// Response for /query
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
  pub ai_response: String,
  pub vector_results: Vec<SearchHit>,
  pub context_used: String,
}

/// Request for /analyze
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
  pub dataset: Option<String>,
}

/// One entry of /datasets
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
  pub id: String,
  pub name: String,
  pub description: String,
  pub record_count: usize,
  pub last_updated: String,
  pub tags: Vec<String>,
  pub icon: String,
  pub color: String,
  pub source: String,
}

/// Response for /status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
}
