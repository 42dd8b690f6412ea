//! Document store abstraction
//!
//! Collections hold `{text, embedding}` records. Implementations own the
//! similarity index and the nearest-neighbour query; callers only see this
//! trait so the HTTP layer can run against any backend.

pub mod lancedb;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use self::lancedb::LanceDbStore;

/// A stored document as a JSON object, used by the analysis path
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Record ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub text: String,
  pub embedding: Vec<f32>,
}

/// A similarity search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
  pub id: String,
  pub text: String,
  /// Cosine similarity, higher is closer
  pub score: f32,
}

/// A collection and its live document count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
  pub name: String,
  pub count: usize,
}

/// Name of the similarity index built for a collection
pub fn index_name(collection: &str) -> String {
  format!("{collection}_vector_index")
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Append records to a collection, creating it when needed. Returns the
  /// number of records written.
  async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<usize>;

  /// Build the cosine similarity index over `embedding` and return its name
  async fn create_similarity_index(&self, collection: &str) -> Result<String>;

  /// Top-k nearest records. Never fails: a missing index or a failed query
  /// is logged and yields no hits.
  async fn similarity_search(&self, collection: &str, query: &[f32], k: usize) -> Vec<SearchHit>;

  /// Every collection with its live document count
  async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

  /// Number of documents in a collection, zero when it does not exist
  async fn count(&self, collection: &str) -> Result<usize>;

  /// The first `limit` documents of a collection
  async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Document>>;
}
