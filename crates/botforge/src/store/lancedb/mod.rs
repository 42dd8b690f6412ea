//! LanceDB-backed document store
//!
//! Each collection is a LanceDB table with `id`, `text` and a fixed-width
//! `embedding` column. Similarity indexes are IVF indexes with cosine
//! distance, named after the collection.

pub mod connection;
pub mod documents;
pub mod records;
pub mod search;

use anyhow::{anyhow, Result};
use arrow::record_batch::RecordBatchIterator;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::index::vector::IvfFlatIndexBuilder;
use lancedb::index::Index;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{Connection, DistanceType, Table};

use crate::config::INDEX_DIMENSIONS;
use crate::store::{index_name, CollectionInfo, Document, DocumentStore, Record, SearchHit};
use connection::create_connection;
use documents::batches_to_documents;
use records::{embedding_width, records_to_arrow_batch, EMBEDDING_COLUMN, ID_COLUMN, TEXT_COLUMN};
use search::search_similar_records;

/// Document store over a LanceDB database
pub struct LanceDbStore {
  connection: Connection,
  dimension: usize,
}

impl LanceDbStore {
  /// Open (or create) the database at `uri`. New collections get an
  /// embedding column of `dimension` entries.
  pub async fn open(uri: &str, dimension: usize) -> Result<Self> {
    let connection = create_connection(uri).await?;
    tracing::info!(uri, dimension, "Opened LanceDB store");
    Ok(Self { connection, dimension })
  }

  async fn table_exists(&self, name: &str) -> Result<bool> {
    let tables =
      self.connection.table_names().execute().await.map_err(|e| anyhow!("Failed to list tables: {}", e))?;
    Ok(tables.iter().any(|t| t == name))
  }

  async fn open_table(&self, name: &str) -> Result<Table> {
    self
      .connection
      .open_table(name)
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to open collection '{}': {}", name, e))
  }

  /// Keep only records the fixed-width column can hold
  fn storable(&self, collection: &str, records: Vec<Record>) -> Vec<Record> {
    let total = records.len();
    let kept: Vec<Record> = records
      .into_iter()
      .filter(|r| !r.text.is_empty() && r.embedding.len() == self.dimension)
      .collect();

    if kept.len() < total {
      tracing::warn!(
        collection,
        skipped = total - kept.len(),
        expected_dimension = self.dimension,
        "Skipping records with empty text or mismatched embedding width"
      );
    }
    kept
  }

  async fn search(&self, collection: &str, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
    if !self.table_exists(collection).await? {
      return Err(anyhow!("Collection '{}' does not exist", collection));
    }

    let table = self.open_table(collection).await?;
    let wanted = index_name(collection);
    let indices = table.list_indices().await?;
    if !indices.iter().any(|index| index.name == wanted) {
      return Err(anyhow!("Similarity index '{}' has not been created", wanted));
    }

    search_similar_records(&table, query, k).await
  }
}

#[async_trait]
impl DocumentStore for LanceDbStore {
  async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<usize> {
    let records = self.storable(collection, records);
    if records.is_empty() {
      return Ok(0);
    }

    let batch = records_to_arrow_batch(&records, self.dimension)?;
    let schema = batch.schema();
    let batch_iter = RecordBatchIterator::new(vec![Ok(batch)], schema);

    if self.table_exists(collection).await? {
      self
        .open_table(collection)
        .await?
        .add(batch_iter)
        .execute()
        .await
        .map_err(|e| anyhow!("Failed to insert into '{}': {}", collection, e))?;
    } else {
      self
        .connection
        .create_table(collection, batch_iter)
        .execute()
        .await
        .map_err(|e| anyhow!("Failed to create collection '{}': {}", collection, e))?;
    }

    tracing::info!(collection, inserted = records.len(), "Inserted records");
    Ok(records.len())
  }

  async fn create_similarity_index(&self, collection: &str) -> Result<String> {
    let table = self.open_table(collection).await?;
    let name = index_name(collection);

    let schema = table.schema().await?;
    match embedding_width(&schema) {
      Some(width) if width != INDEX_DIMENSIONS => tracing::warn!(
        collection,
        width,
        declared = INDEX_DIMENSIONS,
        "Embedding width differs from the declared index dimensionality"
      ),
      Some(_) => {}
      None => return Err(anyhow!("Collection '{}' has no '{}' vector column", collection, EMBEDDING_COLUMN)),
    }

    // Re-creating an index replaces the previous one under the same name
    let index = Index::IvfFlat(IvfFlatIndexBuilder::default().distance_type(DistanceType::Cosine));
    table
      .create_index(&[EMBEDDING_COLUMN], index)
      .name(name.clone())
      .replace(true)
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to create index '{}': {}", name, e))?;

    tracing::info!(collection, index = %name, "Created similarity index");
    Ok(name)
  }

  async fn similarity_search(&self, collection: &str, query: &[f32], k: usize) -> Vec<SearchHit> {
    match self.search(collection, query, k).await {
      Ok(hits) => hits,
      Err(e) => {
        tracing::error!(
          collection,
          index = %index_name(collection),
          query_dimension = query.len(),
          "Vector search error: {e}"
        );
        Vec::new()
      }
    }
  }

  async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
    let names =
      self.connection.table_names().execute().await.map_err(|e| anyhow!("Failed to list tables: {}", e))?;

    let mut collections = Vec::with_capacity(names.len());
    for name in names {
      let count = self.open_table(&name).await?.count_rows(None).await?;
      collections.push(CollectionInfo { name, count });
    }
    Ok(collections)
  }

  async fn count(&self, collection: &str) -> Result<usize> {
    if !self.table_exists(collection).await? {
      return Ok(0);
    }
    Ok(self.open_table(collection).await?.count_rows(None).await?)
  }

  async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Document>> {
    if !self.table_exists(collection).await? {
      return Ok(Vec::new());
    }

    let batches: Vec<_> = self
      .open_table(collection)
      .await?
      .query()
      .select(Select::columns(&[ID_COLUMN, TEXT_COLUMN]))
      .limit(limit)
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to read '{}': {}", collection, e))?
      .try_collect()
      .await
      .map_err(|e| anyhow!("Error reading batch: {}", e))?;

    batches_to_documents(&batches)
  }
}
