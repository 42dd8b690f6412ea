//! Vector search and result processing for LanceDB

use anyhow::{anyhow, Result};
use arrow::array::{Array, Float32Array, StringArray};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};

use super::records::{EMBEDDING_COLUMN, ID_COLUMN, TEXT_COLUMN};
use crate::store::SearchHit;

/// Run a cosine nearest-neighbour query and convert the batches into hits
pub async fn search_similar_records(table: &Table, query: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
  let batches: Vec<RecordBatch> = table
    .vector_search(query)?
    .column(EMBEDDING_COLUMN)
    .distance_type(DistanceType::Cosine)
    .limit(limit)
    .execute()
    .await
    .map_err(|e| anyhow!("Vector search failed: {}", e))?
    .try_collect()
    .await
    .map_err(|e| anyhow!("Error reading batch: {}", e))?;

  let mut hits = Vec::new();
  for batch in &batches {
    hits.extend(process_result_batch(batch)?);
  }
  hits.truncate(limit);
  Ok(hits)
}

/// Process a single result batch into hits
fn process_result_batch(batch: &RecordBatch) -> Result<Vec<SearchHit>> {
  let ids = extract_string_column(batch, ID_COLUMN)?;
  let texts = extract_string_column(batch, TEXT_COLUMN)?;
  let distances = extract_distance_column(batch);

  Ok(
    (0..batch.num_rows())
      .map(|row| SearchHit {
        id: ids.value(row).to_string(),
        text: texts.value(row).to_string(),
        score: distance_to_similarity(distance_at(distances, row)),
      })
      .collect(),
  )
}

fn extract_string_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a StringArray> {
  batch
    .column_by_name(column_name)
    .ok_or_else(|| anyhow!("Missing '{}' column", column_name))?
    .as_any()
    .downcast_ref::<StringArray>()
    .ok_or_else(|| anyhow!("Failed to cast '{}' column to StringArray", column_name))
}

fn extract_distance_column(batch: &RecordBatch) -> Option<&Float32Array> {
  batch.column_by_name("_distance").and_then(|col| col.as_any().downcast_ref::<Float32Array>())
}

/// Missing distances are reported as orthogonal
fn distance_at(distances: Option<&Float32Array>, row: usize) -> f32 {
  match distances {
    Some(array) if row < array.len() && !array.is_null(row) => array.value(row),
    _ => 1.0,
  }
}

/// Cosine distance lies in [0, 2]; similarity is its complement
fn distance_to_similarity(distance: f32) -> f32 {
  1.0 - distance.clamp(0.0, 2.0)
}
