//! Conversion of stored rows into JSON documents

use anyhow::{anyhow, Result};
use arrow::record_batch::RecordBatch;

use crate::store::Document;

/// Render record batches as one JSON object per row, keeping column order
pub fn batches_to_documents(batches: &[RecordBatch]) -> Result<Vec<Document>> {
  if batches.iter().all(|batch| batch.num_rows() == 0) {
    return Ok(Vec::new());
  }

  let mut writer = arrow_json::ArrayWriter::new(Vec::new());
  let refs: Vec<&RecordBatch> = batches.iter().collect();
  writer.write_batches(&refs).map_err(|e| anyhow!("Failed to encode rows as JSON: {}", e))?;
  writer.finish().map_err(|e| anyhow!("Failed to encode rows as JSON: {}", e))?;

  let bytes = writer.into_inner();
  serde_json::from_slice(&bytes).map_err(|e| anyhow!("Invalid JSON rows: {}", e))
}
