//! Arrow RecordBatch conversion for stored records

use anyhow::{anyhow, Result};
use arrow::array::{Array, FixedSizeListBuilder, Float32Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::Record;

pub const ID_COLUMN: &str = "id";
pub const TEXT_COLUMN: &str = "text";
pub const EMBEDDING_COLUMN: &str = "embedding";

/// Arrow schema of a collection table
pub fn collection_schema(dimension: usize) -> Arc<Schema> {
  Arc::new(Schema::new(vec![
    Field::new(ID_COLUMN, DataType::Utf8, false),
    Field::new(TEXT_COLUMN, DataType::Utf8, false),
    Field::new(
      EMBEDDING_COLUMN,
      DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dimension as i32),
      false,
    ),
  ]))
}

/// Convert records into a single batch, assigning each a fresh id.
/// Every embedding must already have `dimension` entries.
pub fn records_to_arrow_batch(records: &[Record], dimension: usize) -> Result<RecordBatch> {
  if records.is_empty() {
    return Err(anyhow!("Cannot create RecordBatch from empty records"));
  }

  let ids: StringArray = records.iter().map(|_| Some(Uuid::new_v4().to_string())).collect();
  let texts: StringArray = records.iter().map(|r| Some(r.text.as_str())).collect();
  let embeddings = embedding_array(records, dimension)?;

  let columns: Vec<Arc<dyn Array>> = vec![Arc::new(ids), Arc::new(texts), Arc::new(embeddings)];
  RecordBatch::try_new(collection_schema(dimension), columns)
    .map_err(|e| anyhow!("Failed to create RecordBatch: {}", e))
}

fn embedding_array(records: &[Record], dimension: usize) -> Result<arrow::array::FixedSizeListArray> {
  let mut builder =
    FixedSizeListBuilder::new(Float32Builder::with_capacity(dimension * records.len()), dimension as i32)
      .with_field(Arc::new(Field::new("item", DataType::Float32, true)));

  for record in records {
    if record.embedding.len() != dimension {
      return Err(anyhow!(
        "Embedding has {} dimensions, collection expects {}",
        record.embedding.len(),
        dimension
      ));
    }
    builder.values().append_slice(&record.embedding);
    builder.append(true);
  }

  Ok(builder.finish())
}

/// Width of the embedding column in an existing table schema
pub fn embedding_width(schema: &Schema) -> Option<usize> {
  match schema.field_with_name(EMBEDDING_COLUMN).ok()?.data_type() {
    DataType::FixedSizeList(_, size) => Some(*size as usize),
    _ => None,
  }
}
