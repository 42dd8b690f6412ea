//! Embedding and storing loaded rows

use anyhow::Result;

use crate::context::AppContext;
use crate::datasets::LoadedDataset;
use crate::genai::TaskType;
use crate::store::Record;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
  pub inserted: usize,
  pub failed: usize,
}

/// Embed every row one at a time and insert the successes in one batch.
/// A row whose embedding fails is dropped; the run carries on.
pub async fn ingest(ctx: &AppContext, dataset: LoadedDataset) -> Result<IngestReport> {
  let total = dataset.texts.len();
  let mut records = Vec::with_capacity(total);
  let mut failed = 0;

  for (index, text) in dataset.texts.into_iter().enumerate() {
    if text.is_empty() {
      continue;
    }

    match ctx.embedder.embed(&text, TaskType::RetrievalDocument).await {
      Ok(embedding) => records.push(Record { text, embedding }),
      Err(e) => {
        failed += 1;
        tracing::warn!(collection = %dataset.collection, row = index, "Failed: {e}");
      }
    }

    if (index + 1) % 100 == 0 {
      tracing::debug!(collection = %dataset.collection, "Embedded {}/{} rows", index + 1, total);
    }
  }

  let inserted = if records.is_empty() { 0 } else { ctx.store.insert_many(&dataset.collection, records).await? };

  tracing::info!(
    collection = %dataset.collection,
    inserted,
    failed,
    "Inserted {inserted} records into {}",
    dataset.collection
  );
  Ok(IngestReport { inserted, failed })
}
