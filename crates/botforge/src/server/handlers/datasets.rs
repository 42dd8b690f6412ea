//! Dataset ingestion, indexing and listing handlers

use axum::{
  extract::{Extension, Path, Query, State},
  response::Json,
};
use chrono::Utc;

use crate::context::AppContext;
use crate::datasets::{custom_texts, Dataset, LoadedDataset};
use crate::error::{ApiError, ApiResult};
use crate::ingest::ingest;
use crate::server::middleware::RequestContext;
use crate::server::types::{CustomLoadParams, DatasetSummary, MessageResponse};

const DEFAULT_ICON: &str = "📊";
const DEFAULT_COLOR: &str = "#8884d8";

/// POST /load/{dataset} - Fetch, embed and store a built-in dataset
pub async fn load_dataset(
  State(ctx): State<AppContext>,
  Extension(request): Extension<RequestContext>,
  Path(dataset): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
  let dataset: Dataset = dataset.parse().map_err(|_| ApiError::BadRequest("Unknown dataset".to_string()))?;

  tracing::info!(request_id = %request.request_id, dataset = dataset.id(), "Loading dataset");
  let loaded = dataset.load(ctx.csv_source.as_ref()).await?;
  let name = loaded.collection.clone();
  ingest(&ctx, loaded).await?;

  Ok(Json(MessageResponse::new(format!("{name} dataset loaded and inserted"))))
}

/// POST /load/custom - Embed and store an uploaded CSV
pub async fn load_custom(
  State(ctx): State<AppContext>,
  Query(params): Query<CustomLoadParams>,
  body: String,
) -> ApiResult<Json<MessageResponse>> {
  let collection = params
    .collection
    .filter(|c| !c.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("No collection provided".to_string()))?;

  let texts = custom_texts(&body, params.text_column.as_deref())
    .map_err(|e| ApiError::BadRequest(format!("Invalid CSV: {e}")))?;
  if texts.is_empty() {
    return Err(ApiError::BadRequest("CSV contains no rows".to_string()));
  }

  let report = ingest(&ctx, LoadedDataset { collection: collection.clone(), texts }).await?;
  Ok(Json(MessageResponse::new(format!(
    "{collection} dataset loaded and inserted ({} records, {} failed)",
    report.inserted, report.failed
  ))))
}

/// POST /create-index/{dataset} - Build the collection's similarity index
pub async fn create_index(
  State(ctx): State<AppContext>,
  Path(dataset): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
  let name = ctx.store.create_similarity_index(&dataset).await?;
  Ok(Json(MessageResponse::new(format!("Vector index {name} created."))))
}

/// GET /datasets - Every stored collection with its live record count
pub async fn list_datasets(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<DatasetSummary>>> {
  let last_updated = Utc::now().format("%Y-%m-%d").to_string();
  let collections = ctx.store.list_collections().await?;

  let summaries = collections
    .into_iter()
    .map(|collection| {
      let known = collection.name.parse::<Dataset>().ok();
      DatasetSummary {
        name: capitalize(&collection.name),
        description: known
          .map(|d| d.description().to_string())
          .unwrap_or_else(|| format!("Dataset for {}", collection.name)),
        record_count: collection.count,
        last_updated: last_updated.clone(),
        tags: known.map(|d| d.tags().iter().map(|t| t.to_string()).collect()).unwrap_or_default(),
        icon: DEFAULT_ICON.to_string(),
        color: DEFAULT_COLOR.to_string(),
        source: known.map(|d| d.source_url().to_string()).unwrap_or_default(),
        id: collection.name,
      }
    })
    .collect();

  Ok(Json(summaries))
}

/// Upper-case the first character, lower-case the rest
fn capitalize(name: &str) -> String {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    None => String::new(),
  }
}
