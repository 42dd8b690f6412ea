//! Dataset statistics handler

use axum::{extract::State, response::Json as ResponseJson};

use crate::analysis::{analyze, AnalysisResult};
use crate::context::AppContext;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::server::types::AnalyzeRequest;
use crate::server::DEFAULT_DATASET;

/// Documents examined per analysis
const SAMPLE_LIMIT: usize = 1000;

/// POST /analyze - Descriptive statistics over the first documents of a collection
pub async fn analyze_dataset(
  State(ctx): State<AppContext>,
  ApiJson(body): ApiJson<AnalyzeRequest>,
) -> ApiResult<ResponseJson<AnalysisResult>> {
  let dataset = body.dataset.unwrap_or_else(|| DEFAULT_DATASET.to_string());

  let total_records = ctx.store.count(&dataset).await?;
  if total_records == 0 {
    return Err(ApiError::NotFound("Dataset not found or empty".to_string()));
  }

  let sample = ctx.store.sample(&dataset, SAMPLE_LIMIT).await?;
  let mut analysis = analyze(&sample);
  analysis.summary.total_records = total_records;

  Ok(ResponseJson(analysis))
}
