//! Natural-language query handler

use axum::{
  extract::{Extension, State},
  response::Json as ResponseJson,
};

use crate::assistant::{self, Generated};
use crate::context::AppContext;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::genai::TaskType;
use crate::server::middleware::RequestContext;
use crate::server::types::{QueryRequest, QueryResponse};
use crate::server::DEFAULT_DATASET;

/// Nearest records retrieved per question
const TOP_K: usize = 5;
/// Hits quoted to the answer model
const CONTEXT_HITS: usize = 3;

pub const NO_RESULTS_ANSWER: &str = "I couldn't find relevant information in the dataset for your query.";

/// POST /query - Rewrite, embed, search, then answer from the hits
pub async fn query(
  State(ctx): State<AppContext>,
  Extension(request): Extension<RequestContext>,
  ApiJson(body): ApiJson<QueryRequest>,
) -> ApiResult<ResponseJson<QueryResponse>> {
  let question = body
    .query
    .filter(|q| !q.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("No query provided".to_string()))?;
  let dataset = body.dataset.unwrap_or_else(|| DEFAULT_DATASET.to_string());

  let search_query = assistant::rewrite(ctx.generator.as_ref(), &question).await;
  if let Generated::Model(rewritten) = &search_query {
    tracing::debug!(request_id = %request.request_id, search_query = %rewritten, "Rewrote question");
  }

  // The query is embedded the same way documents were
  let embedding = ctx.embedder.embed(&search_query.into_inner(), TaskType::RetrievalDocument).await?;
  let hits = ctx.store.similarity_search(&dataset, &embedding, TOP_K).await;

  if hits.is_empty() {
    return Ok(ResponseJson(QueryResponse {
      ai_response: NO_RESULTS_ANSWER.to_string(),
      vector_results: Vec::new(),
      context_used: String::new(),
    }));
  }

  let context = hits.iter().take(CONTEXT_HITS).map(|hit| hit.text.as_str()).collect::<Vec<_>>().join("\n");
  let answer = assistant::answer(ctx.generator.as_ref(), &question, &context).await;
  if answer.is_fallback() {
    tracing::warn!(request_id = %request.request_id, "Answered from context without the model");
  }

  Ok(ResponseJson(QueryResponse { ai_response: answer.into_inner(), vector_results: hits, context_used: context }))
}
