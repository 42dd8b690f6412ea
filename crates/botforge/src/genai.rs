//! Gemini REST client
//!
//! Two capabilities are used: `embedContent` to turn text into a vector and
//! `generateContent` for one-shot prompts. Each call is attempted once.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Intended use of an embedding, forwarded to the model. Questions are
/// embedded as documents too, so stored and query vectors share one space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
  RetrievalDocument,
}

/// Text in, fixed-length vector out
#[async_trait]
pub trait Embedder: Send + Sync {
  async fn embed(&self, text: &str, task: TaskType) -> Result<Vec<f32>>;
}

/// Prompt in, prose out
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
  http: reqwest::Client,
  base_url: Url,
  api_key: String,
  embedding_model: String,
  generation_model: String,
}

#[derive(Serialize)]
struct Content<'a> {
  parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
  model: &'a str,
  content: Content<'a>,
  task_type: TaskType,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
  embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
  values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
  contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: String,
}

impl GeminiClient {
  pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url,
      api_key: api_key.into(),
      embedding_model: crate::config::DEFAULT_EMBEDDING_MODEL.to_string(),
      generation_model: crate::config::DEFAULT_GENERATION_MODEL.to_string(),
    }
  }

  pub fn with_models(mut self, embedding_model: impl Into<String>, generation_model: impl Into<String>) -> Self {
    self.embedding_model = embedding_model.into();
    self.generation_model = generation_model.into();
    self
  }

  /// `<base>/models/<model>:<method>`
  fn endpoint(&self, model: &str, method: &str) -> Result<Url> {
    let model = model.strip_prefix("models/").unwrap_or(model);
    self
      .base_url
      .join(&format!("models/{model}:{method}"))
      .map_err(|e| anyhow!("Invalid Gemini endpoint for {}: {}", model, e))
  }

  async fn post<B: Serialize, R: DeserializeOwned>(&self, url: Url, body: &B) -> Result<R> {
    let response = self
      .http
      .post(url)
      .header("x-goog-api-key", &self.api_key)
      .json(body)
      .send()
      .await
      .map_err(|e| anyhow!("Gemini request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      return Err(anyhow!("Gemini returned {}: {}", status, detail.trim()));
    }

    response.json::<R>().await.map_err(|e| anyhow!("Invalid Gemini response: {}", e))
  }
}

#[async_trait]
impl Embedder for GeminiClient {
  async fn embed(&self, text: &str, task: TaskType) -> Result<Vec<f32>> {
    let request = EmbedContentRequest {
      model: &self.embedding_model,
      content: Content { parts: vec![Part { text }] },
      task_type: task,
    };
    let url = self.endpoint(&self.embedding_model, "embedContent")?;
    let response: EmbedContentResponse = self.post(url, &request).await?;

    if response.embedding.values.is_empty() {
      return Err(anyhow!("Gemini returned an empty embedding"));
    }
    Ok(response.embedding.values)
  }
}

#[async_trait]
impl TextGenerator for GeminiClient {
  async fn generate(&self, prompt: &str) -> Result<String> {
    let request = GenerateContentRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };
    let url = self.endpoint(&self.generation_model, "generateContent")?;
    let response: GenerateContentResponse = self.post(url, &request).await?;

    let text: String = response
      .candidates
      .into_iter()
      .next()
      .and_then(|candidate| candidate.content)
      .map(|content| content.parts.into_iter().map(|part| part.text).collect())
      .unwrap_or_default();

    if text.is_empty() {
      return Err(anyhow!("Gemini returned no text"));
    }
    Ok(text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::{Matcher, Server};

  fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
    let base = Url::parse(&format!("{}/v1beta/", server.url())).unwrap();
    GeminiClient::new(base, "test-key")
  }

  #[test]
  fn test_task_type_wire_name() {
    assert_eq!(serde_json::to_value(TaskType::RetrievalDocument).unwrap(), "RETRIEVAL_DOCUMENT");
  }

  #[tokio::test]
  async fn test_embed_sends_task_type_and_reads_values() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/v1beta/models/embedding-001:embedContent")
      .match_header("x-goog-api-key", "test-key")
      .match_body(Matcher::PartialJsonString(
        r#"{"model":"models/embedding-001","taskType":"RETRIEVAL_DOCUMENT","content":{"parts":[{"text":"hello"}]}}"#
          .to_string(),
      ))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"embedding":{"values":[0.1,0.2,0.3]}}"#)
      .create_async()
      .await;

    let embedding = client_for(&server).embed("hello", TaskType::RetrievalDocument).await.unwrap();
    assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_embed_error_status_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/v1beta/models/embedding-001:embedContent")
      .with_status(429)
      .with_body("quota exceeded")
      .create_async()
      .await;

    let err = client_for(&server).embed("hello", TaskType::RetrievalDocument).await.unwrap_err();
    assert!(err.to_string().contains("429"));
  }

  #[tokio::test]
  async fn test_generate_joins_candidate_parts() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"gold "},{"text":"medals"}]}}]}"#)
      .create_async()
      .await;

    let text = client_for(&server).generate("prompt").await.unwrap();
    assert_eq!(text, "gold medals");
  }

  #[tokio::test]
  async fn test_generate_without_candidates_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"candidates":[]}"#)
      .create_async()
      .await;

    assert!(client_for(&server).generate("prompt").await.is_err());
  }
}
