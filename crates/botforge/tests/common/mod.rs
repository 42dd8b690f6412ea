//! In-memory stand-ins for the store, Gemini and dataset downloads

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use botforge::context::AppContext;
use botforge::datasets::CsvSource;
use botforge::genai::{Embedder, TaskType, TextGenerator};
use botforge::server::routing::create_router;
use botforge::store::{index_name, CollectionInfo, Document, DocumentStore, Record, SearchHit};

pub const DIMENSIONS: usize = 768;

#[derive(Default)]
pub struct MemoryStore {
  collections: Mutex<BTreeMap<String, Vec<Record>>>,
  indexes: Mutex<HashSet<String>>,
}

impl MemoryStore {
  pub fn records(&self, collection: &str) -> Vec<Record> {
    self.collections.lock().unwrap().get(collection).cloned().unwrap_or_default()
  }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
  let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
  let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
  let denominator = norm(a) * norm(b);
  if denominator == 0.0 {
    0.0
  } else {
    dot / denominator
  }
}

#[async_trait]
impl DocumentStore for MemoryStore {
  async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<usize> {
    let count = records.len();
    self.collections.lock().unwrap().entry(collection.to_string()).or_default().extend(records);
    Ok(count)
  }

  async fn create_similarity_index(&self, collection: &str) -> Result<String> {
    if !self.collections.lock().unwrap().contains_key(collection) {
      return Err(anyhow!("Collection '{}' does not exist", collection));
    }
    let name = index_name(collection);
    self.indexes.lock().unwrap().insert(name.clone());
    Ok(name)
  }

  async fn similarity_search(&self, collection: &str, query: &[f32], k: usize) -> Vec<SearchHit> {
    if !self.indexes.lock().unwrap().contains(&index_name(collection)) {
      return Vec::new();
    }

    let mut hits: Vec<SearchHit> = self
      .records(collection)
      .into_iter()
      .enumerate()
      .map(|(i, record)| SearchHit {
        id: i.to_string(),
        score: cosine(&record.embedding, query),
        text: record.text,
      })
      .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(k);
    hits
  }

  async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
    Ok(
      self
        .collections
        .lock()
        .unwrap()
        .iter()
        .map(|(name, records)| CollectionInfo { name: name.clone(), count: records.len() })
        .collect(),
    )
  }

  async fn count(&self, collection: &str) -> Result<usize> {
    Ok(self.records(collection).len())
  }

  async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Document>> {
    Ok(
      self
        .records(collection)
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, record)| {
          let mut doc = Document::new();
          doc.insert("id".to_string(), json!(i.to_string()));
          doc.insert("text".to_string(), json!(record.text));
          doc.insert("embedding".to_string(), json!(record.embedding));
          doc
        })
        .collect(),
    )
  }
}

/// Bag-of-letters embedding; rows containing `FAIL` cannot be embedded
#[derive(Default)]
pub struct LetterEmbedder;

#[async_trait]
impl Embedder for LetterEmbedder {
  async fn embed(&self, text: &str, _task: TaskType) -> Result<Vec<f32>> {
    if text.contains("FAIL") {
      return Err(anyhow!("embedding quota exceeded"));
    }
    let mut vector = vec![0.0; DIMENSIONS];
    for byte in text.to_lowercase().bytes().filter(u8::is_ascii_alphabetic) {
      vector[(byte - b'a') as usize] += 1.0;
    }
    vector[DIMENSIONS - 1] = 0.01;
    Ok(vector)
  }
}

/// Replies with a fixed text, or fails every call when `reply` is None
pub struct ScriptedGenerator {
  pub reply: Option<String>,
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
  async fn generate(&self, _prompt: &str) -> Result<String> {
    self.reply.clone().ok_or_else(|| anyhow!("generative API unavailable"))
  }
}

/// Serves a fixed CSV per source url
pub struct FixtureCsv {
  pub files: BTreeMap<&'static str, &'static str>,
}

#[async_trait]
impl CsvSource for FixtureCsv {
  async fn fetch(&self, url: &str) -> Result<String> {
    self
      .files
      .iter()
      .find(|(suffix, _)| url.ends_with(*suffix))
      .map(|(_, body)| body.to_string())
      .ok_or_else(|| anyhow!("404 for {url}"))
  }
}

pub const OLYMPICS_CSV: &str = "\
id,name,noc,season,medal
1,A,USA,Summer,Gold
2,B,USA,Summer,Silver
3,C,KEN,Summer,Gold
4,D,NOR,Winter,Gold
";

pub const GDELT_CSV: &str = "\
SQLDATE,Actor1Name,Actor2Name,EventCode,EventBaseCode,EventRootCode
20150218,KENYA,UGANDA,043,043,04
20150219,FRANCE,GERMANY,036,036,03
";

pub const UNSDG_CSV: &str = "\
Goal,Indicator,Country,Value
1,1.1.1,Kenya,36.8
3,3.1.1,Chile,22
";

pub fn fixture_csv() -> FixtureCsv {
  FixtureCsv {
    files: BTreeMap::from([("olympics.csv", OLYMPICS_CSV), ("gdelt_sample.csv", GDELT_CSV), ("sdg.csv", UNSDG_CSV)]),
  }
}

pub struct TestApp {
  pub router: Router,
  pub store: Arc<MemoryStore>,
}

pub fn app_with_generator(reply: Option<&str>) -> TestApp {
  let store = Arc::new(MemoryStore::default());
  let ctx = AppContext::new(
    store.clone(),
    Arc::new(LetterEmbedder),
    Arc::new(ScriptedGenerator { reply: reply.map(str::to_string) }),
    Arc::new(fixture_csv()),
  );
  TestApp { router: create_router(ctx), store }
}

pub fn app() -> TestApp {
  app_with_generator(Some("model answer"))
}

impl TestApp {
  pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
      Some(json) => builder.header("content-type", "application/json").body(Body::from(json.to_string())),
      None => builder.body(Body::empty()),
    }
    .unwrap();

    self.send(request).await
  }

  pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
    let response = self.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, value)
  }

  pub async fn insert(&self, collection: &str, texts: &[&str]) {
    let embedder = LetterEmbedder;
    let mut records = Vec::new();
    for text in texts {
      records.push(Record {
        text: text.to_string(),
        embedding: embedder.embed(text, TaskType::RetrievalDocument).await.unwrap(),
      });
    }
    self.store.insert_many(collection, records).await.unwrap();
  }
}
