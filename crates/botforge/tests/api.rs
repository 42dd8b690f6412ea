mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::{app, app_with_generator, DIMENSIONS};

#[tokio::test]
async fn test_status_reports_healthy() {
  let (status, body) = app().request("GET", "/status", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_load_unknown_dataset_is_rejected() {
  let (status, body) = app().request("POST", "/load/unknown", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Unknown dataset");
}

#[tokio::test]
async fn test_load_each_known_dataset() {
  let app = app();
  for dataset in ["olympics", "gdelt", "unsdg"] {
    let (status, body) = app.request("POST", &format!("/load/{dataset}"), None).await;
    assert_eq!(status, StatusCode::OK, "{dataset}: {body}");
    assert_eq!(body["message"], format!("{dataset} dataset loaded and inserted"));

    let records = app.store.records(dataset);
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| !r.text.is_empty() && r.embedding.len() == DIMENSIONS));
  }

  let texts: Vec<String> = app.store.records("olympics").into_iter().map(|r| r.text).collect();
  assert_eq!(
    texts,
    vec!["KEN won 1 Gold, 0 Silver, 0 Bronze medals.", "USA won 1 Gold, 1 Silver, 0 Bronze medals."]
  );
}

#[tokio::test]
async fn test_load_custom_csv_drops_failed_embeddings() {
  let app = app();
  let request = Request::builder()
    .method("POST")
    .uri("/load/custom?collection=cities&text_column=summary")
    .header("content-type", "text/csv")
    .body(Body::from("name,summary\nOslo,Capital of Norway\nBad,FAIL to embed\nLima,Capital of Peru\n"))
    .unwrap();

  let (status, body) = app.send(request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "cities dataset loaded and inserted (2 records, 1 failed)");
  assert_eq!(app.store.records("cities").len(), 2);
}

#[tokio::test]
async fn test_load_custom_requires_collection() {
  let request = Request::builder().method("POST").uri("/load/custom").body(Body::from("text\nhello\n")).unwrap();
  let (status, _) = app().send(request).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_index_success_and_failure() {
  let app = app();
  app.insert("olympics", &["USA won 1 Gold"]).await;

  let (status, body) = app.request("POST", "/create-index/olympics", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Vector index olympics_vector_index created.");

  let (status, body) = app.request("POST", "/create-index/missing", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_query_without_query_field_is_bad_request() {
  let (status, body) = app().request("POST", "/query", Some(json!({"dataset": "olympics"}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "No query provided");
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
  let app = app();

  let (status, body) = app.request("POST", "/query", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

  let (status, body) = app.request("POST", "/query", Some(json!({"query": 5}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

  let request = Request::builder()
    .method("POST")
    .uri("/analyze")
    .header("content-type", "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let (status, body) = app.send(request).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_query_answers_from_nearest_records() {
  let app = app();
  app
    .insert("olympics", &["USA won 1 Gold", "KEN won 2 Gold", "NOR won 3 Silver", "FRA won 4 Bronze"])
    .await;
  app.request("POST", "/create-index/olympics", None).await;

  let (status, body) = app.request("POST", "/query", Some(json!({"query": "How did Kenya do?"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["ai_response"], "model answer");
  assert_eq!(body["vector_results"].as_array().unwrap().len(), 4);

  let context = body["context_used"].as_str().unwrap();
  assert_eq!(context.lines().count(), 3);
}

#[tokio::test]
async fn test_query_without_index_reports_nothing_found() {
  let app = app();
  app.insert("gdelt", &["On 20150218, event 043 occurred between KENYA and UGANDA."]).await;

  let (status, body) =
    app.request("POST", "/query", Some(json!({"query": "Kenya events", "dataset": "gdelt"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["ai_response"], "I couldn't find relevant information in the dataset for your query.");
  assert_eq!(body["vector_results"], json!([]));
  assert_eq!(body["context_used"], "");
}

#[tokio::test]
async fn test_query_survives_generation_outage() {
  let app = app_with_generator(None);
  app.insert("unsdg", &["Goal 1 - 1.1.1 in Kenya has value 36.8."]).await;
  app.request("POST", "/create-index/unsdg", None).await;

  let (status, body) =
    app.request("POST", "/query", Some(json!({"query": "Kenya poverty", "dataset": "unsdg"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body["ai_response"],
    "Based on the dataset, here are the relevant findings: Goal 1 - 1.1.1 in Kenya has value 36.8...."
  );
}

#[tokio::test]
async fn test_analyze_empty_dataset_is_not_found() {
  let (status, body) = app().request("POST", "/analyze", Some(json!({"dataset": "nothing"}))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Dataset not found or empty");
}

#[tokio::test]
async fn test_analyze_defaults_to_olympics() {
  let app = app();
  let texts: Vec<String> = (0..12).map(|i| format!("Country number {i} won a few medals here")).collect();
  let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
  app.insert("olympics", &refs).await;

  let (status, body) = app.request("POST", "/analyze", Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["summary"]["totalRecords"], 12);
  assert_eq!(body["trends"]["labels"][0], "Record 1");
  assert_eq!(body["trends"]["values"][9], 8);
  assert_eq!(body["distribution"]["labels"], json!(["Text Records", "Numeric Records", "Mixed Records"]));
  assert_eq!(body["correlations"], json!([]));
}

#[tokio::test]
async fn test_list_datasets_reports_live_counts() {
  let app = app();
  app.insert("olympics", &["a", "b"]).await;
  app.insert("myUpload", &["c"]).await;

  let (status, body) = app.request("GET", "/datasets", None).await;
  assert_eq!(status, StatusCode::OK);

  let entries = body.as_array().unwrap();
  assert_eq!(entries.len(), 2);

  let upload = entries.iter().find(|e| e["id"] == "myUpload").unwrap();
  assert_eq!(upload["name"], "Myupload");
  assert_eq!(upload["description"], "Dataset for myUpload");
  assert_eq!(upload["recordCount"], 1);
  assert_eq!(upload["tags"], json!([]));
  assert_eq!(upload["icon"], "📊");
  assert_eq!(upload["color"], "#8884d8");

  let olympics = entries.iter().find(|e| e["id"] == "olympics").unwrap();
  assert_eq!(olympics["recordCount"], 2);
  assert!(olympics["source"].as_str().unwrap().ends_with("olympics.csv"));
}
