//! Best-effort descriptive statistics over a sample of stored documents
//!
//! The heuristics are deliberately simple and order dependent: the first
//! field (in order of first appearance) that satisfies a rule is the one used.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::store::Document;

/// Fields never analyzed
const IGNORED_FIELDS: [&str; 3] = ["_id", "id", "embedding"];

const TREND_POINTS: usize = 10;
const TEXT_PROBE_VALUES: usize = 5;
const LONG_TEXT_CHARS: usize = 20;
const MAX_CATEGORIES: usize = 20;
const DISTRIBUTION_BUCKETS: usize = 8;
/// Percentage of present values that must parse as numbers
const NUMERIC_PERCENT: usize = 80;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub total_records: usize,
  pub unique_values: usize,
  pub missing_values: usize,
  /// Field name to count of numeric-parseable values, for mostly numeric fields
  pub data_types: BTreeMap<String, usize>,
}

/// Parallel label/value sequences for a chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
  pub labels: Vec<String>,
  pub values: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
  pub summary: Summary,
  pub trends: Series,
  pub distribution: Series,
  /// Always empty
  pub correlations: Vec<Value>,
}

struct FieldStats<'a> {
  name: &'a str,
  values: Vec<&'a Value>,
  unique_count: usize,
}

fn is_missing(value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(_) => false,
  }
}

/// Strings render bare, everything else as JSON
fn render(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn is_numeric(value: &Value) -> bool {
  match value {
    Value::Number(_) => true,
    Value::String(s) => s.trim().parse::<f64>().is_ok(),
    _ => false,
  }
}

fn field_names(docs: &[Document]) -> Vec<&str> {
  let mut seen = HashSet::new();
  let mut names = Vec::new();
  for key in docs.iter().flat_map(|doc| doc.keys()) {
    if !IGNORED_FIELDS.contains(&key.as_str()) && seen.insert(key.as_str()) {
      names.push(key.as_str());
    }
  }
  names
}

/// Per-field present values plus the total number of missing cells
fn collect_fields(docs: &[Document]) -> (Vec<FieldStats<'_>>, usize) {
  let mut fields = Vec::new();
  let mut total_missing = 0;

  for name in field_names(docs) {
    let mut values = Vec::new();
    for doc in docs {
      let value = doc.get(name);
      match value {
        Some(v) if !is_missing(value) => values.push(v),
        _ => total_missing += 1,
      }
    }

    if !values.is_empty() {
      let unique_count = values.iter().map(|v| v.to_string()).collect::<HashSet<_>>().len();
      fields.push(FieldStats { name, values, unique_count });
    }
  }

  (fields, total_missing)
}

fn looks_like_text(field: &FieldStats<'_>) -> bool {
  field
    .values
    .iter()
    .take(TEXT_PROBE_VALUES)
    .any(|v| matches!(v, Value::String(s) if s.chars().count() > LONG_TEXT_CHARS))
}

fn pick_text_field<'f, 'a>(fields: &'f [FieldStats<'a>]) -> Option<&'f FieldStats<'a>> {
  fields.iter().find(|f| f.name == "text").or_else(|| fields.iter().find(|f| looks_like_text(f)))
}

fn trend_series(fields: &[FieldStats<'_>]) -> Series {
  match pick_text_field(fields) {
    Some(field) if field.values.len() >= TREND_POINTS => {
      let values: Vec<usize> =
        field.values.iter().take(TREND_POINTS).map(|v| render(v).split_whitespace().count()).collect();
      Series { labels: (1..=values.len()).map(|i| format!("Record {i}")).collect(), values }
    }
    _ => Series::default(),
  }
}

fn is_categorical(field: &FieldStats<'_>) -> bool {
  let total = field.values.len() as f64;
  field.unique_count > 1 && field.unique_count <= MAX_CATEGORIES && (field.unique_count as f64) < total * 0.5
}

/// Most common values, ties kept in order of first appearance
fn tally(values: &[&Value], keep: usize) -> Series {
  let mut order: Vec<String> = Vec::new();
  let mut counts: HashMap<String, usize> = HashMap::new();
  for value in values {
    let label = render(value);
    let count = counts.entry(label.clone()).or_insert(0);
    if *count == 0 {
      order.push(label);
    }
    *count += 1;
  }

  let mut ranked: Vec<(String, usize)> = order
    .into_iter()
    .map(|label| {
      let count = counts[&label];
      (label, count)
    })
    .collect();
  ranked.sort_by(|a, b| b.1.cmp(&a.1));
  ranked.truncate(keep);

  let (labels, values) = ranked.into_iter().unzip();
  Series { labels, values }
}

/// Three arbitrary buckets splitting the document count
fn placeholder_distribution(doc_count: usize) -> Series {
  let third = doc_count / 3;
  Series {
    labels: vec!["Text Records".to_string(), "Numeric Records".to_string(), "Mixed Records".to_string()],
    values: vec![third, third, doc_count - 2 * third],
  }
}

fn distribution_series(fields: &[FieldStats<'_>], doc_count: usize) -> Series {
  match fields.iter().find(|f| is_categorical(f)) {
    Some(field) => tally(&field.values, DISTRIBUTION_BUCKETS),
    None => placeholder_distribution(doc_count),
  }
}

fn numeric_fields(fields: &[FieldStats<'_>]) -> BTreeMap<String, usize> {
  fields
    .iter()
    .filter_map(|field| {
      let numeric = field.values.iter().filter(|v| is_numeric(v)).count();
      (numeric * 100 >= field.values.len() * NUMERIC_PERCENT).then(|| (field.name.to_string(), numeric))
    })
    .collect()
}

/// Summarize a document sample. `total_records` is the sample size; callers
/// that know the full collection size overwrite it.
pub fn analyze(docs: &[Document]) -> AnalysisResult {
  if docs.is_empty() {
    return AnalysisResult::default();
  }

  let (fields, missing_values) = collect_fields(docs);

  AnalysisResult {
    summary: Summary {
      total_records: docs.len(),
      unique_values: fields.iter().map(|f| f.unique_count).sum(),
      missing_values,
      data_types: numeric_fields(&fields),
    },
    trends: trend_series(&fields),
    distribution: distribution_series(&fields, docs.len()),
    correlations: Vec::new(),
  }
}
