//! Sample dataset loaders
//!
//! Three public CSV sources are supported, each reshaped into rows carrying a
//! single descriptive sentence. Callers may also upload their own CSV.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const OLYMPICS_URL: &str =
  "https://raw.githubusercontent.com/rfordatascience/tidytuesday/master/data/2021/2021-07-27/olympics.csv";
const GDELT_URL: &str = "https://raw.githubusercontent.com/mediagis/nlp-datasets/main/gdelt_sample.csv";
const UNSDG_URL: &str = "https://raw.githubusercontent.com/datasets/sdg/master/data/sdg.csv";

/// Cell contents treated as missing, as most CSV tooling does
const NA_TOKENS: [&str; 11] = ["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>"];

/// The built-in datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
  Olympics,
  Gdelt,
  Unsdg,
}

/// Rows ready for embedding, with the collection they belong in
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
  pub collection: String,
  pub texts: Vec<String>,
}

/// Where CSV text comes from
#[async_trait]
pub trait CsvSource: Send + Sync {
  async fn fetch(&self, url: &str) -> Result<String>;
}

/// Downloads CSV files over HTTP
pub struct HttpCsvSource {
  http: reqwest::Client,
}

impl HttpCsvSource {
  pub fn new() -> Self {
    Self { http: reqwest::Client::new() }
  }
}

impl Default for HttpCsvSource {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl CsvSource for HttpCsvSource {
  async fn fetch(&self, url: &str) -> Result<String> {
    let response = self.http.get(url).send().await.with_context(|| format!("Failed to download {url}"))?;
    let status = response.status();
    if !status.is_success() {
      return Err(anyhow!("Downloading {} returned {}", url, status));
    }
    response.text().await.with_context(|| format!("Failed to read {url}"))
  }
}

impl Dataset {
  pub const ALL: [Dataset; 3] = [Dataset::Olympics, Dataset::Gdelt, Dataset::Unsdg];

  /// Identifier used in routes and as the collection name
  pub fn id(self) -> &'static str {
    match self {
      Dataset::Olympics => "olympics",
      Dataset::Gdelt => "gdelt",
      Dataset::Unsdg => "unsdg",
    }
  }

  pub fn source_url(self) -> &'static str {
    match self {
      Dataset::Olympics => OLYMPICS_URL,
      Dataset::Gdelt => GDELT_URL,
      Dataset::Unsdg => UNSDG_URL,
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Dataset::Olympics => "Summer Olympics medal counts per country",
      Dataset::Gdelt => "Sample of GDELT global event records",
      Dataset::Unsdg => "UN Sustainable Development Goal indicators by country",
    }
  }

  pub fn tags(self) -> &'static [&'static str] {
    match self {
      Dataset::Olympics => &["sports", "medals"],
      Dataset::Gdelt => &["events", "news"],
      Dataset::Unsdg => &["development", "indicators"],
    }
  }

  /// Fetch the source CSV and shape it into sentences
  pub async fn load(self, source: &dyn CsvSource) -> Result<LoadedDataset> {
    let csv_text = source.fetch(self.source_url()).await?;
    let texts = self.shape(&csv_text).with_context(|| format!("Failed to parse the {} dataset", self.id()))?;
    tracing::info!(dataset = self.id(), rows = texts.len(), "Loaded dataset");
    Ok(LoadedDataset { collection: self.id().to_string(), texts })
  }

  fn shape(self, csv_text: &str) -> Result<Vec<String>> {
    match self {
      Dataset::Olympics => olympics_texts(csv_text),
      Dataset::Gdelt => gdelt_texts(csv_text),
      Dataset::Unsdg => unsdg_texts(csv_text),
    }
  }
}

impl fmt::Display for Dataset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

impl FromStr for Dataset {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    Dataset::ALL.into_iter().find(|d| d.id() == s).ok_or_else(|| anyhow!("Unknown dataset: {s}"))
  }
}

fn is_na(cell: &str) -> bool {
  NA_TOKENS.contains(&cell.trim())
}

/// Parsed CSV with named column lookup
struct Table {
  headers: Vec<String>,
  rows: Vec<csv::StringRecord>,
}

impl Table {
  fn parse(csv_text: &str) -> Result<Self> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok(Self { headers, rows })
  }

  fn column(&self, name: &str) -> Result<usize> {
    self.headers.iter().position(|h| h == name).ok_or_else(|| anyhow!("Missing column '{name}'"))
  }

  fn columns<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N]> {
    let mut indices = [0; N];
    for (slot, name) in indices.iter_mut().zip(names) {
      *slot = self.column(name)?;
    }
    Ok(indices)
  }

  /// Rows where every selected column has a value
  fn complete_rows<const N: usize>(&self, indices: [usize; N]) -> impl Iterator<Item = [&str; N]> + '_ {
    self.rows.iter().filter_map(move |row| {
      let mut cells = [""; N];
      for (cell, &index) in cells.iter_mut().zip(indices.iter()) {
        let value = row.get(index).map(str::trim).unwrap_or("");
        if is_na(value) {
          return None;
        }
        *cell = value;
      }
      Some(cells)
    })
  }
}

#[derive(Default)]
struct MedalCount {
  gold: usize,
  silver: usize,
  bronze: usize,
}

/// Summer medal tallies per NOC, ordered by NOC code
fn olympics_texts(csv_text: &str) -> Result<Vec<String>> {
  let table = Table::parse(csv_text)?;
  let [season, noc, medal] = table.columns(["season", "noc", "medal"])?;

  let mut tallies: BTreeMap<&str, MedalCount> = BTreeMap::new();
  for [season, noc, medal] in table.complete_rows([season, noc, medal]) {
    if season != "Summer" {
      continue;
    }
    let tally = tallies.entry(noc).or_default();
    match medal {
      "Gold" => tally.gold += 1,
      "Silver" => tally.silver += 1,
      "Bronze" => tally.bronze += 1,
      _ => {}
    }
  }

  Ok(
    tallies
      .into_iter()
      .map(|(country, m)| {
        format!("{country} won {} Gold, {} Silver, {} Bronze medals.", m.gold, m.silver, m.bronze)
      })
      .collect(),
  )
}

fn gdelt_texts(csv_text: &str) -> Result<Vec<String>> {
  let table = Table::parse(csv_text)?;
  let indices =
    table.columns(["SQLDATE", "Actor1Name", "Actor2Name", "EventCode", "EventBaseCode", "EventRootCode"])?;

  Ok(
    table
      .complete_rows(indices)
      .map(|[date, actor1, actor2, code, _, _]| {
        format!("On {date}, event {code} occurred between {actor1} and {actor2}.")
      })
      .collect(),
  )
}

fn unsdg_texts(csv_text: &str) -> Result<Vec<String>> {
  let table = Table::parse(csv_text)?;
  let indices = table.columns(["Goal", "Indicator", "Country", "Value"])?;

  Ok(
    table
      .complete_rows(indices)
      .map(|[goal, indicator, country, value]| format!("Goal {goal} - {indicator} in {country} has value {value}."))
      .collect(),
  )
}

/// Shape an uploaded CSV. The text comes from `text_column`, else from a
/// column named `text`, else from `header: value` pairs of the row's filled cells.
pub fn custom_texts(csv_text: &str, text_column: Option<&str>) -> Result<Vec<String>> {
  let table = Table::parse(csv_text)?;
  let text_index = match text_column {
    Some(name) => Some(table.column(name)?),
    None => table.column("text").ok(),
  };

  let texts = table
    .rows
    .iter()
    .map(|row| match text_index {
      Some(index) => row.get(index).unwrap_or("").trim().to_string(),
      None => table
        .headers
        .iter()
        .zip(row.iter())
        .filter(|(_, cell)| !is_na(cell))
        .map(|(header, cell)| format!("{header}: {}", cell.trim()))
        .collect::<Vec<_>>()
        .join(", "),
    })
    .filter(|text| !is_na(text))
    .collect();

  Ok(texts)
}
