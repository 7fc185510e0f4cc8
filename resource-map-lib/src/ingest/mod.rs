use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::PathBuf;

use crate::config::{directory_url, AppConfig};
use crate::error::{LoadStage, ProcessingState, ResourceMapError};
use crate::parser::RecordParser;
use crate::types::{Category, ResourceRecord};

/// Somewhere CSV text can be fetched from by name.
#[async_trait]
pub trait CsvSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<String, ResourceMapError>;
}

#[async_trait]
impl CsvSource for Box<dyn CsvSource> {
    async fn fetch(&self, name: &str) -> Result<String, ResourceMapError> {
        self.as_ref().fetch(name).await
    }
}

/// Reads candidate files from a local directory.
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl CsvSource for FileSource {
    async fn fetch(&self, name: &str) -> Result<String, ResourceMapError> {
        let path = self.base_dir.join(name);
        tracing::debug!("Reading CSV from {:?}", path);
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Fetches candidate files relative to a base URL, which is treated as a
/// directory. Only `200 OK` counts as a successful fetch.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: url::Url,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, ResourceMapError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: directory_url(base_url)?,
        })
    }
}

#[async_trait]
impl CsvSource for HttpSource {
    async fn fetch(&self, name: &str) -> Result<String, ResourceMapError> {
        let url = self.base_url.join(name)?;
        tracing::debug!("Requesting CSV from {}", url);
        let response = self.client.get(url.clone()).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.text().await?),
            status => Err(ResourceMapError::Processing(format!(
                "HTTP {} for {}",
                status, url
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Csv(String),
    Sample,
}

/// Parsed records plus where they came from and any rows that were skipped.
#[derive(Debug)]
pub struct LoadedRecords {
    pub origin: DataOrigin,
    pub records: Vec<ResourceRecord>,
    pub state: ProcessingState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCsv {
    pub name: String,
    pub text: String,
}

/// Tries candidate names one after another against a [`CsvSource`].
pub struct CsvIngestor<S: CsvSource> {
    source: S,
    candidates: Vec<String>,
}

impl CsvIngestor<Box<dyn CsvSource>> {
    /// HTTP when `baseUrl` is configured, otherwise files under `dataDir`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ResourceMapError> {
        let source: Box<dyn CsvSource> = match &config.base_url {
            Some(base_url) => {
                tracing::info!("Loading CSV candidates from {}", base_url);
                Box::new(HttpSource::new(base_url)?)
            }
            None => {
                tracing::info!("Loading CSV candidates from {}", config.data_dir.display());
                Box::new(FileSource::new(&config.data_dir))
            }
        };
        Ok(Self::new(source, config.candidate_files.clone()))
    }
}

impl<S: CsvSource> CsvIngestor<S> {
    pub fn new(source: S, candidates: Vec<String>) -> Self {
        Self { source, candidates }
    }

    /// Parse the first candidate that loads. Falls back to
    /// [`sample_records`] when none does.
    pub async fn load_records(&self) -> LoadedRecords {
        match self.load().await {
            Some(csv) => {
                let parsed = RecordParser::new().parse(&csv.text);
                LoadedRecords {
                    origin: DataOrigin::Csv(csv.name),
                    records: parsed.records,
                    state: parsed.state,
                }
            }
            None => {
                tracing::info!("Using built-in sample data");
                let mut state = ProcessingState::new();
                state.add_warning(
                    LoadStage::Ingest,
                    "No CSV candidate could be loaded; using sample data",
                );
                LoadedRecords {
                    origin: DataOrigin::Sample,
                    records: sample_records(),
                    state,
                }
            }
        }
    }

    /// The first candidate that loads, or `None` when every attempt failed.
    /// Attempts are sequential and each name is tried exactly once.
    pub async fn load(&self) -> Option<LoadedCsv> {
        tracing::info!("Trying {} CSV candidates", self.candidates.len());
        for name in &self.candidates {
            tracing::debug!("Trying to load {}", name);
            match self.source.fetch(name).await {
                Ok(text) => {
                    tracing::info!("Loaded CSV data from {}", name);
                    return Some(LoadedCsv {
                        name: name.clone(),
                        text,
                    });
                }
                Err(e) => tracing::warn!("Could not load {}: {}", name, e),
            }
        }
        tracing::warn!("All CSV candidates failed");
        None
    }
}

/// Built-in records used when no CSV can be loaded.
pub fn sample_records() -> Vec<ResourceRecord> {
    vec![
        ResourceRecord::new(
            1,
            "某基金會",
            Category::Foundation,
            "桃園市中正區羅斯福路一段7號",
            "02-2321-1234",
        ),
        ResourceRecord::new(
            2,
            "某里長辦公室",
            Category::Chief,
            "桃園市中山區南京東路142號",
            "02-2505-6789",
        ),
        ResourceRecord::new(
            3,
            "某教會",
            Category::Church,
            "桃園市大安區和平東路二段86號",
            "02-2736-5432",
        ),
        ResourceRecord::new(
            4,
            "某鎖匠店",
            Category::Locksmith,
            "桃園市大同區承德路三段153號",
            "02-2592-7654",
        ),
    ]
}
