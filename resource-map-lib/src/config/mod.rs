use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;

use crate::error::ResourceMapError;
use crate::types::LatLng;

pub const DEFAULT_CANDIDATE_FILES: [&str; 2] = ["welfare_resources_utf8.csv", "非正式資源編碼.csv"];
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
const DEFAULT_GOOGLE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AppConfig {
    /// CSV names tried in order; the first one that loads wins.
    pub candidate_files: Vec<String>,
    /// Directory the candidate files are read from when `base_url` is unset.
    pub data_dir: PathBuf,
    /// Fetch candidates over HTTP relative to this URL instead of from disk.
    pub base_url: Option<String>,
    /// Region hint passed to geocoding and address routing.
    pub region: String,
    pub initial_center: LatLng,
    pub initial_zoom: u8,
    pub selected_zoom: u8,
    pub geolocation_timeout_ms: u64,
    /// Viewports this wide or narrower get the route-panel toggle.
    pub mobile_breakpoint: u32,
    pub viewport_width: Option<u32>,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
        }
    }
}

impl GoogleConfig {
    /// Configured key, or the one from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            candidate_files: DEFAULT_CANDIDATE_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            data_dir: PathBuf::from("."),
            base_url: None,
            region: "tw".to_string(),
            initial_center: LatLng::new(25.0330, 121.5654),
            initial_zoom: 12,
            selected_zoom: 15,
            geolocation_timeout_ms: 15_000,
            mobile_breakpoint: 768,
            viewport_width: None,
            google: GoogleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load a JSON config file. `//` and `/* */` comments are allowed.
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self, ResourceMapError> {
        let path = path.into();
        tracing::info!("Loading config from {:?}", path);
        let file = std::fs::File::open(&path)?;
        let config = Self::from_reader(file)?;
        tracing::info!("Successfully loaded config: {}", path.display());
        Ok(config)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ResourceMapError> {
        let stripped = json_comments::StripComments::new(reader);
        Ok(serde_json::from_reader(stripped)?)
    }

    pub fn validate(&self) -> Result<(), ResourceMapError> {
        tracing::info!("Validating config...");

        if self.candidate_files.is_empty() {
            return Err(ResourceMapError::InvalidConfig(
                "candidateFiles must name at least one CSV file".into(),
            ));
        }
        if let Some(name) = self.candidate_files.iter().find(|n| n.trim().is_empty()) {
            return Err(ResourceMapError::InvalidConfig(format!(
                "candidateFiles contains an empty name: {:?}",
                name
            )));
        }
        if !self.initial_center.is_valid() {
            return Err(ResourceMapError::InvalidConfig(format!(
                "initialCenter is not a valid coordinate: {}",
                self.initial_center
            )));
        }
        for (label, zoom) in [
            ("initialZoom", self.initial_zoom),
            ("selectedZoom", self.selected_zoom),
        ] {
            if zoom > 22 {
                return Err(ResourceMapError::InvalidConfig(format!(
                    "{} must be between 0 and 22, got {}",
                    label, zoom
                )));
            }
        }
        if let Some(base_url) = &self.base_url {
            directory_url(base_url)?;
        }
        directory_url(&self.google.base_url)?;

        tracing::info!("Config validation successful");
        Ok(())
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport_width
            .map(|w| w <= self.mobile_breakpoint)
            .unwrap_or(false)
    }
}

/// Parse a base URL that relative names get joined onto. A missing trailing
/// `/` is added, otherwise `Url::join` would replace the last path segment.
pub fn directory_url(raw: &str) -> Result<url::Url, ResourceMapError> {
    let mut url = url::Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
