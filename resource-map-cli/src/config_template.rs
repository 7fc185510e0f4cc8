pub enum Template {
    Basic,
    Full,
}

impl Template {
    pub fn content(&self) -> &'static str {
        match self {
            Template::Basic => BASIC_CONFIG,
            Template::Full => FULL_CONFIG,
        }
    }
}

pub const DEFAULT_CONFIG_FILE: &str = "resource-map.jsonc";

pub const BASIC_CONFIG: &str = r#"{
  // CSV files tried in order; the first one that loads is used.
  // When none loads, four built-in sample records are shown instead.
  "candidateFiles": ["welfare_resources_utf8.csv", "非正式資源編碼.csv"],
  // Directory the candidate files are read from
  "dataDir": ".",

  "google": {
    // Leave empty to read GOOGLE_MAPS_API_KEY from the environment
    "apiKey": ""
  }
}"#;

pub const FULL_CONFIG: &str = r#"{
  // CSV files tried in order; the first one that loads is used.
  // When none loads, four built-in sample records are shown instead.
  "candidateFiles": ["welfare_resources_utf8.csv", "非正式資源編碼.csv"],
  // Directory the candidate files are read from
  "dataDir": ".",
  // Fetch the candidate files over HTTP instead (optional).
  // Names are resolved relative to this URL; only 200 OK counts.
  // "baseUrl": "https://example.com/data/",

  // Region hint for geocoding and address-based routing
  "region": "tw",

  // Map view
  "initialCenter": { "lat": 25.0330, "lng": 121.5654 },
  "initialZoom": 12,
  // Zoom applied when a list item is selected
  "selectedZoom": 15,

  // How long to wait for a device position before falling back to
  // the custom origin prompt
  "geolocationTimeoutMs": 15000,

  // Viewports at or below this width get the route-panel toggle
  "mobileBreakpoint": 768,
  // Width of the current viewport (optional)
  // "viewportWidth": 390,

  "google": {
    // Leave empty to read GOOGLE_MAPS_API_KEY from the environment
    "apiKey": "",
    // Base URL of the geocoding and directions web services
    "baseUrl": "https://maps.googleapis.com/maps/api/"
  }
}"#;
