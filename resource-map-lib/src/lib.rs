//! Community Resource Map Library
//!
//! Loads community resource records (foundations, neighborhood-chief
//! offices, churches, locksmiths) from CSV, places them on a map surface,
//! filters them, and plans driving directions to a selected resource.

mod app;
mod config;
mod directions;
mod directory;
mod error;
mod ingest;
mod list_view;
pub mod messages;
mod parser;
mod presenter;
mod services;
mod types;

#[cfg(test)]
mod test_support;

pub use app::{App, AppState, Capabilities, Command, CommandOutcome, LoadReport};
pub use config::{AppConfig, GoogleConfig, API_KEY_ENV, DEFAULT_CANDIDATE_FILES};
pub use directions::{
    AbandonReason, DirectionsOrchestrator, DirectionsOutcome, DirectionsTarget, OriginChoice,
    RouteAttempt, RouteDisplay,
};
pub use directory::ResourceDirectory;
pub use error::{
    LoadStage, ProcessingMessage, ProcessingOutcome, ProcessingState, ResourceMapError,
};
pub use ingest::{
    sample_records, CsvIngestor, CsvSource, DataOrigin, FileSource, HttpSource, LoadedCsv,
    LoadedRecords,
};
pub use list_view::{ListItem, ListView};
pub use parser::{
    ColumnIndex, ColumnMapping, ColumnSource, ParsedRecords, RecordParser, RowValues,
};
pub use presenter::{
    render_panel_text, GeoJsonSurface, MapPresenter, MapSurface, MarkerEntry, MarkerId,
    MarkerSpec, MarkerStyle, PopupAction, PopupContent, PopupId, RendererId,
};
pub use services::{
    Destination, DeviceLocator, DirectionsService, FixedLocator, Geocoder, GoogleMapsClient,
    LocateError, Notifier, OriginPrompt, Route, RouteLeg, RouteRequest, RouteStep, ServiceStatus,
    TravelMode,
};
pub use types::{
    marker_color_for, Category, CategoryFilter, LatLng, ResourceRecord, DEFAULT_MARKER_COLOR,
    UNKNOWN_ADDRESS, UNKNOWN_NAME, UNKNOWN_PHONE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::init_logging;
    use tracing::info;

    #[test]
    fn test_fixture_csv_loading() {
        init_logging();

        info!("Testing fixture CSV parsing");
        let text = std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../test-data/welfare_resources_utf8.csv"
        ))
        .unwrap();
        let parsed = RecordParser::new().parse(&text);
        let mapping = parsed.mapping.unwrap();
        assert!(mapping.is_fully_detected());
        assert_eq!(parsed.records.len(), 6);

        let directory = ResourceDirectory::new(parsed.records);
        for category in Category::ALL {
            assert!(!directory
                .filter("", CategoryFilter::Only(category))
                .is_empty());
        }
        info!("Fixture skipped {} rows", parsed.state.get_warnings().len());
        assert_eq!(parsed.state.get_warnings().len(), 2);
    }
}
