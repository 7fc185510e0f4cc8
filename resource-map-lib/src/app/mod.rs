use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::config::AppConfig;
use crate::directions::{
    DirectionsOrchestrator, DirectionsOutcome, DirectionsTarget, OriginChoice, RouteDisplay,
};
use crate::directory::ResourceDirectory;
use crate::error::{LoadStage, ProcessingOutcome, ProcessingState};
use crate::ingest::{CsvIngestor, CsvSource, DataOrigin, LoadedRecords};
use crate::list_view::ListView;
use crate::presenter::{MapPresenter, MapSurface};
use crate::services::{DeviceLocator, DirectionsService, Geocoder, Notifier, OriginPrompt};
use crate::types::{CategoryFilter, LatLng, ResourceRecord};

/// Everything the app needs from the outside world.
pub struct Capabilities {
    pub geocoder: Arc<dyn Geocoder>,
    pub directions: Arc<dyn DirectionsService>,
    pub locator: Option<Arc<dyn DeviceLocator>>,
    pub prompt: Box<dyn OriginPrompt>,
    pub notifier: Arc<dyn Notifier>,
}

/// User actions coming from whatever UI drives the app.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    SelectCategory(CategoryFilter),
    ClickMarker(usize),
    ClickListItem(usize),
    RequestDirections { record_id: usize, from: OriginChoice },
    ToggleRoutePanel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Number of records left after filtering.
    Filtered(usize),
    PopupOpened(bool),
    Directions(DirectionsOutcome),
    PanelToggled(bool),
    Ignored,
}

#[derive(Debug)]
pub struct LoadReport {
    pub origin: DataOrigin,
    pub accepted: usize,
    pub geocoded: usize,
    pub outcome: ProcessingOutcome,
}

/// Mutable application state. Each field is written only by the load or
/// command handler currently running.
pub struct AppState<M: MapSurface> {
    pub directory: ResourceDirectory,
    pub presenter: MapPresenter,
    pub list: ListView,
    pub surface: M,
    pub route: RouteDisplay,
    pub search_text: String,
    pub category: CategoryFilter,
}

pub struct App<M: MapSurface> {
    config: AppConfig,
    geocoder: Arc<dyn Geocoder>,
    directions: DirectionsOrchestrator,
    state: AppState<M>,
}

impl<M: MapSurface> App<M> {
    pub fn new(config: AppConfig, mut surface: M, capabilities: Capabilities) -> Self {
        surface.pan_to(config.initial_center);
        surface.set_zoom(config.initial_zoom);

        let directions = DirectionsOrchestrator::new(
            Arc::clone(&capabilities.geocoder),
            capabilities.directions,
            capabilities.locator,
            capabilities.prompt,
            capabilities.notifier,
            config.region.clone(),
            Duration::from_millis(config.geolocation_timeout_ms),
            config.is_mobile(),
        );

        Self {
            geocoder: capabilities.geocoder,
            directions,
            state: AppState {
                directory: ResourceDirectory::default(),
                presenter: MapPresenter::new(),
                list: ListView::new(),
                surface,
                route: RouteDisplay::default(),
                search_text: String::new(),
                category: CategoryFilter::All,
            },
            config,
        }
    }

    pub fn state(&self) -> &AppState<M> {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn into_surface(self) -> M {
        self.state.surface
    }

    /// Load the first available CSV (or the built-in sample), replace the
    /// directory, render the list and geocode every record.
    pub async fn load<S: CsvSource>(&mut self, ingestor: &CsvIngestor<S>) -> LoadReport {
        let LoadedRecords {
            origin,
            records,
            mut state,
        } = ingestor.load_records().await;

        let accepted = records.len();
        self.replace_records(records);
        let geocoded = self.geocode_all(&mut state).await;

        tracing::info!("Loaded {} resources, {} geocoded", accepted, geocoded);
        LoadReport {
            origin,
            accepted,
            geocoded,
            outcome: ProcessingOutcome::from_state(state),
        }
    }

    fn replace_records(&mut self, records: Vec<ResourceRecord>) {
        self.state.presenter.clear(&mut self.state.surface);
        self.state.directory = ResourceDirectory::new(records);
        self.refresh_view();
    }

    /// One geocode per record, all in flight at once. Completions are applied
    /// in whatever order they finish. Returns how many succeeded; failures
    /// are noted in `warnings`.
    async fn geocode_all(&mut self, warnings: &mut ProcessingState) -> usize {
        let mut tasks = JoinSet::new();
        for record in self.state.directory.records() {
            let geocoder = Arc::clone(&self.geocoder);
            let id = record.id;
            let address = record.address.clone();
            let region = self.config.region.clone();
            tracing::debug!("Geocoding record {}: {}", id, address);
            tasks.spawn(async move { (id, geocoder.geocode(&address, &region).await) });
        }

        let mut geocoded = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(position))) => {
                    geocoded += 1;
                    self.on_geocoded(id, position);
                }
                Ok((id, Err(status))) => {
                    tracing::warn!("Geocoding failed for record {}: {}", id, status);
                    warnings.add_row_warning(LoadStage::Geocode, id, status.to_string());
                }
                Err(e) => tracing::error!("Geocoding task failed: {}", e),
            }
        }
        geocoded
    }

    fn on_geocoded(&mut self, id: usize, position: LatLng) {
        let AppState {
            directory,
            presenter,
            list,
            surface,
            ..
        } = &mut self.state;

        let Some(record) = directory.attach_position(id, position) else {
            return;
        };
        tracing::debug!("Record {} located at {}", id, position);
        if let Some(entry) = presenter.add_marker(surface, record) {
            let visible = list.contains(entry.record_id);
            surface.set_marker_visible(entry.marker, visible);
        }
    }

    /// Re-run the current filter and push it to the list and the markers.
    fn refresh_view(&mut self) -> usize {
        let filtered = self
            .state
            .directory
            .filter(&self.state.search_text, self.state.category);
        let visible: HashSet<usize> = filtered.iter().map(|r| r.id).collect();
        let count = filtered.len();

        self.state.list.render(&filtered);
        self.state
            .presenter
            .apply_visibility(&mut self.state.surface, &visible);
        count
    }

    pub async fn handle(&mut self, command: Command) -> CommandOutcome {
        tracing::debug!("Handling {:?}", command);
        match command {
            Command::Search(text) => {
                self.state.search_text = text;
                CommandOutcome::Filtered(self.refresh_view())
            }
            Command::SelectCategory(category) => {
                self.state.category = category;
                CommandOutcome::Filtered(self.refresh_view())
            }
            Command::ClickMarker(record_id) => CommandOutcome::PopupOpened(
                self.state
                    .presenter
                    .open_marker(&mut self.state.surface, record_id, None),
            ),
            Command::ClickListItem(record_id) => CommandOutcome::PopupOpened(
                self.state.presenter.open_marker(
                    &mut self.state.surface,
                    record_id,
                    Some(self.config.selected_zoom),
                ),
            ),
            Command::RequestDirections { record_id, from } => {
                let Some(record) = self.state.directory.get(record_id) else {
                    tracing::warn!("No record with id {}", record_id);
                    return CommandOutcome::Ignored;
                };
                let target = DirectionsTarget::from(record);
                let outcome = self
                    .directions
                    .request(from, &target, &mut self.state.surface, &mut self.state.route)
                    .await;
                CommandOutcome::Directions(outcome)
            }
            Command::ToggleRoutePanel => {
                CommandOutcome::PanelToggled(self.state.route.toggle_panel(&mut self.state.surface))
            }
        }
    }
}
