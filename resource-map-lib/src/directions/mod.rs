use std::sync::Arc;
use std::time::Duration;

use crate::messages;
use crate::presenter::{MapSurface, RendererId};
use crate::services::{
    Destination, DeviceLocator, DirectionsService, Geocoder, Notifier, OriginPrompt, Route,
    RouteRequest, ServiceStatus, TravelMode,
};
use crate::types::{LatLng, ResourceRecord};

/// Which popup button started the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginChoice {
    CurrentLocation,
    CustomLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OriginStrategy {
    Device,
    Prompt,
}

impl OriginChoice {
    fn strategies(&self) -> &'static [OriginStrategy] {
        match self {
            OriginChoice::CurrentLocation => &[OriginStrategy::Device, OriginStrategy::Prompt],
            OriginChoice::CustomLocation => &[OriginStrategy::Prompt],
        }
    }
}

enum OriginAttempt {
    Found(LatLng),
    FallThrough,
    Abandon(AbandonReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbandonReason {
    NoOriginProvided,
    OriginNotRecognised {
        origin: String,
        status: ServiceStatus,
    },
}

/// How the destination was expressed in a route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAttempt {
    ByCoordinates,
    ByAddress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsTarget {
    pub address: String,
    pub position: Option<LatLng>,
}

impl From<&ResourceRecord> for DirectionsTarget {
    fn from(record: &ResourceRecord) -> Self {
        Self {
            address: record.address.clone(),
            position: record.position,
        }
    }
}

impl DirectionsTarget {
    /// Coordinates first when known, then the address text.
    fn attempts(&self) -> Vec<(RouteAttempt, Destination)> {
        let mut attempts = Vec::with_capacity(2);
        if let Some(position) = self.position {
            attempts.push((RouteAttempt::ByCoordinates, Destination::Coordinates(position)));
        }
        attempts.push((RouteAttempt::ByAddress, Destination::Address(self.address.clone())));
        attempts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsOutcome {
    Routed {
        origin: LatLng,
        attempt: RouteAttempt,
        route: Route,
    },
    Abandoned(AbandonReason),
    Failed(ServiceStatus),
}

/// Route renderer, directions panel and mobile toggle state. Owned by the
/// application state and only touched by the handler currently running.
#[derive(Debug, Default)]
pub struct RouteDisplay {
    renderer: Option<RendererId>,
    panel_visible: bool,
    toggle_visible: bool,
}

impl RouteDisplay {
    pub fn renderer(&self) -> Option<RendererId> {
        self.renderer
    }

    pub fn is_panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn is_toggle_visible(&self) -> bool {
        self.toggle_visible
    }

    fn toggle_label(&self) -> &'static str {
        if self.panel_visible {
            messages::HIDE_ROUTE
        } else {
            messages::SHOW_ROUTE
        }
    }

    fn show_toggle<M: MapSurface>(&mut self, surface: &mut M) {
        self.toggle_visible = true;
        surface.set_route_toggle(true, self.toggle_label());
    }

    /// Show the panel and swap in a fresh renderer, detaching the old one.
    fn prepare<M: MapSurface>(&mut self, surface: &mut M) -> RendererId {
        self.panel_visible = true;
        surface.set_directions_panel_visible(true);
        if self.toggle_visible {
            surface.set_route_toggle(true, self.toggle_label());
        }

        if let Some(previous) = self.renderer.take() {
            surface.detach_route_renderer(previous);
        }
        let renderer = surface.attach_route_renderer();
        self.renderer = Some(renderer);
        renderer
    }

    /// Flip panel visibility without discarding the route. Does nothing
    /// until the toggle has been shown. Returns the new visibility.
    pub fn toggle_panel<M: MapSurface>(&mut self, surface: &mut M) -> bool {
        if !self.toggle_visible {
            return self.panel_visible;
        }
        self.panel_visible = !self.panel_visible;
        surface.set_directions_panel_visible(self.panel_visible);
        surface.set_route_toggle(true, self.toggle_label());
        self.panel_visible
    }
}

pub struct DirectionsOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn DirectionsService>,
    locator: Option<Arc<dyn DeviceLocator>>,
    prompt: Box<dyn OriginPrompt>,
    notifier: Arc<dyn Notifier>,
    region: String,
    locate_timeout: Duration,
    is_mobile: bool,
}

impl DirectionsOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        directions: Arc<dyn DirectionsService>,
        locator: Option<Arc<dyn DeviceLocator>>,
        prompt: Box<dyn OriginPrompt>,
        notifier: Arc<dyn Notifier>,
        region: impl Into<String>,
        locate_timeout: Duration,
        is_mobile: bool,
    ) -> Self {
        Self {
            geocoder,
            directions,
            locator,
            prompt,
            notifier,
            region: region.into(),
            locate_timeout,
            is_mobile,
        }
    }

    pub async fn request<M: MapSurface>(
        &self,
        choice: OriginChoice,
        target: &DirectionsTarget,
        surface: &mut M,
        display: &mut RouteDisplay,
    ) -> DirectionsOutcome {
        tracing::info!("Planning route to {} ({:?})", target.address, choice);

        let origin = match self.acquire_origin(choice).await {
            Ok(origin) => origin,
            Err(reason) => {
                tracing::info!("Directions request abandoned: {:?}", reason);
                return DirectionsOutcome::Abandoned(reason);
            }
        };

        if self.is_mobile {
            display.show_toggle(surface);
        }

        self.calculate_route(origin, target, surface, display).await
    }

    async fn acquire_origin(&self, choice: OriginChoice) -> Result<LatLng, AbandonReason> {
        for strategy in choice.strategies() {
            let attempt = match strategy {
                OriginStrategy::Device => self.locate_device().await,
                OriginStrategy::Prompt => self.prompt_for_origin().await,
            };
            match attempt {
                OriginAttempt::Found(origin) => return Ok(origin),
                OriginAttempt::FallThrough => continue,
                OriginAttempt::Abandon(reason) => return Err(reason),
            }
        }
        Err(AbandonReason::NoOriginProvided)
    }

    async fn locate_device(&self) -> OriginAttempt {
        let Some(locator) = &self.locator else {
            tracing::debug!("No device location capability");
            self.notifier.alert(messages::GEOLOCATION_UNSUPPORTED);
            return OriginAttempt::FallThrough;
        };

        match tokio::time::timeout(self.locate_timeout, locator.current_position()).await {
            Ok(Ok(origin)) => {
                tracing::debug!("Device position: {}", origin);
                OriginAttempt::Found(origin)
            }
            Ok(Err(e)) => {
                tracing::warn!("Device location failed: {}", e);
                self.notifier.alert(messages::GEOLOCATION_FAILED);
                OriginAttempt::FallThrough
            }
            Err(_) => {
                tracing::warn!("Device location timed out after {:?}", self.locate_timeout);
                self.notifier.alert(messages::GEOLOCATION_FAILED);
                OriginAttempt::FallThrough
            }
        }
    }

    async fn prompt_for_origin(&self) -> OriginAttempt {
        let text = self
            .prompt
            .prompt(messages::ORIGIN_PROMPT)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let Some(text) = text else {
            self.notifier.alert(messages::ORIGIN_MISSING);
            return OriginAttempt::Abandon(AbandonReason::NoOriginProvided);
        };

        tracing::debug!("Custom origin: {}", text);
        match self.geocoder.geocode(&text, &self.region).await {
            Ok(origin) => OriginAttempt::Found(origin),
            Err(status) => {
                tracing::warn!("Could not geocode origin {:?}: {}", text, status);
                self.notifier.alert(&messages::origin_unrecognised(&text));
                OriginAttempt::Abandon(AbandonReason::OriginNotRecognised {
                    origin: text,
                    status,
                })
            }
        }
    }

    async fn calculate_route<M: MapSurface>(
        &self,
        origin: LatLng,
        target: &DirectionsTarget,
        surface: &mut M,
        display: &mut RouteDisplay,
    ) -> DirectionsOutcome {
        let renderer = display.prepare(surface);

        let mut last_status = ServiceStatus::UnknownError;
        for (attempt, destination) in target.attempts() {
            let region = match attempt {
                RouteAttempt::ByCoordinates => None,
                RouteAttempt::ByAddress => Some(self.region.clone()),
            };
            let request = RouteRequest {
                origin,
                destination,
                travel_mode: TravelMode::Driving,
                region,
            };

            match self.directions.route(&request).await {
                Ok(route) => {
                    tracing::info!("Route found ({:?})", attempt);
                    surface.render_route(renderer, &route);
                    return DirectionsOutcome::Routed {
                        origin,
                        attempt,
                        route,
                    };
                }
                Err(status) => {
                    tracing::warn!("Route request {:?} failed: {}", attempt, status);
                    last_status = status;
                }
            }
        }

        self.notifier.alert(&messages::routing_failed(&last_status));
        DirectionsOutcome::Failed(last_status)
    }
}
