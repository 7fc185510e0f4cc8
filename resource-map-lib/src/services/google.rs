use async_trait::async_trait;
use serde::Deserialize;

use super::{
    Destination, DirectionsService, Geocoder, Route, RouteLeg, RouteRequest, RouteStep,
    ServiceStatus,
};
use crate::config::{directory_url, GoogleConfig};
use crate::error::ResourceMapError;
use crate::types::LatLng;

/// Client for the Google Maps Geocoding and Directions web services.
pub struct GoogleMapsClient {
    client: reqwest::Client,
    base_url: url::Url,
    api_key: String,
}

impl GoogleMapsClient {
    pub fn new(config: &GoogleConfig) -> Result<Self, ResourceMapError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            ResourceMapError::InvalidConfig(format!(
                "No Google Maps API key configured; set google.apiKey or {}",
                crate::config::API_KEY_ENV
            ))
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: directory_url(&config.base_url)?,
            api_key,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ServiceStatus> {
        let url = self.base_url.join(endpoint).map_err(|e| {
            tracing::error!("Invalid endpoint {}: {}", endpoint, e);
            ServiceStatus::InvalidRequest
        })?;

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("key", self.api_key.clone()));

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Request to {} failed: {}", endpoint, e);
                ServiceStatus::UnknownError
            })?;

        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Unreadable response from {}: {}", endpoint, e);
            ServiceStatus::UnknownError
        })
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    async fn geocode(&self, address: &str, region: &str) -> Result<LatLng, ServiceStatus> {
        tracing::debug!("Geocoding {:?} (region {})", address, region);
        let response: GeocodeResponse = self
            .get_json(
                "geocode/json",
                &[("address", address.to_string()), ("region", region.to_string())],
            )
            .await?;
        response.into_position()
    }
}

#[async_trait]
impl DirectionsService for GoogleMapsClient {
    async fn route(&self, request: &RouteRequest) -> Result<Route, ServiceStatus> {
        let destination = match &request.destination {
            Destination::Coordinates(position) => position.to_string(),
            Destination::Address(address) => address.clone(),
        };
        let mut params = vec![
            ("origin", request.origin.to_string()),
            ("destination", destination),
            ("mode", request.travel_mode.as_str().to_string()),
        ];
        if let Some(region) = &request.region {
            params.push(("region", region.clone()));
        }

        tracing::debug!("Requesting directions: {:?}", request);
        let response: DirectionsResponse = self.get_json("directions/json", &params).await?;
        response.into_route()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

impl GeocodeResponse {
    fn into_position(self) -> Result<LatLng, ServiceStatus> {
        if self.status != "OK" {
            return Err(ServiceStatus::from_code(&self.status));
        }
        self.results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or(ServiceStatus::ZeroResults)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    #[serde(default)]
    start_address: String,
    #[serde(default)]
    end_address: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
    #[serde(default)]
    steps: Vec<ApiStep>,
}

#[derive(Debug, Deserialize)]
struct ApiStep {
    #[serde(default)]
    html_instructions: String,
    distance: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

fn text_of(value: Option<TextValue>) -> String {
    value.map(|v| v.text).unwrap_or_default()
}

impl DirectionsResponse {
    fn into_route(self) -> Result<Route, ServiceStatus> {
        if self.status != "OK" {
            return Err(ServiceStatus::from_code(&self.status));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or(ServiceStatus::ZeroResults)?;

        Ok(Route {
            summary: route.summary,
            legs: route
                .legs
                .into_iter()
                .map(|leg| RouteLeg {
                    start_address: leg.start_address,
                    end_address: leg.end_address,
                    distance_text: text_of(leg.distance),
                    duration_text: text_of(leg.duration),
                    steps: leg
                        .steps
                        .into_iter()
                        .map(|step| RouteStep {
                            instruction: step.html_instructions,
                            distance_text: text_of(step.distance),
                        })
                        .collect(),
                })
                .collect(),
        })
    }
}
