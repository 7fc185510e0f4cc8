//! Interfaces to the external mapping capabilities: geocoding, routing,
//! device location, and the user prompts the directions flow needs.

mod google;

pub use google::GoogleMapsClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::LatLng;

/// Failure status reported by a geocoding or directions request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    ZeroResults,
    NotFound,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    Other(String),
}

impl ServiceStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "ZERO_RESULTS" => ServiceStatus::ZeroResults,
            "NOT_FOUND" => ServiceStatus::NotFound,
            "OVER_QUERY_LIMIT" => ServiceStatus::OverQueryLimit,
            "REQUEST_DENIED" => ServiceStatus::RequestDenied,
            "INVALID_REQUEST" => ServiceStatus::InvalidRequest,
            "UNKNOWN_ERROR" => ServiceStatus::UnknownError,
            other => ServiceStatus::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ServiceStatus::ZeroResults => "ZERO_RESULTS",
            ServiceStatus::NotFound => "NOT_FOUND",
            ServiceStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ServiceStatus::RequestDenied => "REQUEST_DENIED",
            ServiceStatus::InvalidRequest => "INVALID_REQUEST",
            ServiceStatus::UnknownError => "UNKNOWN_ERROR",
            ServiceStatus::Other(code) => code,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Coordinates(LatLng),
    Address(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    #[default]
    Driving,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: LatLng,
    pub destination: Destination,
    pub travel_mode: TravelMode,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// May contain HTML markup, as returned by the routing service.
    pub instruction: String,
    pub distance_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub start_address: String,
    pub end_address: String,
    pub distance_text: String,
    pub duration_text: String,
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub summary: String,
    pub legs: Vec<RouteLeg>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str, region: &str) -> Result<LatLng, ServiceStatus>;
}

#[async_trait]
pub trait DirectionsService: Send + Sync {
    async fn route(&self, request: &RouteRequest) -> Result<Route, ServiceStatus>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    PermissionDenied,
    Unavailable,
    Timeout,
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::PermissionDenied => f.write_str("permission denied"),
            LocateError::Unavailable => f.write_str("position unavailable"),
            LocateError::Timeout => f.write_str("timed out"),
        }
    }
}

/// Device geolocation. Callers bound the wait themselves.
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn current_position(&self) -> Result<LatLng, LocateError>;
}

/// A locator that always reports the same position.
pub struct FixedLocator(pub LatLng);

#[async_trait]
impl DeviceLocator for FixedLocator {
    async fn current_position(&self) -> Result<LatLng, LocateError> {
        Ok(self.0)
    }
}

/// Synchronous free-text question to the user. `None` means cancelled.
pub trait OriginPrompt {
    fn prompt(&self, message: &str) -> Option<String>;
}

/// User-visible alerts.
pub trait Notifier {
    fn alert(&self, message: &str);
}
