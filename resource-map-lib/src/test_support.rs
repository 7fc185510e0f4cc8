//! In-memory stand-ins for the external capabilities, shared by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use crate::services::{
    DeviceLocator, DirectionsService, Geocoder, LocateError, Notifier, OriginPrompt, Route,
    RouteLeg, RouteRequest, RouteStep, ServiceStatus,
};
use crate::types::LatLng;

static INIT: Once = Once::new();

/// Initialize logging exactly once for all tests
pub fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    });
}

/// Resolves known addresses, optionally after a delay; anything else is
/// `ZERO_RESULTS`.
#[derive(Default)]
pub struct ScriptedGeocoder {
    positions: HashMap<String, LatLng>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedGeocoder {
    pub fn with(positions: &[(&str, LatLng)]) -> Self {
        Self {
            positions: positions
                .iter()
                .map(|(address, position)| (address.to_string(), *position))
                .collect(),
            ..Self::default()
        }
    }

    pub fn delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, address: &str, _region: &str) -> Result<LatLng, ServiceStatus> {
        self.requests.lock().unwrap().push(address.to_string());
        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }
        self.positions
            .get(address)
            .copied()
            .ok_or(ServiceStatus::ZeroResults)
    }
}

/// Answers route requests from a queue; an empty queue answers
/// `UNKNOWN_ERROR`.
#[derive(Default)]
pub struct ScriptedDirections {
    responses: Mutex<VecDeque<Result<Route, ServiceStatus>>>,
    requests: Mutex<Vec<RouteRequest>>,
}

impl ScriptedDirections {
    pub fn new(responses: Vec<Result<Route, ServiceStatus>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(statuses: Vec<ServiceStatus>) -> Self {
        Self::new(statuses.into_iter().map(Err).collect())
    }

    pub fn sample_route() -> Route {
        Route {
            summary: "中山路".into(),
            legs: vec![RouteLeg {
                start_address: "起點".into(),
                end_address: "終點".into(),
                distance_text: "3.2 公里".into(),
                duration_text: "9 分".into(),
                steps: vec![RouteStep {
                    instruction: "往<b>南</b>".into(),
                    distance_text: "3.2 公里".into(),
                }],
            }],
        }
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectionsService for ScriptedDirections {
    async fn route(&self, request: &RouteRequest) -> Result<Route, ServiceStatus> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ServiceStatus::UnknownError))
    }
}

pub struct ScriptedLocator {
    result: Option<Result<LatLng, LocateError>>,
}

impl ScriptedLocator {
    pub fn at(position: LatLng) -> Self {
        Self {
            result: Some(Ok(position)),
        }
    }

    pub fn failing(error: LocateError) -> Self {
        Self {
            result: Some(Err(error)),
        }
    }

    /// Never answers.
    pub fn stalled() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl DeviceLocator for ScriptedLocator {
    async fn current_position(&self) -> Result<LatLng, LocateError> {
        match &self.result {
            Some(result) => result.clone(),
            None => std::future::pending().await,
        }
    }
}

/// Hands out queued answers; `None` once the queue is empty.
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<Option<String>>>>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Option<String>>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into())),
        }
    }
}

impl OriginPrompt for ScriptedPrompt {
    fn prompt(&self, _message: &str) -> Option<String> {
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
