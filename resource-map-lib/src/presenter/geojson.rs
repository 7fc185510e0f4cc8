use serde_json::{json, Value};
use std::path::Path;

use super::{MapSurface, MarkerId, MarkerSpec, PopupContent, PopupId, RendererId};
use crate::error::ResourceMapError;
use crate::services::Route;
use crate::types::LatLng;

#[derive(Debug, Clone)]
struct SurfaceMarker {
    spec: MarkerSpec,
    visible: bool,
}

#[derive(Debug, Clone, Default)]
struct RendererSlot {
    attached: bool,
    route: Option<Route>,
}

/// In-memory map surface. Keeps the full view state so it can be inspected
/// or exported as a GeoJSON `FeatureCollection` of the visible markers.
///
/// Marker and popup ids are slot indices; removed slots stay empty so ids
/// are never reused.
#[derive(Debug, Clone)]
pub struct GeoJsonSurface {
    markers: Vec<Option<SurfaceMarker>>,
    popups: Vec<Option<PopupContent>>,
    open_popup: Option<PopupId>,
    center: LatLng,
    zoom: u8,
    renderers: Vec<RendererSlot>,
    panel_visible: bool,
    route_toggle: Option<String>,
}

impl Default for GeoJsonSurface {
    fn default() -> Self {
        Self::new(LatLng::new(25.0330, 121.5654), 12)
    }
}

impl GeoJsonSurface {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            markers: Vec::new(),
            popups: Vec::new(),
            open_popup: None,
            center,
            zoom,
            renderers: Vec::new(),
            panel_visible: false,
            route_toggle: None,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.placed().count()
    }

    pub fn visible_record_ids(&self) -> Vec<usize> {
        self.placed()
            .filter(|m| m.visible)
            .map(|m| m.spec.record_id)
            .collect()
    }

    fn placed(&self) -> impl Iterator<Item = &SurfaceMarker> {
        self.markers.iter().flatten()
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn popup(&self, popup: PopupId) -> Option<&PopupContent> {
        self.popups.get(popup).and_then(Option::as_ref)
    }

    pub fn open_popup_record(&self) -> Option<usize> {
        self.open_popup
            .and_then(|p| self.popup(p))
            .map(|p| p.record_id)
    }

    pub fn attached_renderer_count(&self) -> usize {
        self.renderers.iter().filter(|r| r.attached).count()
    }

    /// Route shown by the attached renderer, if any.
    pub fn current_route(&self) -> Option<&Route> {
        self.renderers
            .iter()
            .rev()
            .find(|r| r.attached)
            .and_then(|r| r.route.as_ref())
    }

    pub fn is_panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// Label of the route-panel toggle while it is shown.
    pub fn route_toggle_label(&self) -> Option<&str> {
        self.route_toggle.as_deref()
    }

    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .placed()
            .filter(|m| m.visible)
            .map(|m| {
                let popup = self
                    .popups
                    .iter()
                    .flatten()
                    .find(|p| p.record_id == m.spec.record_id);
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.spec.position.lng, m.spec.position.lat],
                    },
                    "properties": {
                        "id": m.spec.record_id,
                        "title": m.spec.title,
                        "category": popup.map(|p| p.category_label.as_str()),
                        "address": popup.map(|p| p.address.as_str()),
                        "phone": popup.map(|p| p.phone.as_str()),
                        "marker-color": m.spec.style.fill_color,
                        "marker-symbol": "circle",
                    },
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    pub fn write_geojson<P: AsRef<Path>>(&self, path: P) -> Result<(), ResourceMapError> {
        let path = path.as_ref();
        tracing::info!("Writing map markers to {}", path.display());
        let body = serde_json::to_string_pretty(&self.to_geojson())?;
        std::fs::write(path, body)?;
        Ok(())
    }
}

impl MapSurface for GeoJsonSurface {
    fn place_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        self.markers.push(Some(SurfaceMarker {
            spec,
            visible: true,
        }));
        self.markers.len() - 1
    }

    fn create_popup(&mut self, content: PopupContent) -> PopupId {
        self.popups.push(Some(content));
        self.popups.len() - 1
    }

    fn set_marker_visible(&mut self, marker: MarkerId, visible: bool) {
        if let Some(Some(m)) = self.markers.get_mut(marker) {
            m.visible = visible;
        }
    }

    fn remove_marker(&mut self, marker: MarkerId, popup: PopupId) {
        if let Some(slot) = self.markers.get_mut(marker) {
            *slot = None;
        }
        if let Some(slot) = self.popups.get_mut(popup) {
            *slot = None;
        }
        if self.open_popup == Some(popup) {
            self.open_popup = None;
        }
    }

    fn open_popup(&mut self, popup: PopupId, _anchor: MarkerId) {
        self.open_popup = Some(popup);
    }

    fn close_popup(&mut self, popup: PopupId) {
        if self.open_popup == Some(popup) {
            self.open_popup = None;
        }
    }

    fn pan_to(&mut self, position: LatLng) {
        self.center = position;
    }

    fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }

    fn attach_route_renderer(&mut self) -> RendererId {
        self.renderers.push(RendererSlot {
            attached: true,
            route: None,
        });
        self.renderers.len() - 1
    }

    fn detach_route_renderer(&mut self, renderer: RendererId) {
        if let Some(slot) = self.renderers.get_mut(renderer) {
            slot.attached = false;
        }
    }

    fn render_route(&mut self, renderer: RendererId, route: &Route) {
        match self.renderers.get_mut(renderer) {
            Some(slot) if slot.attached => slot.route = Some(route.clone()),
            _ => tracing::debug!("Ignoring route for detached renderer {}", renderer),
        }
    }

    fn set_directions_panel_visible(&mut self, visible: bool) {
        self.panel_visible = visible;
    }

    fn set_route_toggle(&mut self, visible: bool, label: &str) {
        self.route_toggle = visible.then(|| label.to_string());
    }
}
