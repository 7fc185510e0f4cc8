mod geojson;
mod panel;

pub use geojson::GeoJsonSurface;
pub use panel::render_panel_text;

use serde::Serialize;
use std::collections::HashSet;

use crate::messages::{DEPART_FROM_CURRENT, DEPART_FROM_CUSTOM};
use crate::services::Route;
use crate::types::{marker_color_for, Category, LatLng, ResourceRecord};

pub type MarkerId = usize;
pub type PopupId = usize;
pub type RendererId = usize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: u32,
    pub scale: u32,
}

impl MarkerStyle {
    pub fn for_category(category: Category) -> Self {
        Self::with_color(marker_color_for(category.identifier()))
    }

    fn with_color(color: &str) -> Self {
        Self {
            fill_color: color.to_string(),
            fill_opacity: 0.9,
            stroke_color: "#FFFFFF".to_string(),
            stroke_weight: 1,
            scale: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub record_id: usize,
    pub position: LatLng,
    pub title: String,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PopupAction {
    DepartFromCurrentLocation,
    DepartFromCustomLocation,
}

impl PopupAction {
    pub fn label(&self) -> &'static str {
        match self {
            PopupAction::DepartFromCurrentLocation => DEPART_FROM_CURRENT,
            PopupAction::DepartFromCustomLocation => DEPART_FROM_CUSTOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    pub record_id: usize,
    pub title: String,
    pub category_label: String,
    pub address: String,
    pub phone: String,
    pub actions: Vec<PopupAction>,
}

impl PopupContent {
    pub fn for_record(record: &ResourceRecord) -> Self {
        Self {
            record_id: record.id,
            title: record.name.clone(),
            category_label: record.category.display_name().to_string(),
            address: record.address.clone(),
            phone: record.phone.clone(),
            actions: vec![
                PopupAction::DepartFromCurrentLocation,
                PopupAction::DepartFromCustomLocation,
            ],
        }
    }
}

/// The drawing surface the presenter and the directions flow render onto.
pub trait MapSurface {
    fn place_marker(&mut self, spec: MarkerSpec) -> MarkerId;
    fn create_popup(&mut self, content: PopupContent) -> PopupId;
    fn set_marker_visible(&mut self, marker: MarkerId, visible: bool);
    /// Take a marker and its popup off the map for good.
    fn remove_marker(&mut self, marker: MarkerId, popup: PopupId);
    fn open_popup(&mut self, popup: PopupId, anchor: MarkerId);
    fn close_popup(&mut self, popup: PopupId);
    fn pan_to(&mut self, position: LatLng);
    fn set_zoom(&mut self, zoom: u8);
    fn attach_route_renderer(&mut self) -> RendererId;
    fn detach_route_renderer(&mut self, renderer: RendererId);
    fn render_route(&mut self, renderer: RendererId, route: &Route);
    fn set_directions_panel_visible(&mut self, visible: bool);
    fn set_route_toggle(&mut self, visible: bool, label: &str);
}

/// One marker per geocoded record, with its popup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub marker: MarkerId,
    pub popup: PopupId,
    pub record_id: usize,
    pub position: LatLng,
}

/// Marker bookkeeping: which record owns which marker and which popup is
/// open. Filtering only hides markers; they are removed when the records
/// they belong to are replaced.
#[derive(Debug, Default)]
pub struct MapPresenter {
    markers: Vec<MarkerEntry>,
    active_popup: Option<PopupId>,
}

impl MapPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[MarkerEntry] {
        &self.markers
    }

    pub fn active_popup(&self) -> Option<PopupId> {
        self.active_popup
    }

    pub fn marker_for(&self, record_id: usize) -> Option<&MarkerEntry> {
        self.markers.iter().find(|m| m.record_id == record_id)
    }

    /// Place the marker and popup for a record that has a position. Records
    /// without one, or that already have a marker, are ignored.
    pub fn add_marker<M: MapSurface>(
        &mut self,
        surface: &mut M,
        record: &ResourceRecord,
    ) -> Option<&MarkerEntry> {
        let position = record.position?;
        if self.marker_for(record.id).is_some() {
            tracing::debug!("Record {} already has a marker", record.id);
            return None;
        }

        let marker = surface.place_marker(MarkerSpec {
            record_id: record.id,
            position,
            title: record.name.clone(),
            style: MarkerStyle::for_category(record.category),
        });
        let popup = surface.create_popup(PopupContent::for_record(record));
        self.markers.push(MarkerEntry {
            marker,
            popup,
            record_id: record.id,
            position,
        });
        self.markers.last()
    }

    /// Remove every marker and popup from the surface, e.g. before a reload
    /// reuses the same record ids.
    pub fn clear<M: MapSurface>(&mut self, surface: &mut M) {
        if let Some(active) = self.active_popup.take() {
            surface.close_popup(active);
        }
        for entry in self.markers.drain(..) {
            surface.remove_marker(entry.marker, entry.popup);
        }
    }

    /// Show exactly the markers whose record id is in `visible`.
    pub fn apply_visibility<M: MapSurface>(&self, surface: &mut M, visible: &HashSet<usize>) {
        for entry in &self.markers {
            surface.set_marker_visible(entry.marker, visible.contains(&entry.record_id));
        }
    }

    /// Open the record's popup, closing whichever was open, and centre the
    /// map on it. Returns `false` when the record has no marker.
    pub fn open_marker<M: MapSurface>(
        &mut self,
        surface: &mut M,
        record_id: usize,
        zoom: Option<u8>,
    ) -> bool {
        let Some(entry) = self.marker_for(record_id).cloned() else {
            return false;
        };

        if let Some(active) = self.active_popup.take() {
            surface.close_popup(active);
        }
        surface.open_popup(entry.popup, entry.marker);
        self.active_popup = Some(entry.popup);

        surface.pan_to(entry.position);
        if let Some(zoom) = zoom {
            surface.set_zoom(zoom);
        }
        true
    }
}
