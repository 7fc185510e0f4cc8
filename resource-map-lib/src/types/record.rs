use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Category;
use crate::error::ResourceMapError;

pub const UNKNOWN_NAME: &str = "未知名稱";
pub const UNKNOWN_ADDRESS: &str = "未知地址";
pub const UNKNOWN_PHONE: &str = "未知電話";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `"lat,lng"`.
impl FromStr for LatLng {
    type Err = ResourceMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ResourceMapError::Processing(format!(
                "Invalid coordinate '{}' [Expected: LAT,LNG]",
                s
            ))
        };
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let lng = lng.trim().parse::<f64>().map_err(|_| invalid())?;
        let position = LatLng::new(lat, lng);
        if !position.is_valid() {
            return Err(invalid());
        }
        Ok(position)
    }
}

/// One community resource row. Only `position` changes after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: usize,
    pub name: String,
    pub category: Category,
    pub address: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<LatLng>,
}

impl ResourceRecord {
    pub fn new(
        id: usize,
        name: impl Into<String>,
        category: Category,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            address: address.into(),
            phone: phone.into(),
            position: None,
        }
    }

    /// Case-insensitive search over name, address, phone and the category's
    /// display name. `needle` must already be lower-cased.
    pub(crate) fn matches_text(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.address.to_lowercase().contains(needle)
            || self.phone.to_lowercase().contains(needle)
            || self.category.display_name().to_lowercase().contains(needle)
    }
}
