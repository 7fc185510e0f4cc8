mod category;
mod record;

pub use category::{marker_color_for, Category, CategoryFilter, DEFAULT_MARKER_COLOR};
pub use record::{LatLng, ResourceRecord, UNKNOWN_ADDRESS, UNKNOWN_NAME, UNKNOWN_PHONE};
