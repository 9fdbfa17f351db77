//! Core data models for the region resolution engine.

pub mod geojson;
pub mod region;

pub use geojson::{BoundingBox, GeoPoint, GeoShape};
pub use region::{Region, RegionGeometry, RegionId, RegionKind, RegionSummary};
