//! Loads the province and district datasets from GeoJSON files.
//!
//! This is the only IO in the process: two FeatureCollection files are read
//! once at startup and materialized into `Region` records; everything
//! downstream works on the immutable snapshot. Features with missing names,
//! unusable geometry, or (for districts) an unknown province link are
//! skipped with a warning rather than failing the whole load.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use hashbrown::HashSet;
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{GeoShape, Region, RegionGeometry, RegionId, RegionKind};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
    geometry: Option<GeoShape>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    id: Option<RegionId>,
    name: Option<String>,
    province_id: Option<RegionId>,
}

/// Loads both datasets and returns provinces followed by districts.
///
/// Districts referencing a province that did not load are dropped here so
/// the snapshot's parent-link invariant holds by construction.
pub fn load_regions(provinces_path: &Path, districts_path: &Path) -> Result<Vec<Region>> {
    let mut regions = load_file(provinces_path, RegionKind::Province)?;
    let province_ids: HashSet<RegionId> = regions.iter().map(|r| r.id).collect();

    for district in load_file(districts_path, RegionKind::District)? {
        let known_parent = district
            .parent_id
            .map(|p| province_ids.contains(&p))
            .unwrap_or(false);
        if known_parent {
            regions.push(district);
        } else {
            warn!(
                "Skipping district {} ({}): unknown province link {:?}",
                district.id, district.name, district.parent_id
            );
        }
    }

    info!(
        "Loaded {} regions from {} and {}",
        regions.len(),
        provinces_path.display(),
        districts_path.display()
    );
    Ok(regions)
}

fn load_file(path: &Path, kind: RegionKind) -> Result<Vec<Region>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {} dataset {}", kind, path.display()))?;
    let collection: FeatureCollection = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {} dataset {}", kind, path.display()))?;

    let mut regions = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(id) = feature.properties.id else {
            warn!("Skipping {} feature without an id", kind);
            continue;
        };
        let Some(name) = feature.properties.name.filter(|n| !n.trim().is_empty()) else {
            warn!("Skipping {} {}: missing name", kind, id);
            continue;
        };
        let Some(geometry) = feature.geometry.and_then(geometry_from_shape) else {
            warn!("Skipping {} {} ({}): unusable geometry", kind, id, name);
            continue;
        };

        let parent_id = match kind {
            RegionKind::Province => None,
            RegionKind::District => feature.properties.province_id,
        };
        regions.push(Region::new(id, name, kind, parent_id, geometry));
    }
    Ok(regions)
}

/// Converts a wire shape into stored geometry, closing rings the source
/// left open and dropping rings with fewer than 3 distinct points. Returns
/// `None` when no outer ring survives.
fn geometry_from_shape(shape: GeoShape) -> Option<RegionGeometry> {
    match shape {
        GeoShape::Polygon { coordinates } => {
            polygon_from_rings(coordinates).map(RegionGeometry::Polygon)
        }
        GeoShape::MultiPolygon { coordinates } => {
            let polygons: Vec<Polygon<f64>> = coordinates
                .into_iter()
                .filter_map(polygon_from_rings)
                .collect();
            if polygons.len() == 1 {
                polygons.into_iter().next().map(RegionGeometry::Polygon)
            } else if polygons.is_empty() {
                None
            } else {
                Some(RegionGeometry::MultiPolygon(MultiPolygon::new(polygons)))
            }
        }
    }
}

fn polygon_from_rings(rings: Vec<Vec<[f64; 2]>>) -> Option<Polygon<f64>> {
    let mut rings = rings.into_iter();
    let exterior = ring_from_coords(rings.next()?)?;
    let interiors: Vec<LineString<f64>> = rings.filter_map(ring_from_coords).collect();
    // Polygon::new closes open rings on construction.
    Some(Polygon::new(exterior, interiors))
}

fn ring_from_coords(coords: Vec<[f64; 2]>) -> Option<LineString<f64>> {
    let points: Vec<Coord<f64>> = coords
        .into_iter()
        .map(|[x, y]| Coord { x, y })
        .collect();
    let closed = points.len() > 1 && points.first() == points.last();
    let distinct = if closed { points.len() - 1 } else { points.len() };
    if distinct < 3 {
        return None;
    }
    Some(LineString::new(points))
}
