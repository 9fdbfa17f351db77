//! Merging matched region geometries into one spatial answer.

use geo::{Area, BooleanOps, BoundingRect, Centroid};
use geo_types::{Coord, LineString, MultiPolygon, Polygon, Rect};
use serde::Serialize;
use tracing::warn;

use super::adjacency;
use crate::error::AggregateError;
use crate::models::{BoundingBox, GeoPoint, GeoShape, Region, RegionSummary};

/// Geometry below this planar area counts as degenerate for weighting.
const DEGENERATE_AREA: f64 = 1e-12;

/// Merged spatial answer for a set of matched regions.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedGeometry {
    pub polygon: GeoShape,
    pub bounding_box: BoundingBox,
    pub center: GeoPoint,
    pub is_contiguous: bool,
}

/// Aggregation output plus the regions dropped by geometry validation.
pub struct Aggregation {
    pub geometry: AggregatedGeometry,
    pub rejected: Vec<RegionSummary>,
}

/// Merges the geometries of the matched regions.
///
/// Regions with a ring of fewer than 3 distinct points are excluded and
/// reported in [`Aggregation::rejected`]; the call fails only when nothing
/// usable remains. A single usable region passes its stored geometry through
/// verbatim and is contiguous by definition. Several regions are merged via
/// polygon union when their adjacency graph is connected, and concatenated
/// into a `MultiPolygon` in match order otherwise.
pub fn aggregate(regions: &[&Region]) -> Result<Aggregation, AggregateError> {
    let mut usable: Vec<&Region> = Vec::with_capacity(regions.len());
    let mut rejected = Vec::new();
    for region in regions.iter().copied() {
        match validate(region) {
            Ok(()) => usable.push(region),
            Err(err) => {
                warn!("Excluding region from aggregation: {err}");
                rejected.push(region.summary());
            }
        }
    }

    let Some(first) = usable.first() else {
        return Err(AggregateError::NoUsableGeometry);
    };

    let multis: Vec<MultiPolygon<f64>> = usable.iter().map(|r| r.geometry.to_multi()).collect();
    let bounding_box = bounding_box(&multis).ok_or(AggregateError::NoUsableGeometry)?;
    let center = weighted_centroid(&multis);

    let (polygon, is_contiguous) = if multis.len() == 1 {
        (GeoShape::from(&first.geometry), true)
    } else if connected(&multis) {
        // Merging is safe here: either the union collapses the shared
        // boundaries into one exterior ring, or we fall back to the
        // MultiPolygon form of the union result.
        (union_shape(&multis), true)
    } else {
        (concat_shape(&multis), false)
    };

    Ok(Aggregation {
        geometry: AggregatedGeometry {
            polygon,
            bounding_box,
            center,
            is_contiguous,
        },
        rejected,
    })
}

fn validate(region: &Region) -> Result<(), AggregateError> {
    for polygon in region.geometry.polygons() {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
            if distinct_points(ring) < 3 {
                return Err(AggregateError::InvalidGeometry {
                    id: region.id,
                    name: region.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn distinct_points(ring: &LineString<f64>) -> usize {
    let coords = &ring.0;
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.len() - 1
    } else {
        coords.len()
    }
}

/// Connectivity of the adjacency graph over the usable regions.
fn connected(multis: &[MultiPolygon<f64>]) -> bool {
    let mut visited = vec![false; multis.len()];
    let mut queue = vec![0usize];
    visited[0] = true;
    let mut reached = 1;

    while let Some(current) = queue.pop() {
        for next in 0..multis.len() {
            if !visited[next] && adjacency::adjacent(&multis[current], &multis[next]) {
                visited[next] = true;
                reached += 1;
                queue.push(next);
            }
        }
    }
    reached == multis.len()
}

/// Full union of a contiguous match set. A result of exactly one polygon is
/// proof that all shared boundaries cancelled, so it is returned as a plain
/// `Polygon`; anything else stays a `MultiPolygon`.
fn union_shape(multis: &[MultiPolygon<f64>]) -> GeoShape {
    let mut merged = multis[0].clone();
    for m in &multis[1..] {
        merged = merged.union(m);
    }
    if merged.0.len() == 1 {
        GeoShape::from(&merged.0[0])
    } else {
        GeoShape::from(&merged)
    }
}

/// Non-contiguous output: each region's polygon groups, in match order.
fn concat_shape(multis: &[MultiPolygon<f64>]) -> GeoShape {
    let polygons: Vec<Polygon<f64>> = multis.iter().flat_map(|m| m.0.iter().cloned()).collect();
    GeoShape::from(&MultiPolygon::new(polygons))
}

fn bounding_box(multis: &[MultiPolygon<f64>]) -> Option<BoundingBox> {
    let mut acc: Option<Rect<f64>> = None;
    for m in multis {
        if let Some(rect) = m.bounding_rect() {
            acc = Some(match acc {
                None => rect,
                Some(prev) => Rect::new(
                    Coord {
                        x: prev.min().x.min(rect.min().x),
                        y: prev.min().y.min(rect.min().y),
                    },
                    Coord {
                        x: prev.max().x.max(rect.max().x),
                        y: prev.max().y.max(rect.max().y),
                    },
                ),
            });
        }
    }
    acc.map(|rect| [rect.min().x, rect.min().y, rect.max().x, rect.max().y])
}

/// Area-weighted mean of per-region centroids, weighted by planar shoelace
/// area magnitude. Degenerate total area falls back to the arithmetic mean
/// of all vertices.
fn weighted_centroid(multis: &[MultiPolygon<f64>]) -> GeoPoint {
    let mut weight_sum = 0.0;
    let mut lon = 0.0;
    let mut lat = 0.0;
    for m in multis {
        let weight = m.unsigned_area();
        if weight > 0.0 {
            if let Some(c) = m.centroid() {
                lon += c.x() * weight;
                lat += c.y() * weight;
                weight_sum += weight;
            }
        }
    }
    if weight_sum > DEGENERATE_AREA {
        GeoPoint {
            lon: lon / weight_sum,
            lat: lat / weight_sum,
        }
    } else {
        vertex_mean(multis)
    }
}

fn vertex_mean(multis: &[MultiPolygon<f64>]) -> GeoPoint {
    let mut count = 0usize;
    let mut lon = 0.0;
    let mut lat = 0.0;
    for m in multis {
        for polygon in &m.0 {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
                let coords = &ring.0;
                let take = if coords.len() > 1 && coords.first() == coords.last() {
                    coords.len() - 1
                } else {
                    coords.len()
                };
                for c in &coords[..take] {
                    lon += c.x;
                    lat += c.y;
                    count += 1;
                }
            }
        }
    }
    if count == 0 {
        GeoPoint { lon: 0.0, lat: 0.0 }
    } else {
        GeoPoint {
            lon: lon / count as f64,
            lat: lat / count as f64,
        }
    }
}
