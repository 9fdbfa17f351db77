//! GeoJSON-compatible wire shapes for the public API.

use geo_types::{LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use super::region::RegionGeometry;

/// Geographic point (lat/lon).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Bounding box as `[min_lon, min_lat, max_lon, max_lat]`.
pub type BoundingBox = [f64; 4];

/// GeoJSON geometry: one polygon (outer ring plus optional holes) or a list
/// of such polygon groups. Rings are closed lists of `[lon, lat]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoShape {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl GeoShape {
    /// Total number of coordinate pairs across all rings.
    pub fn coordinate_count(&self) -> usize {
        match self {
            GeoShape::Polygon { coordinates } => coordinates.iter().map(Vec::len).sum(),
            GeoShape::MultiPolygon { coordinates } => coordinates
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::len))
                .sum(),
        }
    }
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.0.iter().map(|c| [c.x, c.y]).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .map(ring_coords)
        .collect()
}

impl From<&Polygon<f64>> for GeoShape {
    fn from(polygon: &Polygon<f64>) -> Self {
        GeoShape::Polygon {
            coordinates: polygon_rings(polygon),
        }
    }
}

impl From<&MultiPolygon<f64>> for GeoShape {
    fn from(mp: &MultiPolygon<f64>) -> Self {
        GeoShape::MultiPolygon {
            coordinates: mp.0.iter().map(polygon_rings).collect(),
        }
    }
}

impl From<&RegionGeometry> for GeoShape {
    fn from(geometry: &RegionGeometry) -> Self {
        match geometry {
            RegionGeometry::Polygon(p) => GeoShape::from(p),
            RegionGeometry::MultiPolygon(mp) => GeoShape::MultiPolygon {
                coordinates: mp.0.iter().map(polygon_rings).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, LineString, Polygon};

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::new(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 0.0, y: 1.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        )
    }

    #[test]
    fn polygon_serializes_as_geojson() {
        let shape = GeoShape::from(&RegionGeometry::Polygon(unit_square()));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "Polygon");
        assert_eq!(json["coordinates"][0][0][0], 0.0);
        assert_eq!(json["coordinates"][0].as_array().unwrap().len(), 5);
    }

    #[test]
    fn multipolygon_counts_all_rings() {
        let mp = geo_types::MultiPolygon::new(vec![unit_square(), unit_square()]);
        let shape = GeoShape::from(&RegionGeometry::MultiPolygon(mp));
        assert_eq!(shape.coordinate_count(), 10);
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "MultiPolygon");
    }
}
