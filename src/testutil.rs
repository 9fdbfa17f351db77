//! Shared fixtures for unit tests: a small synthetic gazetteer of square
//! regions placed on a lon/lat grid.

use std::sync::Arc;

use geo_types::{Coord, LineString, Polygon};

use crate::models::{Region, RegionGeometry, RegionId, RegionKind};
use crate::store::RegionStore;

/// Axis-aligned square ring with the given lower-left corner and side.
pub(crate) fn square(min_x: f64, min_y: f64, side: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::new(vec![
            Coord { x: min_x, y: min_y },
            Coord {
                x: min_x + side,
                y: min_y,
            },
            Coord {
                x: min_x + side,
                y: min_y + side,
            },
            Coord {
                x: min_x,
                y: min_y + side,
            },
            Coord { x: min_x, y: min_y },
        ]),
        vec![],
    )
}

/// Province fixture: a 2x2 degree square at the given corner.
pub(crate) fn province(id: RegionId, name: &str, x: f64, y: f64) -> Region {
    Region::new(
        id,
        name.to_string(),
        RegionKind::Province,
        None,
        RegionGeometry::Polygon(square(x, y, 2.0)),
    )
}

/// District fixture: a 1x1 degree square at the given corner.
pub(crate) fn district(id: RegionId, name: &str, parent: RegionId, x: f64, y: f64) -> Region {
    Region::new(
        id,
        name.to_string(),
        RegionKind::District,
        Some(parent),
        RegionGeometry::Polygon(square(x, y, 1.0)),
    )
}

/// Synthetic gazetteer used across resolver/aggregator/api tests.
///
/// Layout (lon/lat squares):
/// - provinces Ankara and İstanbul are far apart (never adjacent);
/// - provinces İzmir and Aydın share a full border segment;
/// - districts Çankaya and Keçiören (Ankara) share a border segment,
///   as do Eyyübiye and Haliliye (Şanlıurfa).
pub(crate) fn sample_store() -> Arc<RegionStore> {
    let regions = vec![
        province(1, "Ankara", 31.0, 39.0),
        province(2, "İstanbul", 28.0, 40.5),
        province(3, "İzmir", 26.5, 38.0),
        province(4, "Aydın", 26.5, 36.0),
        province(5, "Şanlıurfa", 37.5, 36.5),
        district(101, "Çankaya", 1, 31.5, 39.5),
        district(102, "Keçiören", 1, 31.5, 40.5),
        district(501, "Eyyübiye", 5, 38.5, 37.0),
        district(502, "Haliliye", 5, 37.5, 37.0),
    ];
    Arc::new(RegionStore::new(regions).expect("fixture store is valid"))
}
