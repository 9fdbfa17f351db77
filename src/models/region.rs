//! Region records held by the gazetteer snapshot.

use geo_types::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::normalize;

/// Stable region identifier from the source dataset.
pub type RegionId = i64;

/// Administrative kind of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Province,
    District,
}

impl RegionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Province => "province",
            RegionKind::District => "district",
        }
    }
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored geometry of a region: a single polygon, or several disjoint
/// polygon groups (islands, exclaves).
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl RegionGeometry {
    /// All polygon groups of this geometry, in stored order.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            RegionGeometry::Polygon(p) => std::slice::from_ref(p),
            RegionGeometry::MultiPolygon(mp) => &mp.0,
        }
    }

    /// Copy of this geometry as a `MultiPolygon`, regardless of variant.
    pub fn to_multi(&self) -> MultiPolygon<f64> {
        match self {
            RegionGeometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            RegionGeometry::MultiPolygon(mp) => mp.clone(),
        }
    }
}

/// A single administrative region (province or district).
///
/// Immutable after load; the display `name` keeps its diacritics while
/// `normalized_name` is the diacritic-folded matching key.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub normalized_name: String,
    pub kind: RegionKind,
    /// District-to-province link. `None` for provinces.
    pub parent_id: Option<RegionId>,
    pub geometry: RegionGeometry,
}

impl Region {
    pub fn new(
        id: RegionId,
        name: String,
        kind: RegionKind,
        parent_id: Option<RegionId>,
        geometry: RegionGeometry,
    ) -> Self {
        let normalized_name = normalize::fold_key(&name);
        Self {
            id,
            name,
            normalized_name,
            kind,
            parent_id,
            geometry,
        }
    }

    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// Identification triple returned alongside aggregated geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub id: RegionId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RegionKind,
}
