//! Immutable gazetteer snapshot shared by all queries.
//!
//! Built once from the loaded region records and never mutated afterwards;
//! callers share it through an `Arc` with no locking. Rebuilding the dataset
//! means constructing a new snapshot, not editing this one.

use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use tracing::info;

use crate::error::StoreError;
use crate::models::{Region, RegionId, RegionKind};

/// Aggregate counts for the snapshot, reported by the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStats {
    pub provinces: usize,
    pub districts: usize,
}

/// Read-only collection of region records.
pub struct RegionStore {
    regions: Vec<Region>,
    by_id: HashMap<RegionId, usize>,
    built_at: DateTime<Utc>,
}

impl RegionStore {
    /// Builds the snapshot, checking the gazetteer invariants: unique ids,
    /// at least one ring per region, and district parent links that resolve
    /// to a province in the same snapshot.
    pub fn new(regions: Vec<Region>) -> Result<Self, StoreError> {
        let mut by_id = HashMap::with_capacity(regions.len());
        let mut provinces: HashSet<RegionId> = HashSet::new();

        for (slot, region) in regions.iter().enumerate() {
            if by_id.insert(region.id, slot).is_some() {
                return Err(StoreError::DuplicateId { id: region.id });
            }
            if region.geometry.polygons().is_empty() {
                return Err(StoreError::EmptyGeometry {
                    id: region.id,
                    kind: region.kind,
                });
            }
            if region.kind == RegionKind::Province {
                provinces.insert(region.id);
            }
        }

        for region in &regions {
            if region.kind == RegionKind::District {
                let linked = region
                    .parent_id
                    .map(|parent| provinces.contains(&parent))
                    .unwrap_or(false);
                if !linked {
                    return Err(StoreError::MissingParent {
                        district: region.id,
                        parent: region.parent_id,
                    });
                }
            }
        }

        let store = Self {
            regions,
            by_id,
            built_at: Utc::now(),
        };
        let stats = store.stats();
        info!(
            "Gazetteer snapshot ready: {} provinces, {} districts",
            stats.provinces, stats.districts
        );
        Ok(store)
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.by_id.get(&id).map(|slot| &self.regions[*slot])
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Regions of one kind, sorted by folded name (display name as tiebreak).
    pub fn list(&self, kind: RegionKind) -> Vec<&Region> {
        let mut out: Vec<&Region> = self.regions.iter().filter(|r| r.kind == kind).collect();
        out.sort_by(|a, b| {
            a.normalized_name
                .cmp(&b.normalized_name)
                .then_with(|| a.name.cmp(&b.name))
        });
        out
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            provinces: self
                .regions
                .iter()
                .filter(|r| r.kind == RegionKind::Province)
                .count(),
            districts: self
                .regions
                .iter()
                .filter(|r| r.kind == RegionKind::District)
                .count(),
        }
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
