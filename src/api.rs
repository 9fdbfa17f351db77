//! Public facade: orchestrates resolution and aggregation over the shared
//! snapshot and shapes the wire-level results.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::ResolveError;
use crate::geometry::{self, AggregatedGeometry};
use crate::index::Suggestion;
use crate::models::{RegionId, RegionKind, RegionSummary};
use crate::resolve::{RegionKindHint, Resolver, ResolverConfig};
use crate::store::RegionStore;

/// Successful resolve-and-aggregate answer.
///
/// Partial matches are not errors: tokens that matched nothing and regions
/// dropped by geometry validation are surfaced as warning lists next to the
/// result instead of silently disappearing.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    pub regions: Vec<RegionSummary>,
    pub geometry: AggregatedGeometry,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched_tokens: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_regions: Vec<RegionSummary>,
}

/// Entry of the static region listing.
#[derive(Debug, Clone, Serialize)]
pub struct RegionListEntry {
    pub id: RegionId,
    pub name: String,
}

/// Startup/health snapshot reported by the HTTP facade.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub store_loaded: bool,
    pub index_ready: bool,
    pub provinces: usize,
    pub districts: usize,
    pub built_at: DateTime<Utc>,
}

/// Facade over the resolver and aggregator.
pub struct CoordinateApi {
    store: Arc<RegionStore>,
    resolver: Resolver,
}

impl CoordinateApi {
    pub fn new(store: Arc<RegionStore>, config: ResolverConfig) -> Self {
        let resolver = Resolver::new(store.clone(), config);
        Self { store, resolver }
    }

    /// Resolves a free-text query and merges the matched geometries.
    pub fn resolve_and_aggregate(
        &self,
        query: &str,
        hint: RegionKindHint,
    ) -> Result<ResolveResponse, ResolveError> {
        let resolution = self.resolver.resolve(query, hint)?;
        let aggregation = geometry::aggregate(&resolution.regions)?;

        debug!(
            "Aggregated {} regions (contiguous: {})",
            resolution.regions.len(),
            aggregation.geometry.is_contiguous
        );

        Ok(ResolveResponse {
            regions: resolution.regions.iter().map(|r| r.summary()).collect(),
            geometry: aggregation.geometry,
            unmatched_tokens: resolution.unmatched,
            rejected_regions: aggregation.rejected,
        })
    }

    /// Autocomplete suggestions for a name fragment.
    pub fn suggest(&self, fragment: &str, limit: usize) -> Vec<Suggestion> {
        self.resolver.index().suggest(fragment, limit)
    }

    /// Static region listing, sorted by name.
    ///
    /// `locale` selects the name variant; the dataset only carries canonical
    /// Turkish names, so every locale currently falls back to those.
    pub fn list_regions(&self, kind: RegionKind, _locale: &str) -> Vec<RegionListEntry> {
        self.store
            .list(kind)
            .into_iter()
            .map(|region| RegionListEntry {
                id: region.id,
                name: region.name.clone(),
            })
            .collect()
    }

    pub fn health(&self) -> Health {
        let stats = self.store.stats();
        Health {
            status: "ok",
            store_loaded: !self.store.is_empty(),
            index_ready: !self.resolver.index().is_empty(),
            provinces: stats.provinces,
            districts: stats.districts,
            built_at: self.store.built_at(),
        }
    }

    pub fn store(&self) -> &Arc<RegionStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoShape;
    use crate::normalize::fold_key;
    use crate::testutil::sample_store;

    fn api() -> CoordinateApi {
        CoordinateApi::new(sample_store(), ResolverConfig::default())
    }

    #[test]
    fn two_distant_provinces_are_not_contiguous() {
        let api = api();
        let response = api
            .resolve_and_aggregate("Ankara, İstanbul", RegionKindHint::Auto)
            .unwrap();
        assert_eq!(response.regions.len(), 2);
        assert_eq!(response.regions[0].name, "Ankara");
        assert_eq!(response.regions[1].name, "İstanbul");
        assert!(!response.geometry.is_contiguous);
        assert!(matches!(
            response.geometry.polygon,
            GeoShape::MultiPolygon { .. }
        ));
    }

    #[test]
    fn single_region_answer_is_contiguous() {
        let api = api();
        let response = api
            .resolve_and_aggregate("Aydın", RegionKindHint::Auto)
            .unwrap();
        assert_eq!(response.regions.len(), 1);
        assert!(response.geometry.is_contiguous);
        assert!(response.unmatched_tokens.is_empty());
    }

    #[test]
    fn warnings_surface_unmatched_tokens() {
        let api = api();
        let response = api
            .resolve_and_aggregate("Aydın ve Atlantis", RegionKindHint::Auto)
            .unwrap();
        assert_eq!(response.unmatched_tokens, vec!["Atlantis"]);
    }

    #[test]
    fn errors_carry_a_structured_kind() {
        let api = api();
        let err = api
            .resolve_and_aggregate("NonExistentRegion", RegionKindHint::Auto)
            .unwrap_err();
        assert_eq!(err.kind(), "no_region_found");
        assert_eq!(err.unmatched_tokens(), ["NonExistentRegion"]);
    }

    #[test]
    fn suggestions_match_fragment_within_limit() {
        let api = api();
        let suggestions = api.suggest("an", 5);
        assert!(suggestions.len() <= 5);
        assert!(suggestions.iter().all(|s| fold_key(&s.name).contains("an")));
    }

    #[test]
    fn region_listing_is_sorted_by_name() {
        let api = api();
        let provinces = api.list_regions(RegionKind::Province, "tr");
        let names: Vec<&str> = provinces.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ankara", "Aydın", "İstanbul", "İzmir", "Şanlıurfa"]);
        let districts = api.list_regions(RegionKind::District, "tr");
        assert_eq!(districts.len(), 4);
    }

    #[test]
    fn health_reports_snapshot_counts() {
        let api = api();
        let health = api.health();
        assert_eq!(health.status, "ok");
        assert!(health.store_loaded);
        assert!(health.index_ready);
        assert_eq!(health.provinces, 5);
        assert_eq!(health.districts, 4);
    }

    #[test]
    fn response_serializes_to_wire_shape() {
        let api = api();
        let response = api
            .resolve_and_aggregate("Eyyübiye ve Haliliye", RegionKindHint::District)
            .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["regions"][0]["type"], "district");
        assert!(json["geometry"]["bounding_box"].is_array());
        assert_eq!(json["geometry"]["is_contiguous"], true);
        assert!(json.get("unmatched_tokens").is_none());
    }
}
