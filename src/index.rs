//! Normalized-name search index over the gazetteer snapshot.
//!
//! Built once at startup and read-only afterwards. Exact lookups go through
//! a hash map keyed by folded name; suggestion lookups scan the entry list,
//! ranking starts-with hits before contains hits, shorter names before
//! longer ones.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::Serialize;
use tracing::info;

use crate::models::{Region, RegionKind};
use crate::normalize::fold_key;
use crate::store::RegionStore;

/// Autocomplete entry: display name plus region kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RegionKind,
}

struct IndexEntry {
    key: String,
    slot: usize,
    kind: RegionKind,
}

/// Read-only text index mapping folded names to region records.
pub struct SearchIndex {
    store: Arc<RegionStore>,
    exact: HashMap<String, Vec<usize>>,
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    /// Builds the index from the snapshot. Store order is preserved inside
    /// each exact bucket, so provinces loaded first win name collisions.
    pub fn build(store: Arc<RegionStore>) -> Self {
        let mut exact: HashMap<String, Vec<usize>> = HashMap::new();
        let mut entries = Vec::with_capacity(store.len());

        for (slot, region) in store.regions().iter().enumerate() {
            exact
                .entry(region.normalized_name.clone())
                .or_default()
                .push(slot);
            entries.push(IndexEntry {
                key: region.normalized_name.clone(),
                slot,
                kind: region.kind,
            });
        }

        info!("Search index ready: {} regions indexed", entries.len());
        Self {
            store,
            exact,
            entries,
        }
    }

    /// O(1) lookup by full normalized name, optionally filtered by kind.
    pub fn exact(&self, name: &str, kind: Option<RegionKind>) -> Option<&Region> {
        let key = fold_key(name);
        let slots = self.exact.get(&key)?;
        slots
            .iter()
            .map(|slot| &self.store.regions()[*slot])
            .find(|region| kind.is_none_or(|k| region.kind == k))
    }

    /// Regions whose folded name starts with or contains `fragment`, ranked
    /// starts-with first, then shorter name, then name ascending; truncated
    /// to `limit`.
    pub fn prefix_or_contains(
        &self,
        fragment: &str,
        kind: Option<RegionKind>,
        limit: usize,
    ) -> Vec<&Region> {
        let fragment = fold_key(fragment);
        if fragment.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<(&IndexEntry, bool)> = self
            .entries
            .iter()
            .filter(|entry| kind.is_none_or(|k| entry.kind == k))
            .filter_map(|entry| {
                if entry.key.starts_with(&fragment) {
                    Some((entry, true))
                } else if entry.key.contains(&fragment) {
                    Some((entry, false))
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|(a, a_starts), (b, b_starts)| {
            b_starts
                .cmp(a_starts)
                .then_with(|| a.key.len().cmp(&b.key.len()))
                .then_with(|| a.key.cmp(&b.key))
        });

        hits.into_iter()
            .take(limit)
            .map(|(entry, _)| &self.store.regions()[entry.slot])
            .collect()
    }

    /// Autocomplete projection of [`prefix_or_contains`] across both kinds.
    ///
    /// [`prefix_or_contains`]: SearchIndex::prefix_or_contains
    pub fn suggest(&self, fragment: &str, limit: usize) -> Vec<Suggestion> {
        self.prefix_or_contains(fragment, None, limit)
            .into_iter()
            .map(|region| Suggestion {
                name: region.name.clone(),
                kind: region.kind,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store(&self) -> &Arc<RegionStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::fold_key;
    use crate::testutil::sample_store;

    #[test]
    fn exact_lookup_ignores_diacritics_and_case() {
        let index = SearchIndex::build(sample_store());
        let region = index.exact("sanliurfa", None).unwrap();
        assert_eq!(region.name, "Şanlıurfa");
        let region = index.exact("EYYÜBİYE", Some(RegionKind::District)).unwrap();
        assert_eq!(region.id, 501);
    }

    #[test]
    fn exact_lookup_respects_kind_filter() {
        let index = SearchIndex::build(sample_store());
        assert!(index.exact("Ankara", Some(RegionKind::Province)).is_some());
        assert!(index.exact("Ankara", Some(RegionKind::District)).is_none());
    }

    #[test]
    fn ranking_puts_prefix_hits_before_contains_hits() {
        let index = SearchIndex::build(sample_store());
        let hits = index.prefix_or_contains("an", None, 10);
        assert!(!hits.is_empty());
        // "Ankara" starts with "an"; "İstanbul" and "Çankaya" merely contain it.
        assert_eq!(hits[0].name, "Ankara");
        let keys: Vec<&str> = hits.iter().map(|r| r.normalized_name.as_str()).collect();
        assert!(keys.contains(&"istanbul"));
        assert!(keys.contains(&"cankaya"));
    }

    #[test]
    fn shorter_names_rank_first_within_a_tier() {
        let index = SearchIndex::build(sample_store());
        let hits = index.prefix_or_contains("iye", None, 10);
        // Both contains-hits: "haliliye" (8) before "eyyubiye"? Same length;
        // falls back to name ascending.
        let keys: Vec<&str> = hits.iter().map(|r| r.normalized_name.as_str()).collect();
        assert_eq!(keys, vec!["eyyubiye", "haliliye"]);
    }

    #[test]
    fn suggest_honours_limit_and_contains_fragment() {
        let index = SearchIndex::build(sample_store());
        let suggestions = index.suggest("an", 5);
        assert!(suggestions.len() <= 5);
        assert!(!suggestions.is_empty());
        for s in &suggestions {
            assert!(fold_key(&s.name).contains("an"), "{} lacks fragment", s.name);
        }
        assert_eq!(suggestions[0].name, "Ankara");
    }

    #[test]
    fn empty_fragment_suggests_nothing() {
        let index = SearchIndex::build(sample_store());
        assert!(index.suggest("", 5).is_empty());
        assert!(index.suggest(" , ", 5).is_empty());
    }
}
