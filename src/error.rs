//! Error taxonomy for resolution and aggregation.
//!
//! Every variant is recoverable and reported to the caller as a structured
//! result; nothing here is raised past the API boundary as process-fatal.

use serde::Serialize;
use thiserror::Error;

use crate::models::{RegionId, RegionKind};

/// Failures while building the gazetteer snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("district {district} is not linked to a known province")]
    MissingParent {
        district: RegionId,
        parent: Option<RegionId>,
    },

    #[error("duplicate region id {id}")]
    DuplicateId { id: RegionId },

    #[error("{kind} {id} has no rings")]
    EmptyGeometry { id: RegionId, kind: RegionKind },
}

/// Failures while merging matched region geometries.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("region {id} ({name}) has a ring with fewer than 3 distinct points")]
    InvalidGeometry { id: RegionId, name: String },

    #[error("no usable geometry among the matched regions")]
    NoUsableGeometry,
}

/// Failures while resolving a query to regions.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("no region matched the query; unmatched tokens: {}", unmatched.join(", "))]
    NoRegionFound { unmatched: Vec<String> },

    #[error("query names {found} regions, more than the maximum of {max}")]
    TooManyMatches { found: usize, max: usize },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl ResolveError {
    /// Stable machine-readable kind for the wire error body.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::EmptyQuery => "empty_query",
            ResolveError::NoRegionFound { .. } => "no_region_found",
            ResolveError::TooManyMatches { .. } => "too_many_matches",
            ResolveError::Aggregate(AggregateError::InvalidGeometry { .. }) => "invalid_geometry",
            ResolveError::Aggregate(AggregateError::NoUsableGeometry) => "no_usable_geometry",
        }
    }

    pub fn unmatched_tokens(&self) -> &[String] {
        match self {
            ResolveError::NoRegionFound { unmatched } => unmatched,
            _ => &[],
        }
    }
}

/// Structured error body returned by the API facade.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched_tokens: Vec<String>,
}

impl From<&ResolveError> for ErrorBody {
    fn from(err: &ResolveError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            unmatched_tokens: err.unmatched_tokens().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_unmatched_tokens() {
        let err = ResolveError::NoRegionFound {
            unmatched: vec!["NonExistentRegion".to_string()],
        };
        let body = ErrorBody::from(&err);
        assert_eq!(body.kind, "no_region_found");
        assert_eq!(body.unmatched_tokens, vec!["NonExistentRegion"]);
        assert!(body.message.contains("NonExistentRegion"));
    }

    #[test]
    fn aggregate_errors_map_to_kinds() {
        let err = ResolveError::from(AggregateError::NoUsableGeometry);
        assert_eq!(err.kind(), "no_usable_geometry");
        let err = ResolveError::from(AggregateError::InvalidGeometry {
            id: 7,
            name: "X".to_string(),
        });
        assert_eq!(err.kind(), "invalid_geometry");
    }
}
