//! Pairwise adjacency between region geometries.
//!
//! Two regions count as adjacent when their boundaries share at least one
//! full segment, or their interiors overlap. Touching at a single point is
//! not adjacency. Segments are compared after snapping coordinates to a
//! `COORD_SNAP` grid, in either orientation, which matches datasets where
//! neighbouring regions are digitised from the same boundary lines.

use geo::{Area, BooleanOps, BoundingRect};
use geo_types::{Coord, MultiPolygon};
use hashbrown::HashSet;

/// Snap grid for coordinate comparison, in degrees (roughly a centimetre).
pub const COORD_SNAP: f64 = 1e-7;

/// Smallest intersection area that counts as a real overlap.
const MIN_OVERLAP_AREA: f64 = 1e-12;

type SnappedCoord = (i64, i64);
type Segment = (SnappedCoord, SnappedCoord);

fn snap(c: Coord<f64>) -> SnappedCoord {
    (
        (c.x / COORD_SNAP).round() as i64,
        (c.y / COORD_SNAP).round() as i64,
    )
}

fn segment(start: Coord<f64>, end: Coord<f64>) -> Option<Segment> {
    let a = snap(start);
    let b = snap(end);
    if a == b {
        return None;
    }
    Some(if a <= b { (a, b) } else { (b, a) })
}

fn boundary_segments(geometry: &MultiPolygon<f64>) -> HashSet<Segment> {
    let mut segments = HashSet::new();
    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
            for line in ring.lines() {
                if let Some(seg) = segment(line.start, line.end) {
                    segments.insert(seg);
                }
            }
        }
    }
    segments
}

fn envelopes_touch(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) => {
            ra.min().x <= rb.max().x + COORD_SNAP
                && rb.min().x <= ra.max().x + COORD_SNAP
                && ra.min().y <= rb.max().y + COORD_SNAP
                && rb.min().y <= ra.max().y + COORD_SNAP
        }
        _ => false,
    }
}

fn shares_segment(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    let segments = boundary_segments(a);
    for polygon in &b.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
            for line in ring.lines() {
                if let Some(seg) = segment(line.start, line.end) {
                    if segments.contains(&seg) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Adjacency predicate used for the contiguity graph.
pub fn adjacent(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    if !envelopes_touch(a, b) {
        return false;
    }
    if shares_segment(a, b) {
        return true;
    }
    a.intersection(b).unsigned_area() > MIN_OVERLAP_AREA
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::square;

    fn multi(min_x: f64, min_y: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![square(min_x, min_y, side)])
    }

    #[test]
    fn shared_edge_is_adjacent() {
        let a = multi(0.0, 0.0, 1.0);
        let b = multi(1.0, 0.0, 1.0);
        assert!(adjacent(&a, &b));
        assert!(adjacent(&b, &a));
    }

    #[test]
    fn corner_touch_is_not_adjacent() {
        let a = multi(0.0, 0.0, 1.0);
        let b = multi(1.0, 1.0, 1.0);
        assert!(!adjacent(&a, &b));
    }

    #[test]
    fn disjoint_squares_are_not_adjacent() {
        let a = multi(0.0, 0.0, 1.0);
        let b = multi(5.0, 5.0, 1.0);
        assert!(!adjacent(&a, &b));
    }

    #[test]
    fn overlapping_interiors_are_adjacent() {
        let a = multi(0.0, 0.0, 2.0);
        let b = multi(1.0, 1.0, 2.0);
        assert!(adjacent(&a, &b));
    }

    #[test]
    fn containment_is_adjacent() {
        let outer = multi(0.0, 0.0, 4.0);
        let inner = multi(1.0, 1.0, 1.0);
        assert!(adjacent(&outer, &inner));
    }

    #[test]
    fn segment_comparison_ignores_orientation() {
        // Same edge digitised in opposite directions still matches.
        let a = multi(0.0, 0.0, 1.0);
        let mut reversed = square(1.0, 0.0, 1.0);
        reversed.exterior_mut(|ring| ring.0.reverse());
        let b = MultiPolygon::new(vec![reversed]);
        assert!(adjacent(&a, &b));
    }
}
