//! The adjacency oracle: the single source of truth for "are these two
//! zones adjacent".
//!
//! Two zones are adjacent when they share a boundary segment of nonzero
//! length, overlap in area, or sit within a configured real-world distance
//! of each other. Touching at a single point never qualifies.
//!
//! # Algorithm
//!
//! 1. Bounding-box quick reject, with both boxes grown by the
//!    degree-equivalent tolerance. This is the dominant cost-saving path.
//! 2. One DE-9IM `relate` call classifies the contact: intersecting without
//!    merely touching means interior overlap, which is adjacency outright.
//!    Merely touching boundaries fall through to the shared-edge test,
//!    since the contact could still be a single point.
//! 3. Shared-edge test: some pair of edges, one from each zone, must
//!    overlap along a segment of positive length.
//! 4. Disjoint geometries are adjacent iff their minimum distance is within
//!    the degree-equivalent tolerance.

use geo::{Distance, Euclidean, Line, LinesIter, MultiPolygon, Relate};

use crate::geom;
use crate::options::tolerance_degrees;
use crate::zone::{PreparedZone, Zone};

/// Sine of the largest bearing difference at which two edges still count as
/// collinear.
const ANGULAR_EPS: f64 = 1e-9;

/// Offsets and projected overlaps below this many degrees are treated as
/// zero (a single-point contact rather than a shared segment).
const DIST_EPS: f64 = 1e-9;

/// Decide whether two zones are adjacent under `tolerance_meters`.
///
/// Symmetric in its arguments and total: invalid or empty geometry is never
/// adjacent to anything, degenerate edges are skipped, and a negative
/// tolerance is treated as zero.
pub fn zones_adjacent(a: &Zone, b: &Zone, tolerance_meters: f64) -> bool {
    let tolerance = tolerance_degrees(tolerance_meters.max(0.0));
    prepared_adjacent(&PreparedZone::new(a), &PreparedZone::new(b), tolerance)
}

/// Detector entry point on the engine's prepared view of a zone pair.
pub(crate) fn prepared_adjacent(a: &PreparedZone, b: &PreparedZone, tolerance: f64) -> bool {
    if !a.valid || !b.valid {
        return false;
    }
    let (Some(rect_a), Some(rect_b)) = (a.bbox, b.bbox) else {
        return false;
    };

    // Quick reject on tolerance-expanded bounding boxes.
    if !geom::overlaps(&geom::expand(&rect_a, tolerance), &geom::expand(&rect_b, tolerance)) {
        return false;
    }

    multis_adjacent(&a.multi, &b.multi, tolerance)
}

fn multis_adjacent(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, tolerance: f64) -> bool {
    // One relate() call gives the full DE-9IM.
    let im = a.relate(b);

    if im.is_intersects() {
        if !im.is_touches() {
            // Interior overlap (including containment/equality) is always
            // more than a point.
            return true;
        }
        // Boundary-only contact: require a genuine shared segment. In the
        // 9-char DE-9IM string, index 4 is Boundary/Boundary; dimension 1
        // means a shared line segment. The edge scan re-checks with epsilon
        // slack, so near-collinear jitter along a shared border still
        // counts.
        return im.matches("****1****").unwrap_or(false) || share_boundary_segment(a, b);
    }

    // Disjoint: adjacent iff the gap is within tolerance. Point-touching
    // pairs intersect and never reach this fallback.
    min_distance(a, b) <= tolerance
}

/// Minimum Euclidean distance between two disjoint multipolygons, taken
/// over all boundary edge pairs. Callers guarantee disjointness, so the
/// boundary distance is the geometry distance.
fn min_distance(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    a.lines_iter()
        .flat_map(|edge_a| b.lines_iter().map(move |edge_b| Euclidean.distance(&edge_a, &edge_b)))
        .fold(f64::INFINITY, f64::min)
}

/// Whether any edge of `a` overlaps any edge of `b` along a segment of
/// positive length.
fn share_boundary_segment(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    a.lines_iter()
        .any(|edge_a| b.lines_iter().any(|edge_b| edges_overlap(edge_a, edge_b)))
}

/// Decide whether two edges overlap along more than a single point.
fn edges_overlap(a: Line<f64>, b: Line<f64>) -> bool {
    let va = a.delta();
    let vb = b.delta();
    let len_a = (va.x * va.x + va.y * va.y).sqrt();
    let len_b = (vb.x * vb.x + vb.y * vb.y).sqrt();

    // Degenerate edges cannot carry a shared segment.
    if len_a < DIST_EPS || len_b < DIST_EPS {
        return false;
    }

    // Identical endpoints, in either order, are a shared edge.
    if (a.start == b.start && a.end == b.end) || (a.start == b.end && a.end == b.start) {
        return true;
    }

    // Bearings must match up to direction: the normalized cross product is
    // the sine of the bearing difference, near zero for 0° and 180°.
    if ((va.x * vb.y - va.y * vb.x) / (len_a * len_b)).abs() > ANGULAR_EPS {
        return false;
    }

    // Parallel is not enough; `b` must lie on `a`'s supporting line.
    let w = b.start - a.start;
    if ((va.x * w.y - va.y * w.x) / len_a).abs() > DIST_EPS {
        return false;
    }

    // Project both edges onto `a`'s direction and intersect the 1-D
    // intervals. Contact at a single parameter value (for example a shared
    // endpoint with the free endpoints extending in opposite directions) is
    // a point touch, not a shared segment.
    let w_end = b.end - a.start;
    let s0 = (w.x * va.x + w.y * va.y) / len_a;
    let s1 = (w_end.x * va.x + w_end.y * va.y) / len_a;
    let (b_min, b_max) = if s0 <= s1 { (s0, s1) } else { (s1, s0) };

    b_max.min(len_a) - b_min.max(0.0) > DIST_EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEGREES_PER_METER;
    use crate::zone::ZoneGeometry;
    use geo::{Coord, LineString, Polygon};

    fn square_zone(id: &str, x0: f64, y0: f64, size: f64) -> Zone {
        Zone::new(
            id,
            id.to_uppercase(),
            ZoneGeometry::Polygon(Polygon::new(
                LineString::from(vec![
                    (x0, y0),
                    (x0 + size, y0),
                    (x0 + size, y0 + size),
                    (x0, y0 + size),
                    (x0, y0),
                ]),
                vec![],
            )),
        )
    }

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Line<f64> {
        Line::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    #[test]
    fn edge_sharing_squares_are_adjacent() {
        let a = square_zone("a", 0.0, 0.0, 1.0);
        let b = square_zone("b", 1.0, 0.0, 1.0);
        assert!(zones_adjacent(&a, &b, 0.0));
    }

    #[test]
    fn corner_touching_squares_are_not_adjacent() {
        let a = square_zone("a", 0.0, 0.0, 1.0);
        let b = square_zone("b", 1.0, 1.0, 1.0);
        assert!(!zones_adjacent(&a, &b, 0.0));
    }

    #[test]
    fn overlapping_squares_are_adjacent() {
        let a = square_zone("a", 0.0, 0.0, 1.0);
        let b = square_zone("b", 0.5, 0.5, 1.0);
        assert!(zones_adjacent(&a, &b, 0.0));
    }

    #[test]
    fn contained_square_is_adjacent() {
        let outer = square_zone("outer", 0.0, 0.0, 10.0);
        let inner = square_zone("inner", 4.0, 4.0, 1.0);
        assert!(zones_adjacent(&outer, &inner, 0.0));
    }

    #[test]
    fn partial_edge_overlap_is_adjacent() {
        // B's left edge covers only the middle of A's right edge.
        let a = square_zone("a", 0.0, 0.0, 3.0);
        let b = Zone::new(
            "b",
            "B",
            ZoneGeometry::Polygon(Polygon::new(
                LineString::from(vec![(3.0, 1.0), (5.0, 1.0), (5.0, 2.0), (3.0, 2.0), (3.0, 1.0)]),
                vec![],
            )),
        );
        assert!(zones_adjacent(&a, &b, 0.0));
    }

    #[test]
    fn detection_is_symmetric() {
        let cases = [
            (square_zone("a", 0.0, 0.0, 1.0), square_zone("b", 1.0, 0.0, 1.0)),
            (square_zone("a", 0.0, 0.0, 1.0), square_zone("b", 1.0, 1.0, 1.0)),
            (square_zone("a", 0.0, 0.0, 1.0), square_zone("b", 5.0, 0.0, 1.0)),
            (square_zone("a", 0.0, 0.0, 3.0), square_zone("b", 1.0, 1.0, 1.0)),
        ];
        for (a, b) in &cases {
            for tolerance in [0.0, 0.1, 100.0] {
                assert_eq!(
                    zones_adjacent(a, b, tolerance),
                    zones_adjacent(b, a, tolerance),
                    "asymmetric verdict for {} / {} at tolerance {}",
                    a.id, b.id, tolerance
                );
            }
        }
    }

    #[test]
    fn tolerance_boundary_is_monotonic() {
        // Two squares separated by a 10 m gap (in degree equivalent).
        let gap = 10.0 * DEGREES_PER_METER;
        let a = square_zone("a", 0.0, 0.0, 1.0);
        let b = square_zone("b", 1.0 + gap, 0.0, 1.0);

        assert!(!zones_adjacent(&a, &b, 0.0));
        assert!(!zones_adjacent(&a, &b, 9.99));
        assert!(zones_adjacent(&a, &b, 10.01));
        assert!(zones_adjacent(&a, &b, 50.0));
    }

    #[test]
    fn negative_tolerance_behaves_like_zero() {
        let a = square_zone("a", 0.0, 0.0, 1.0);
        let b = square_zone("b", 1.0, 0.0, 1.0);
        assert!(zones_adjacent(&a, &b, -3.0));
    }

    #[test]
    fn invalid_geometry_is_adjacent_to_nothing() {
        let a = square_zone("a", 0.0, 0.0, 1.0);
        let bad = Zone::new(
            "bad",
            "Bad",
            ZoneGeometry::Polygon(Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]),
                vec![],
            )),
        );
        assert!(!zones_adjacent(&a, &bad, 100.0));
        assert!(!zones_adjacent(&bad, &a, 100.0));
    }

    #[test]
    fn multipolygon_members_participate() {
        let island = Zone::new(
            "i",
            "Island",
            ZoneGeometry::MultiPolygon(geo::MultiPolygon(vec![
                Polygon::new(
                    LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
                    vec![],
                ),
                Polygon::new(
                    LineString::from(vec![(5.0, 0.0), (6.0, 0.0), (6.0, 1.0), (5.0, 1.0), (5.0, 0.0)]),
                    vec![],
                ),
            ])),
        );
        // Adjacent to the second member only.
        let b = square_zone("b", 6.0, 0.0, 1.0);
        assert!(zones_adjacent(&island, &b, 0.0));
    }

    // -- edge-level cases ---------------------------------------------------

    #[test]
    fn identical_edges_overlap() {
        assert!(edges_overlap(line(0.0, 0.0, 1.0, 0.0), line(0.0, 0.0, 1.0, 0.0)));
        assert!(edges_overlap(line(0.0, 0.0, 1.0, 0.0), line(1.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn collinear_partial_overlap_counts() {
        assert!(edges_overlap(line(0.0, 0.0, 2.0, 0.0), line(1.0, 0.0, 3.0, 0.0)));
        assert!(edges_overlap(line(0.0, 0.0, 4.0, 0.0), line(1.0, 0.0, 2.0, 0.0)));
    }

    #[test]
    fn shared_endpoint_opposite_directions_is_point_touch() {
        assert!(!edges_overlap(line(0.0, 0.0, 1.0, 0.0), line(1.0, 0.0, 2.0, 0.0)));
    }

    #[test]
    fn shared_endpoint_same_direction_overlaps() {
        assert!(edges_overlap(line(0.0, 0.0, 2.0, 0.0), line(0.0, 0.0, 1.0, 0.0)));
    }

    #[test]
    fn non_collinear_edges_never_overlap() {
        assert!(!edges_overlap(line(0.0, 0.0, 1.0, 0.0), line(0.0, 0.0, 0.0, 1.0)));
        assert!(!edges_overlap(line(0.0, 0.0, 1.0, 0.0), line(0.0, 0.1, 1.0, 0.2)));
    }

    #[test]
    fn parallel_offset_edges_do_not_overlap() {
        assert!(!edges_overlap(line(0.0, 0.0, 1.0, 0.0), line(0.0, 0.5, 1.0, 0.5)));
    }

    #[test]
    fn degenerate_edges_are_skipped() {
        assert!(!edges_overlap(line(0.0, 0.0, 0.0, 0.0), line(0.0, 0.0, 1.0, 0.0)));
    }
}
