use geo::{BooleanOps, GeodesicArea, MultiPolygon};

use crate::zone::Zone;

/// Length of the shared boundary between two (mutually adjacent)
/// multipolygons, in meters.
///
/// Uses the perimeter identity `(perim(a) + perim(b) - perim(a ∪ b)) / 2`;
/// disjoint or point-touching inputs yield zero.
pub(crate) fn shared_perimeter(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    let perimeter =
        (a.geodesic_perimeter() + b.geodesic_perimeter() - a.union(b).geodesic_perimeter()) / 2.0;
    if perimeter > 1e-9 { perimeter } else { 0.0 }
}

/// Length of the boundary shared by two zones, in meters.
///
/// Returns `0.0` for invalid geometry and for zones that touch at most at a
/// point.
pub fn shared_boundary_length(a: &Zone, b: &Zone) -> f64 {
    if !a.geometry.is_valid() || !b.geometry.is_valid() {
        return 0.0;
    }
    shared_perimeter(&a.geometry.as_multi(), &b.geometry.as_multi())
}
