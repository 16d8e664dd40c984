use std::borrow::Cow;
use std::collections::HashMap;

use geo::{BoundingRect, CoordsIter, Line, LinesIter, MultiPolygon, Polygon, Rect};

// ---------------------------------------------------------------------------
// ZoneGeometry
// ---------------------------------------------------------------------------

/// The boundary shape of a zone: a single polygon or a multipolygon.
///
/// Every algorithm in the crate matches on this exhaustively; there is no
/// duck-typed shape inspection anywhere. Rings follow the `geo` conventions:
/// the exterior ring is closed and holes are separate closed rings strictly
/// inside it.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl ZoneGeometry {
    /// Axis-aligned bounding box, or `None` for empty geometry.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            ZoneGeometry::Polygon(poly) => poly.bounding_rect(),
            ZoneGeometry::MultiPolygon(multi) => multi.bounding_rect(),
        }
    }

    /// Check the ring invariants required before any adjacency work.
    ///
    /// A polygon is valid iff its exterior ring has at least 4 coordinate
    /// pairs (a closed triangle) and every coordinate is finite. A
    /// multipolygon is valid iff it has at least one member and every member
    /// is independently valid. Invalid zones never merge with anything; they
    /// are emitted unchanged as singleton features.
    pub fn is_valid(&self) -> bool {
        fn polygon_is_valid(poly: &Polygon<f64>) -> bool {
            poly.exterior().coords_count() >= 4
                && poly.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
        }

        match self {
            ZoneGeometry::Polygon(poly) => polygon_is_valid(poly),
            ZoneGeometry::MultiPolygon(multi) => {
                !multi.0.is_empty() && multi.0.iter().all(polygon_is_valid)
            }
        }
    }

    /// Iterate over every directed edge of every ring (exterior and holes),
    /// across all member polygons.
    pub fn edges(&self) -> Box<dyn Iterator<Item = Line<f64>> + '_> {
        match self {
            ZoneGeometry::Polygon(poly) => Box::new(poly.lines_iter()),
            ZoneGeometry::MultiPolygon(multi) => Box::new(multi.lines_iter()),
        }
    }

    /// View the geometry as a multipolygon without copying when it already
    /// is one.
    pub(crate) fn as_multi(&self) -> Cow<'_, MultiPolygon<f64>> {
        match self {
            ZoneGeometry::Polygon(poly) => Cow::Owned(MultiPolygon(vec![poly.clone()])),
            ZoneGeometry::MultiPolygon(multi) => Cow::Borrowed(multi),
        }
    }

    /// Wrap a union result, collapsing a one-member multipolygon back to a
    /// plain polygon.
    pub(crate) fn from_multi(mut multi: MultiPolygon<f64>) -> Self {
        if multi.0.len() == 1 {
            ZoneGeometry::Polygon(multi.0.pop().expect("len checked"))
        } else {
            ZoneGeometry::MultiPolygon(multi)
        }
    }
}

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// A named polygonal region offered to the merge engine.
///
/// Zones are immutable inputs: the engine reads them and produces new merged
/// records, caching any derived data (bounding boxes, multipolygon views) in
/// its own storage.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Unique identifier, carried through to `MergedZone::merged_ids`.
    pub id: String,
    /// Display name, carried through to `MergedZone::merged_names`.
    pub name: String,
    pub geometry: ZoneGeometry,
    /// Optional precomputed bounding box; computed lazily when absent.
    pub bbox: Option<Rect<f64>>,
    /// Arbitrary caller metadata, not interpreted by the engine.
    pub properties: HashMap<String, serde_json::Value>,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, geometry: ZoneGeometry) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            geometry,
            bbox: None,
            properties: HashMap::new(),
        }
    }

    /// Builder-style setter for a precomputed bounding box.
    pub fn with_bbox(mut self, bbox: Rect<f64>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Builder-style setter for the property map.
    pub fn with_properties(mut self, properties: HashMap<String, serde_json::Value>) -> Self {
        self.properties = properties;
        self
    }

    /// The supplied bounding box, or one computed from the geometry.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.bbox.or_else(|| self.geometry.bounding_rect())
    }
}

// ---------------------------------------------------------------------------
// PreparedZone: the engine's per-call working view of a zone
// ---------------------------------------------------------------------------

/// Derived per-zone state owned by a single engine invocation.
///
/// Holding these in engine-local storage keeps the caller's `Zone` records
/// untouched and makes independent merge calls safe to run concurrently.
#[derive(Debug)]
pub(crate) struct PreparedZone<'a> {
    pub(crate) multi: Cow<'a, MultiPolygon<f64>>,
    /// `None` for invalid geometry, which is excluded from indexing and
    /// adjacency testing.
    pub(crate) bbox: Option<Rect<f64>>,
    pub(crate) valid: bool,
}

impl<'a> PreparedZone<'a> {
    pub(crate) fn new(zone: &'a Zone) -> Self {
        let valid = zone.geometry.is_valid();
        Self {
            multi: zone.geometry.as_multi(),
            bbox: if valid { zone.bounding_rect() } else { None },
            valid,
        }
    }
}

// ---------------------------------------------------------------------------
// MergedZone
// ---------------------------------------------------------------------------

/// One output feature per connected component of adjacent zones.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedZone {
    /// Union of the member geometries; a singleton group passes its original
    /// geometry through unchanged.
    pub geometry: ZoneGeometry,
    /// Ids of the original zones, in input order.
    pub merged_ids: Vec<String>,
    /// Names of the original zones, in input order.
    pub merged_names: Vec<String>,
}
