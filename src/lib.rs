//! Zone-adjacency grouping and merge engine.
//!
//! Given an arbitrary collection of polygonal zones (administrative
//! boundaries, postal areas, etc.), the engine determines which zones touch
//! along a real boundary (never merely at a point), groups
//! transitively-adjacent zones into connected components, and collapses
//! each component into a single merged feature with full membership
//! provenance.
//!
//! # Pipeline
//!
//! * [`Zone`] geometry is validated and normalized; invalid zones are
//!   isolated rather than failing the call.
//! * A grid-based spatial index prunes candidate pairs for large inputs.
//! * [`zones_adjacent`] confirms candidates: shared boundary segment of
//!   nonzero length, area overlap, or a gap within a configured tolerance
//!   in meters.
//! * Confirmed pairs are unioned into components ([`UnionFind`]) and each
//!   component is collapsed by incremental polygon union, preserving holes.
//!
//! The entry point is [`merge_adjacent_zones`]; [`build_adjacency`] exposes
//! the underlying neighbor graph for callers that need the pairwise
//! relation itself. Every call owns its intermediate state and only reads
//! the input zones, so independent calls may run concurrently.

mod adjacency;
mod geom;
mod graph;
mod grid;
mod group;
mod merge;
mod options;
mod union_find;
mod zone;

#[doc(inline)]
pub use adjacency::zones_adjacent;

#[doc(inline)]
pub use geom::shared_boundary_length;

#[doc(inline)]
pub use graph::{AdjacencyGraph, build_adjacency};

#[doc(inline)]
pub use merge::{MergeOutcome, MergeWarning, merge_adjacent_zones};

#[doc(inline)]
pub use options::{AUTO_INDEX_THRESHOLD, DEFAULT_TOLERANCE_METERS, MAX_GRID_SIZE, MergeOptions};

#[doc(inline)]
pub use union_find::UnionFind;

#[doc(inline)]
pub use zone::{MergedZone, Zone, ZoneGeometry};
