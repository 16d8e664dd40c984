//! Confirmed pairwise adjacency as a reusable neighbor graph.
//!
//! `merge_adjacent_zones` collapses groups away; callers that highlight or
//! enumerate a zone's neighbors need the pairwise relation itself. The
//! graph is built with the same oracle and index plumbing as the merge
//! path, so the two views always agree.

use anyhow::{Result, ensure};

use crate::geom::shared_perimeter;
use crate::group::for_each_adjacent_pair;
use crate::merge::MergeWarning;
use crate::options::{MergeOptions, tolerance_degrees};
use crate::zone::{PreparedZone, Zone};

/// Per-zone adjacency lists over a zone set, with neighbor rows sorted for
/// O(log deg) membership tests.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph {
    neighbors: Vec<Vec<u32>>,
    warnings: Vec<MergeWarning>,
}

/// Compute the confirmed adjacency lists for `zones`.
///
/// Zones with invalid geometry get empty rows and an `InvalidGeometry`
/// warning, mirroring the merge engine's treatment.
pub fn build_adjacency(zones: &[Zone], options: &MergeOptions) -> Result<AdjacencyGraph> {
    options.validate()?;

    let prepared: Vec<PreparedZone> = zones.iter().map(PreparedZone::new).collect();
    let warnings = zones
        .iter()
        .zip(&prepared)
        .filter(|(_, prep)| !prep.valid)
        .map(|(zone, _)| MergeWarning::InvalidGeometry { zone_id: zone.id.clone() })
        .collect();

    let mut neighbors = vec![Vec::new(); zones.len()];
    let tolerance = tolerance_degrees(options.tolerance_meters);
    for_each_adjacent_pair(&prepared, tolerance, options, |i, j| {
        neighbors[i].push(j as u32);
        neighbors[j].push(i as u32);
        Ok(())
    })?;

    for row in &mut neighbors {
        row.sort_unstable();
    }

    Ok(AdjacencyGraph { neighbors, warnings })
}

impl AdjacencyGraph {
    /// Number of zones covered by this graph.
    #[inline] pub fn len(&self) -> usize { self.neighbors.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.neighbors.is_empty() }

    /// Sorted slice of zones adjacent to `zone`.
    pub fn neighbors(&self, zone: usize) -> &[u32] {
        assert!(zone < self.neighbors.len(), "zone {} out of range", zone);
        &self.neighbors[zone]
    }

    /// Returns `true` if `a` and `b` are adjacent (binary search).
    pub fn contains(&self, a: usize, b: usize) -> bool {
        assert!(a < self.neighbors.len(), "zone {} out of range", a);
        assert!(b < self.neighbors.len(), "zone {} out of range", b);
        self.neighbors[a].binary_search(&(b as u32)).is_ok()
    }

    /// Non-fatal diagnostics collected while building the graph.
    #[inline] pub fn warnings(&self) -> &[MergeWarning] { &self.warnings }

    /// For each zone, the shared boundary length in meters with each
    /// neighbor, aligned with the rows of `neighbors`.
    ///
    /// `zones` must be the same slice the graph was built from.
    pub fn shared_perimeters(&self, zones: &[Zone]) -> Result<Vec<Vec<f64>>> {
        ensure!(
            zones.len() == self.neighbors.len(),
            "zone count {} does not match graph size {}",
            zones.len(),
            self.neighbors.len()
        );

        let multis: Vec<_> = zones.iter().map(|zone| zone.geometry.as_multi()).collect();
        Ok(self
            .neighbors
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .map(|&j| shared_perimeter(&multis[i], &multis[j as usize]))
                    .collect()
            })
            .collect())
    }
}
