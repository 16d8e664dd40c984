//! Connected-component discovery over the confirmed adjacency relation.
//!
//! Candidate pairs come from the spatial index when it is engaged (or an
//! exhaustive scan otherwise), are confirmed by the adjacency detector, and
//! are unioned in a disjoint-set structure. Components are read off in
//! first-appearance order, so identical input always produces identical
//! grouping regardless of whether the index was used.

use anyhow::Result;

use crate::adjacency::prepared_adjacent;
use crate::grid::GridIndex;
use crate::options::MergeOptions;
use crate::union_find::UnionFind;
use crate::zone::PreparedZone;

/// Visit every confirmed-adjacent pair `(i, j)` with `i < j` exactly once.
pub(crate) fn for_each_adjacent_pair<F>(
    zones: &[PreparedZone],
    tolerance: f64,
    options: &MergeOptions,
    mut confirmed: F,
) -> Result<()>
where
    F: FnMut(usize, usize) -> Result<()>,
{
    let n = zones.len();

    let index = if options.index_enabled(n) {
        let bboxes: Vec<_> = zones.iter().map(|zone| zone.bbox).collect();
        GridIndex::build(&bboxes, options.effective_grid_size(n))
    } else {
        None
    };

    match index {
        Some(index) => {
            for i in 0..n {
                for j in index.candidates_for(i) {
                    let j = j as usize;
                    // The candidate relation is symmetric; visit each pair once.
                    if j > i && prepared_adjacent(&zones[i], &zones[j], tolerance) {
                        confirmed(i, j)?;
                    }
                }
            }
        }
        None => {
            for i in 0..n {
                for j in (i + 1)..n {
                    if prepared_adjacent(&zones[i], &zones[j], tolerance) {
                        confirmed(i, j)?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Partition the zone set into connected components under adjacency.
///
/// Returns groups ordered by the input position of each group's first
/// member, with members in input order. Invalid zones are never offered to
/// the detector and come out as singletons.
pub(crate) fn discover_groups(
    zones: &[PreparedZone],
    tolerance: f64,
    options: &MergeOptions,
) -> Result<Vec<Vec<usize>>> {
    let mut dsu = UnionFind::new(zones.len());
    for_each_adjacent_pair(zones, tolerance, options, |i, j| {
        dsu.union(i, j)?;
        Ok(())
    })?;

    // Read components off by root, preserving first-appearance order.
    let mut group_of_root: Vec<Option<usize>> = vec![None; zones.len()];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..zones.len() {
        let root = dsu.find(i)?;
        match group_of_root[root] {
            Some(group) => groups[group].push(i),
            None => {
                group_of_root[root] = Some(groups.len());
                groups.push(vec![i]);
            }
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::tolerance_degrees;
    use crate::zone::{Zone, ZoneGeometry};
    use geo::{LineString, Polygon};

    fn square_zone(id: &str, x0: f64) -> Zone {
        Zone::new(
            id,
            id.to_uppercase(),
            ZoneGeometry::Polygon(Polygon::new(
                LineString::from(vec![
                    (x0, 0.0),
                    (x0 + 1.0, 0.0),
                    (x0 + 1.0, 1.0),
                    (x0, 1.0),
                    (x0, 0.0),
                ]),
                vec![],
            )),
        )
    }

    fn groups_for(zones: &[Zone], options: &MergeOptions) -> Vec<Vec<usize>> {
        let prepared: Vec<_> = zones.iter().map(crate::zone::PreparedZone::new).collect();
        let tolerance = tolerance_degrees(options.tolerance_meters);
        discover_groups(&prepared, tolerance, options).unwrap()
    }

    #[test]
    fn chain_collapses_to_one_group() {
        let zones: Vec<_> = (0..4).map(|i| square_zone(&format!("z{i}"), i as f64)).collect();
        let groups = groups_for(&zones, &MergeOptions::default());
        assert_eq!(groups, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn isolated_zones_stay_singletons() {
        let zones = vec![square_zone("a", 0.0), square_zone("b", 5.0), square_zone("c", 10.0)];
        let groups = groups_for(&zones, &MergeOptions::default());
        assert_eq!(groups, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn grouping_is_identical_with_and_without_index() {
        // Two chains interleaved with a gap, enough zones to exercise the
        // grid but below the auto threshold, so the flag decides.
        let mut zones = Vec::new();
        for i in 0..8 {
            zones.push(square_zone(&format!("left{i}"), i as f64));
        }
        for i in 0..8 {
            zones.push(square_zone(&format!("right{i}"), 100.0 + i as f64));
        }

        let with_index = groups_for(&zones, &MergeOptions::new().with_spatial_index(true));
        let without_index = groups_for(&zones, &MergeOptions::new().with_spatial_index(false));
        assert_eq!(with_index, without_index);
        assert_eq!(with_index.len(), 2);
    }

    #[test]
    fn groups_follow_first_appearance_order() {
        // First zone belongs to the *second* chain by position; its group
        // must still come first in the output.
        let zones = vec![
            square_zone("b1", 100.0),
            square_zone("a1", 0.0),
            square_zone("a2", 1.0),
            square_zone("b2", 101.0),
        ];
        let groups = groups_for(&zones, &MergeOptions::default());
        assert_eq!(groups, vec![vec![0, 3], vec![1, 2]]);
    }

    #[test]
    fn invalid_zone_is_a_singleton_even_when_overlapping() {
        let mut zones = vec![square_zone("a", 0.0), square_zone("b", 1.0)];
        zones.push(Zone::new(
            "bad",
            "Bad",
            ZoneGeometry::Polygon(Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]),
                vec![],
            )),
        ));
        let groups = groups_for(&zones, &MergeOptions::default());
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
    }
}
