//! The merge engine: one output feature per connected component of
//! adjacent zones, with graceful degradation on topology failures.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::Result;
use geo::{BooleanOps, MultiPolygon};

use crate::group::discover_groups;
use crate::options::{MergeOptions, tolerance_degrees};
use crate::zone::{MergedZone, PreparedZone, Zone, ZoneGeometry};

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Non-fatal conditions surfaced alongside the merge result.
///
/// Warnings are the out-of-band diagnostics channel: batch merges over
/// messy real-world datasets always run to completion, and callers decide
/// what to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    /// A zone failed ring validation and was emitted unmerged.
    InvalidGeometry { zone_id: String },
    /// One or more union steps failed for a group; the feature carries the
    /// best union computed so far but full membership metadata.
    PartialUnion {
        /// Ids of every member of the affected group.
        zone_ids: Vec<String>,
        /// Ids of the members whose geometry could not be folded in.
        failed_ids: Vec<String>,
    },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::InvalidGeometry { zone_id } => {
                write!(f, "zone {zone_id:?} has invalid geometry; emitted unmerged")
            }
            MergeWarning::PartialUnion { zone_ids, failed_ids } => {
                write!(
                    f,
                    "union failed for zone(s) [{}] in group [{}]; kept partial geometry",
                    failed_ids.join(", "),
                    zone_ids.join(", ")
                )
            }
        }
    }
}

/// Result of a merge call: output features plus non-fatal diagnostics.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// One feature per connected component, ordered by first appearance of
    /// each component's first zone in the input.
    pub features: Vec<MergedZone>,
    pub warnings: Vec<MergeWarning>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Group transitively-adjacent zones and collapse each group into a single
/// merged feature.
///
/// Pure with respect to its inputs: zones are only read, and every
/// intermediate structure (bounding boxes, spatial index, disjoint sets) is
/// owned by this call, so independent merges may run concurrently.
///
/// Fails fast on invalid options; every data-level problem degrades to a
/// warning in the returned [`MergeOutcome`] instead.
pub fn merge_adjacent_zones(zones: &[Zone], options: &MergeOptions) -> Result<MergeOutcome> {
    options.validate()?;

    let mut outcome = MergeOutcome::default();
    if zones.is_empty() {
        return Ok(outcome);
    }

    let prepared: Vec<PreparedZone> = zones.iter().map(PreparedZone::new).collect();
    for (zone, prep) in zones.iter().zip(&prepared) {
        if !prep.valid {
            outcome.warnings.push(MergeWarning::InvalidGeometry { zone_id: zone.id.clone() });
        }
    }

    let tolerance = tolerance_degrees(options.tolerance_meters);
    let groups = discover_groups(&prepared, tolerance, options)?;

    for members in &groups {
        let feature = merge_group(zones, &prepared, members, &mut outcome.warnings);
        outcome.features.push(feature);
    }

    Ok(outcome)
}

/// Collapse one group into its output feature. Never fails: union
/// breakdowns degrade to a `PartialUnion` warning.
fn merge_group(
    zones: &[Zone],
    prepared: &[PreparedZone],
    members: &[usize],
    warnings: &mut Vec<MergeWarning>,
) -> MergedZone {
    let merged_ids: Vec<String> = members.iter().map(|&i| zones[i].id.clone()).collect();
    let merged_names: Vec<String> = members.iter().map(|&i| zones[i].name.clone()).collect();

    // Singleton groups pass the original geometry through unchanged.
    let (&first, rest) = members.split_first().expect("groups are never empty");
    if rest.is_empty() {
        return MergedZone {
            geometry: zones[first].geometry.clone(),
            merged_ids,
            merged_names,
        };
    }

    // Incremental pairwise union. The running result may switch between one
    // and many polygons as lobes join or stay separate.
    let mut union = prepared[first].multi.clone().into_owned();
    let mut failed_ids = Vec::new();
    for &i in rest {
        match union_step(&union, &prepared[i].multi) {
            Some(next) => union = next,
            None => failed_ids.push(zones[i].id.clone()),
        }
    }

    if !failed_ids.is_empty() {
        warnings.push(MergeWarning::PartialUnion { zone_ids: merged_ids.clone(), failed_ids });
    }

    MergedZone {
        geometry: ZoneGeometry::from_multi(union),
        merged_ids,
        merged_names,
    }
}

/// One union fold step, or `None` when the topology engine cannot combine
/// the operands.
///
/// The boolean-ops backend aborts on inputs it cannot repair (numerical
/// degeneracy, pathological self-intersection); the panic is contained here
/// so the engine-level contract holds. An empty result from non-empty
/// operands is treated the same way.
fn union_step(acc: &MultiPolygon<f64>, next: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let result = catch_unwind(AssertUnwindSafe(|| acc.union(next))).ok()?;
    (!result.0.is_empty()).then_some(result)
}
