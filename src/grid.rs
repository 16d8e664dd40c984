//! Grid-based spatial index over the combined bounds of a zone set.
//!
//! The index maps every zone to the grid cells its bounding box overlaps and
//! answers candidate-neighbor queries from the zone's own cells plus a
//! one-cell Moore margin. Candidates over-approximate true neighbors; the
//! adjacency detector filters the false positives. Because cells are sized
//! from the combined extent, the one-cell margin never produces false
//! negatives.
//!
//! Built once per engine invocation and read-only afterward.

use ahash::AHashSet;
use geo::Rect;
use smallvec::SmallVec;

use crate::geom;

/// Per-zone inclusive cell span, `(x0, x1, y0, y1)`.
type CellSpan = (usize, usize, usize, usize);

#[derive(Debug)]
pub(crate) struct GridIndex {
    bounds: Rect<f64>,
    /// Cells per axis.
    size: usize,
    cell_width: f64,
    cell_height: f64,
    /// Row-major buckets of zone indices, `size * size` entries.
    cells: Vec<SmallVec<[u32; 4]>>,
    /// Cell span per zone; `None` for zones without a bounding box.
    spans: Vec<Option<CellSpan>>,
}

impl GridIndex {
    /// Build an index over `bboxes` (one entry per zone, `None` for zones
    /// that must not be indexed). Returns `None` when no zone has a
    /// bounding box at all.
    pub(crate) fn build(bboxes: &[Option<Rect<f64>>], size: usize) -> Option<Self> {
        debug_assert!(size >= 1, "grid size must be at least 1");

        let bounds = geom::combined_bounds(bboxes.iter().flatten())?;

        // A degenerate axis (all zones stacked on one line or point) still
        // needs a positive cell extent so coordinates land in cell 0.
        let cell_width = (bounds.width() / size as f64).max(f64::MIN_POSITIVE);
        let cell_height = (bounds.height() / size as f64).max(f64::MIN_POSITIVE);

        let mut index = Self {
            bounds,
            size,
            cell_width,
            cell_height,
            cells: vec![SmallVec::new(); size * size],
            spans: Vec::with_capacity(bboxes.len()),
        };

        for (i, bbox) in bboxes.iter().enumerate() {
            let span = bbox.as_ref().map(|rect| index.cell_span(rect));
            if let Some((x0, x1, y0, y1)) = span {
                for y in y0..=y1 {
                    for x in x0..=x1 {
                        index.cells[y * size + x].push(i as u32);
                    }
                }
            }
            index.spans.push(span);
        }

        Some(index)
    }

    /// Inclusive range of cells a rectangle overlaps, clamped to the grid.
    fn cell_span(&self, rect: &Rect<f64>) -> CellSpan {
        let clamp = |value: f64| -> usize {
            (value.floor() as isize).clamp(0, self.size as isize - 1) as usize
        };
        (
            clamp((rect.min().x - self.bounds.min().x) / self.cell_width),
            clamp((rect.max().x - self.bounds.min().x) / self.cell_width),
            clamp((rect.min().y - self.bounds.min().y) / self.cell_height),
            clamp((rect.max().y - self.bounds.min().y) / self.cell_height),
        )
    }

    /// Plausible neighbors of `zone`: the deduplicated union of the buckets
    /// of the zone's own cells and their Moore neighbors, excluding the zone
    /// itself, sorted ascending for deterministic scan order.
    pub(crate) fn candidates_for(&self, zone: usize) -> Vec<u32> {
        let Some(Some((x0, x1, y0, y1))) = self.spans.get(zone).copied() else {
            return Vec::new();
        };

        let x0 = x0.saturating_sub(1);
        let y0 = y0.saturating_sub(1);
        let x1 = (x1 + 1).min(self.size - 1);
        let y1 = (y1 + 1).min(self.size - 1);

        let mut seen = AHashSet::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                seen.extend(self.cells[y * self.size + x].iter().copied());
            }
        }
        seen.remove(&(zone as u32));

        let mut candidates: Vec<u32> = seen.into_iter().collect();
        candidates.sort_unstable();
        candidates
    }
}
