use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Maximum real-world gap, in meters, still considered adjacent by default.
pub const DEFAULT_TOLERANCE_METERS: f64 = 0.1;

/// Zone count above which the spatial index is engaged automatically.
pub const AUTO_INDEX_THRESHOLD: usize = 50;

/// Upper bound on grid cells per axis, so index memory and candidate-list
/// size stay bounded independent of zone count.
pub const MAX_GRID_SIZE: usize = 20;

/// Approximate degrees of latitude per meter. The same scalar is applied to
/// longitude as a deliberate simplification; accuracy degrades near the
/// poles.
pub(crate) const DEGREES_PER_METER: f64 = 1.0 / 111_320.0;

/// Tuning knobs for `merge_adjacent_zones` and `build_adjacency`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Maximum real-world gap, in meters, still considered adjacent.
    pub tolerance_meters: f64,
    /// Force the spatial index on or off; `None` engages it automatically
    /// for inputs above `AUTO_INDEX_THRESHOLD` zones.
    pub use_spatial_index: Option<bool>,
    /// Override the grid resolution (cells per axis); `None` derives it from
    /// the zone count.
    pub grid_size: Option<usize>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            tolerance_meters: DEFAULT_TOLERANCE_METERS,
            use_spatial_index: None,
            grid_size: None,
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the adjacency tolerance.
    pub fn with_tolerance_meters(mut self, meters: f64) -> Self {
        self.tolerance_meters = meters;
        self
    }

    /// Builder-style setter forcing the spatial index on or off.
    pub fn with_spatial_index(mut self, enabled: bool) -> Self {
        self.use_spatial_index = Some(enabled);
        self
    }

    /// Builder-style setter for the grid resolution.
    pub fn with_grid_size(mut self, size: usize) -> Self {
        self.grid_size = Some(size);
        self
    }

    /// Reject caller misuse before any geometry work begins.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.tolerance_meters.is_finite() && self.tolerance_meters >= 0.0,
            "tolerance_meters must be finite and non-negative, got {}",
            self.tolerance_meters
        );
        if let Some(size) = self.grid_size {
            ensure!(size >= 1, "grid_size must be at least 1, got {}", size);
        }
        Ok(())
    }

    /// Whether the spatial index is engaged for an input of `n` zones.
    pub(crate) fn index_enabled(&self, n: usize) -> bool {
        self.use_spatial_index.unwrap_or(n > AUTO_INDEX_THRESHOLD)
    }

    /// Effective grid resolution for an input of `n` zones.
    pub(crate) fn effective_grid_size(&self, n: usize) -> usize {
        self.grid_size.unwrap_or_else(|| default_grid_size(n))
    }
}

/// Default grid resolution: `min(20, ceil(sqrt(n / 5)))`, at least 1, so
/// average cell occupancy stays small regardless of zone count.
pub(crate) fn default_grid_size(n: usize) -> usize {
    ((n as f64 / 5.0).sqrt().ceil() as usize).clamp(1, MAX_GRID_SIZE)
}

/// Convert a tolerance in meters to its approximate degree equivalent.
pub(crate) fn tolerance_degrees(meters: f64) -> f64 {
    meters * DEGREES_PER_METER
}
