use serde::{Deserialize, Serialize};

/// Tunables for the interactive tools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Grid pitch for drawn points; zero or negative disables grid snapping.
    pub grid_step: f64,
    /// Maximum ray-to-endpoint distance for snapping onto existing pipes.
    pub snap_radius: f64,
    /// Clicks closer than this to the pending start are ignored.
    pub min_segment: f64,
    /// Segment length used in fixed-length mode.
    pub fixed_length: f64,
    /// Marquees narrower or shorter than this many pixels count as clicks.
    pub marquee_min_px: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            grid_step: 0.5,
            snap_radius: 0.5,
            min_segment: 0.01,
            fixed_length: 6.0,
            marquee_min_px: 2.0,
        }
    }
}

impl DrawingConfig {
    /// Grid snapping disabled; endpoint snapping still applies.
    pub fn free() -> Self {
        Self {
            grid_step: 0.0,
            ..Self::default()
        }
    }
}
