use iso_types::{Annotation, PipeSegment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The canonical entity lists of a layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub pipes: Vec<PipeSegment>,
    pub annotations: Vec<Annotation>,
    /// Number used for the next generated pipe name.
    pub next_number: u32,
}

/// Tunables for connectivity resolution and fitting geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Decimal places kept when quantizing endpoints into junction keys.
    pub key_decimals: u32,
    /// Two outward vectors with a dot product below this form a straight joint.
    pub straight_dot: f64,
    /// Elbow bend radius as a multiple of the larger diameter.
    pub elbow_radius_factor: f64,
    /// Floor for a pipe's rendered length after trimming.
    pub min_visible_length: f64,
    /// Diameter given to newly drawn pipes.
    pub default_diameter: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            key_decimals: 3,
            straight_dot: -0.99,
            elbow_radius_factor: 1.5,
            min_visible_length: 0.01,
            default_diameter: 0.2,
        }
    }
}

impl TopologyConfig {
    /// Coarser merging: endpoints within roughly a centimeter share a junction.
    pub fn coarse() -> Self {
        Self {
            key_decimals: 2,
            ..Self::default()
        }
    }

    /// Bend radius for an elbow joining pipes of the given diameters.
    pub fn bend_radius(&self, diameter_a: f64, diameter_b: f64) -> f64 {
        self.elbow_radius_factor * diameter_a.max(diameter_b)
    }
}

/// Errors from the layout engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("pipe not found: {id}")]
    PipeNotFound { id: Uuid },

    #[error("annotation not found: {id}")]
    AnnotationNotFound { id: Uuid },

    #[error("degenerate segment: length {length} is below tolerance")]
    DegenerateSegment { length: f64 },

    #[error("invalid diameter {diameter}: must be positive")]
    InvalidDiameter { diameter: f64 },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}
