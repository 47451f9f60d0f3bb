//! Geometry primitives shared by the piping layout core: points, vectors,
//! rotations, pointer rays, planes and the viewport camera.

pub mod geometry;

pub use geometry::{Camera, Plane, Point3d, Quat, Ray, Vec3};

use serde::{Deserialize, Serialize};

/// Global tolerance configuration for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Points closer than this are considered the same point.
    pub coincidence: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3d, b: &Point3d) -> bool {
        a.distance_to(b) < self.coincidence
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }
}

/// Default tolerance.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
