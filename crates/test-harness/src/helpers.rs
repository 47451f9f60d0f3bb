//! Helper functions: error type, pointer and camera constructors, segment builders.

use iso_kernel::{Camera, Point3d, Vec3};
use iso_types::PipeSegment;
use editor_bridge::Pointer;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("pipe not found: {name}")]
    PipeNotFound { name: String },

    #[error("dispatch error: {message}")]
    DispatchError { message: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },
}

// ── Pointers ────────────────────────────────────────────────────────────────

/// Height the synthetic pointer rays start from.
pub const EYE_HEIGHT: f64 = 20.0;

/// A pointer ray straight down onto the ground plane at `(x, z)`.
pub fn down_pointer(x: f64, z: f64) -> Pointer {
    Pointer::Ray {
        origin: Point3d::new(x, EYE_HEIGHT, z),
        direction: Vec3::new(0.0, -1.0, 0.0),
    }
}

/// A pointer ray from `eye` through `target`.
pub fn pointer_through(eye: [f64; 3], target: [f64; 3]) -> Pointer {
    let origin = Point3d::from_array(eye);
    Pointer::Ray {
        origin,
        direction: Point3d::from_array(target) - origin,
    }
}

// ── Cameras ─────────────────────────────────────────────────────────────────

/// Perspective camera on the classic isometric diagonal, looking at `target`
/// from `distance` away. Square aspect.
pub fn iso_camera(target: [f64; 3], distance: f64) -> Camera {
    let target = Point3d::from_array(target);
    let offset = Vec3::new(1.0, 1.0, 1.0).normalize_or_zero() * distance;
    Camera::look_at(target + offset, target, std::f64::consts::FRAC_PI_4, 1.0, 0.1, distance * 10.0)
}

/// Perspective camera looking straight down the -Z axis at the origin.
pub fn front_camera(distance: f64) -> Camera {
    Camera::look_at(
        Point3d::new(0.0, 0.0, distance),
        Point3d::ORIGIN,
        std::f64::consts::FRAC_PI_4,
        1.0,
        0.1,
        distance * 10.0,
    )
}

// ── Segments ────────────────────────────────────────────────────────────────

/// A named pipe with the default 0.2 diameter.
pub fn segment(name: &str, start: [f64; 3], end: [f64; 3]) -> PipeSegment {
    PipeSegment::new(
        name.to_string(),
        Point3d::from_array(start),
        Point3d::from_array(end),
        0.2,
    )
}

/// Format a point for diagnostics.
pub fn fmt_point(p: &Point3d) -> String {
    format!("({:.4}, {:.4}, {:.4})", p.x, p.y, p.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_camera_sees_its_target_at_center() {
        let cam = iso_camera([1.0, 0.0, 2.0], 15.0);
        let (x, y) = cam.project_ndc(&Point3d::new(1.0, 0.0, 2.0)).unwrap();
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn pointer_through_points_at_target() {
        let Pointer::Ray { origin, direction } = pointer_through([0.0, 5.0, 0.0], [2.0, 0.0, 0.0]) else {
            panic!("expected ray");
        };
        assert_eq!(origin + direction, Point3d::new(2.0, 0.0, 0.0));
    }
}
