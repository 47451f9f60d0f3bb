use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// Rays nearly parallel to a plane (|n·d| below this) are treated as missing it.
const PARALLEL_EPSILON: f64 = 1e-9;

/// A pointer ray in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; the direction is normalized (zero stays zero).
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `origin` passing through `through`.
    pub fn through(origin: Point3d, through: Point3d) -> Self {
        Self::new(origin, through - origin)
    }

    pub fn at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }

    /// Shortest distance from `point` to the half-line. Points behind the
    /// origin measure to the origin itself.
    pub fn distance_to_point(&self, point: &Point3d) -> f64 {
        let to_point = *point - self.origin;
        let t = to_point.dot(&self.direction).max(0.0);
        self.at(t).distance_to(point)
    }

    /// Intersection with `plane` in front of the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Point3d> {
        let denom = plane.normal.dot(&self.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (plane.origin - self.origin).dot(&plane.normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some(self.at(t))
    }
}

/// An infinite plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
}

impl Plane {
    /// A zero normal degrades to +Y so the plane stays usable.
    pub fn new(origin: Point3d, normal: Vec3) -> Self {
        let normal = normal.normalized().unwrap_or(Vec3::Y);
        Self { origin, normal }
    }

    /// The ground plane `y = 0`.
    pub fn ground() -> Self {
        Self::horizontal_through(Point3d::ORIGIN)
    }

    /// Horizontal plane at the height of `point`.
    pub fn horizontal_through(point: Point3d) -> Self {
        Self {
            origin: point,
            normal: Vec3::Y,
        }
    }

    pub fn signed_distance(&self, point: &Point3d) -> f64 {
        (*point - self.origin).dot(&self.normal)
    }
}
