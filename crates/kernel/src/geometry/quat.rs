use std::f64::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::vector::Vec3;

/// A unit rotation quaternion, stored as `(x, y, z, w)` for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Shortest rotation taking direction `from` onto direction `to`.
    ///
    /// Antiparallel inputs rotate half a turn about an axis perpendicular
    /// to `from`. A zero-length input yields the identity.
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let (Some(a), Some(b)) = (from.normalized(), to.normalized()) else {
            return Self::IDENTITY;
        };
        let (a, b) = (a.to_na(), b.to_na());
        let q = UnitQuaternion::rotation_between(&a, &b).unwrap_or_else(|| {
            let helper = if a.x.abs() < 0.9 { Vector3::x() } else { Vector3::z() };
            let axis = nalgebra::Unit::new_normalize(a.cross(&helper));
            UnitQuaternion::from_axis_angle(&axis, PI)
        });
        Self::from_na(&q)
    }

    /// Rotation that orients a +Y-aligned primitive (cylinder, ring) along
    /// `direction`.
    pub fn from_up_to(direction: Vec3) -> Self {
        Self::from_rotation_arc(Vec3::Y, direction)
    }

    pub fn rotate(&self, v: Vec3) -> Vec3 {
        Vec3::from_na(&(self.to_na() * v.to_na()))
    }

    fn to_na(self) -> UnitQuaternion<f64> {
        UnitQuaternion::new_normalize(nalgebra::Quaternion::new(self.w, self.x, self.y, self.z))
    }

    fn from_na(q: &UnitQuaternion<f64>) -> Self {
        Self {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}
