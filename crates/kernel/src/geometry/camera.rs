use nalgebra::{Matrix4, Perspective3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::ray::Ray;

/// Clip-space `w` below this is treated as behind the eye.
const CLIP_W_EPSILON: f64 = 1e-9;

/// The active viewport camera: eye position plus the combined
/// view-projection matrix (column-major, OpenGL clip conventions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Point3d,
    pub view_proj: [f64; 16],
}

impl Camera {
    /// Wrap a view-projection matrix supplied by the renderer.
    pub fn from_view_projection(position: Point3d, view_proj: [f64; 16]) -> Self {
        Self {
            position,
            view_proj,
        }
    }

    /// Perspective camera at `eye` looking at `target`, `fov_y` in radians.
    pub fn look_at(
        eye: Point3d,
        target: Point3d,
        fov_y: f64,
        aspect: f64,
        near: f64,
        far: f64,
    ) -> Self {
        let forward = target - eye;
        // Straight-down views cannot use +Y as the up hint.
        let up = if forward.horizontal().is_zero() {
            -Vector3::z()
        } else {
            Vector3::y()
        };
        let view = Matrix4::look_at_rh(&eye.to_na(), &target.to_na(), &up);
        let proj = Perspective3::new(aspect, fov_y, near, far).to_homogeneous();
        let vp = proj * view;

        let mut view_proj = [0.0; 16];
        view_proj.copy_from_slice(vp.as_slice());
        Self {
            position: eye,
            view_proj,
        }
    }

    fn matrix(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(&self.view_proj)
    }

    /// Project a world point to normalized device coordinates `(x, y)`,
    /// each in `[-1, 1]` when on screen. `None` behind the camera.
    pub fn project_ndc(&self, point: &Point3d) -> Option<(f64, f64)> {
        let clip = self.matrix() * Vector4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= CLIP_W_EPSILON {
            return None;
        }
        let x = clip.x / clip.w;
        let y = clip.y / clip.w;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some((x, y))
    }

    /// World-space pointer ray through the NDC position `(x, y)`.
    pub fn ray_through_ndc(&self, x: f64, y: f64) -> Option<Ray> {
        let inverse = self.matrix().try_inverse()?;
        let unproject = |z: f64| -> Option<Point3d> {
            let p = inverse * Vector4::new(x, y, z, 1.0);
            if p.w.abs() < CLIP_W_EPSILON {
                return None;
            }
            Some(Point3d::new(p.x / p.w, p.y / p.w, p.z / p.w))
        };
        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;
        Some(Ray::through(near, far))
    }
}
