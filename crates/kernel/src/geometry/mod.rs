pub mod point;
pub mod vector;
pub mod quat;
pub mod ray;
pub mod camera;

pub use camera::Camera;
pub use point::Point3d;
pub use quat::Quat;
pub use ray::{Plane, Ray};
pub use vector::Vec3;
