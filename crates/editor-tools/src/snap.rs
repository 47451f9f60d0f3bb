use iso_kernel::{Point3d, Ray};
use iso_types::PipeSegment;
use serde::{Deserialize, Serialize};

/// Where a drawn point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapSource {
    /// Plane projection with no correction.
    Free,
    Grid,
    /// An existing pipe endpoint.
    Endpoint,
    FixedLength,
}

/// A candidate point for the drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    pub point: Point3d,
    pub source: SnapSource,
}

/// First pipe endpoint within `radius` of the ray, scanning pipes in list
/// order and each pipe's start before its end.
pub fn endpoint_snap(ray: &Ray, pipes: &[PipeSegment], radius: f64) -> Option<Point3d> {
    pipes
        .iter()
        .flat_map(|p| [p.start, p.end])
        .find(|point| ray.distance_to_point(point) < radius)
}

/// Round every coordinate to the grid; a non-positive step leaves the point alone.
pub fn grid_snap(point: Point3d, step: f64) -> SnapResult {
    if step > 0.0 {
        SnapResult {
            point: point.snapped_to_grid(step),
            source: SnapSource::Grid,
        }
    } else {
        SnapResult {
            point,
            source: SnapSource::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_kernel::Vec3;

    fn pipe(a: Point3d, b: Point3d) -> PipeSegment {
        PipeSegment::new("P".to_string(), a, b, 0.2)
    }

    fn down_ray(x: f64, z: f64) -> Ray {
        Ray::new(Point3d::new(x, 10.0, z), Vec3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn snaps_to_endpoint_within_radius() {
        let pipes = vec![pipe(Point3d::ORIGIN, Point3d::new(5.0, 0.0, 0.0))];
        let hit = endpoint_snap(&down_ray(5.3, 0.0), &pipes, 0.5);
        assert_eq!(hit, Some(Point3d::new(5.0, 0.0, 0.0)));
        assert_eq!(endpoint_snap(&down_ray(5.6, 0.0), &pipes, 0.5), None);
    }

    #[test]
    fn first_candidate_wins_when_ambiguous() {
        let pipes = vec![
            pipe(Point3d::new(1.2, 0.0, 0.0), Point3d::new(1.2, 0.0, 4.0)),
            pipe(Point3d::new(0.8, 0.0, 0.0), Point3d::new(0.8, 0.0, -4.0)),
        ];
        let hit = endpoint_snap(&down_ray(1.0, 0.0), &pipes, 0.5);
        assert_eq!(hit, Some(Point3d::new(1.2, 0.0, 0.0)));
    }

    #[test]
    fn grid_snap_rounds_to_step() {
        let r = grid_snap(Point3d::new(2.3, 0.0, 0.2), 0.5);
        assert_eq!(r.point, Point3d::new(2.5, 0.0, 0.0));
        assert_eq!(r.source, SnapSource::Grid);
        let free = grid_snap(Point3d::new(2.3, 0.0, 0.2), 0.0);
        assert_eq!(free.source, SnapSource::Free);
        assert_eq!(free.point, Point3d::new(2.3, 0.0, 0.2));
    }
}
