//! Property-based tests for geometry invariants using the `proptest` crate.

use proptest::prelude::*;

use iso_kernel::{Plane, Point3d, Quat, Ray, Vec3};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Arbitrary 3D coordinate tuple in a reasonable floating-point range.
fn arb_point() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0, -1000.0f64..1000.0)
}

/// Arbitrary non-degenerate direction.
fn arb_direction() -> impl Strategy<Value = Vec3> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter("non-degenerate", |(x, y, z)| x * x + y * y + z * z > 1e-4)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. Distance symmetry
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn point_distance_symmetry(
        (ax, ay, az) in arb_point(),
        (bx, by, bz) in arb_point(),
    ) {
        let a = Point3d::new(ax, ay, az);
        let b = Point3d::new(bx, by, bz);
        prop_assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 2. Normalization never produces NaN
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn normalize_is_unit_or_zero((x, y, z) in (-1e-6f64..1e-6, -1e-6f64..1e-6, -1e-6f64..1e-6)) {
        let n = Vec3::new(x, y, z).normalize_or_zero();
        prop_assert!(n.x.is_finite() && n.y.is_finite() && n.z.is_finite());
        let len = n.length();
        prop_assert!(len == 0.0 || (len - 1.0).abs() < TOL, "length {}", len);
    }
}

// ---------------------------------------------------------------------------
// 3. Grid snapping lands on the grid and moves at most half a step per axis
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn grid_snap_is_close_and_on_grid((x, y, z) in arb_point()) {
        let p = Point3d::new(x, y, z);
        let s = p.snapped_to_grid(0.5);
        for (orig, snapped) in [(p.x, s.x), (p.y, s.y), (p.z, s.z)] {
            prop_assert!((orig - snapped).abs() <= 0.25 + TOL);
            let steps = snapped / 0.5;
            prop_assert!((steps - steps.round()).abs() < TOL);
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Rotation arc maps `from` onto `to`
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rotation_arc_maps_direction(from in arb_direction(), to in arb_direction()) {
        let q = Quat::from_rotation_arc(from, to);
        let rotated = q.rotate(from.normalize_or_zero());
        let expected = to.normalize_or_zero();
        prop_assert!((rotated - expected).length() < 1e-6,
            "rotated {:?} expected {:?}", rotated, expected);
    }
}

// ---------------------------------------------------------------------------
// 5. A ray that hits a plane hits it on the plane
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ray_plane_hit_lies_on_plane(
        (ox, oy, oz) in arb_point(),
        dir in arb_direction(),
        normal in arb_direction(),
    ) {
        let ray = Ray::new(Point3d::new(ox, oy, oz), dir);
        let plane = Plane::new(Point3d::new(1.0, 2.0, 3.0), normal);
        if let Some(hit) = ray.intersect_plane(&plane) {
            let scale = 1.0 + hit.to_vec3().length();
            prop_assert!(plane.signed_distance(&hit).abs() < 1e-9 * scale);
        }
    }
}
