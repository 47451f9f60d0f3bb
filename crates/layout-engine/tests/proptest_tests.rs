//! Property-based tests for connectivity and layout invariants.

use proptest::prelude::*;

use iso_kernel::{Point3d, Vec3};
use iso_types::{PipePatch, PipeSegment};
use layout_engine::{resolve, Layout, Topology, TopologyConfig};

/// Endpoints on a coarse lattice so shared junctions are common.
fn arb_lattice_point() -> impl Strategy<Value = Point3d> {
    (-3i32..3, -1i32..2, -3i32..3).prop_map(|(x, y, z)| Point3d::new(x as f64, y as f64, z as f64))
}

fn arb_pipes() -> impl Strategy<Value = Vec<PipeSegment>> {
    prop::collection::vec((arb_lattice_point(), arb_lattice_point()), 0..12).prop_map(|ends| {
        ends.into_iter()
            .map(|(a, b)| PipeSegment::new("P".to_string(), a, b, 0.2))
            .collect()
    })
}

fn arb_point() -> impl Strategy<Value = Point3d> {
    (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0)
        .prop_map(|(x, y, z)| Point3d::new(x, y, z))
}

proptest! {
    #[test]
    fn resolution_is_idempotent(pipes in arb_pipes()) {
        let first = resolve(&pipes, 3);
        let second = resolve(&pipes, 3);
        prop_assert_eq!(&first, &second);

        let config = TopologyConfig::default();
        prop_assert_eq!(Topology::build(&pipes, &config), Topology::build(&pipes, &config));
    }

    #[test]
    fn every_endpoint_lands_in_exactly_one_junction(pipes in arb_pipes()) {
        let map = resolve(&pipes, 3);
        let entries: usize = map.values().map(|n| n.degree()).sum();
        prop_assert_eq!(entries, pipes.len() * 2);
        for node in map.values() {
            for e in &node.entries {
                let len = e.outward.length();
                prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn visible_length_never_below_floor(pipes in arb_pipes()) {
        let config = TopologyConfig::default();
        let topo = Topology::build(&pipes, &config);
        for pipe in &pipes {
            let span = topo.visible_span(pipe);
            prop_assert!(span.length >= config.min_visible_length);
            prop_assert!(span.length.is_finite());
        }
    }

    #[test]
    fn length_tracks_endpoints_after_edits(
        a in arb_point(),
        b in arb_point(),
        new_end in arb_point(),
        delta in (-5.0f64..5.0, -5.0f64..5.0, -5.0f64..5.0),
    ) {
        prop_assume!(a.distance_to(&b) > 1e-6 && a.distance_to(&new_end) > 1e-6);
        let mut layout = Layout::new();
        let id = layout.add_pipe(a, b).unwrap();

        let patch = PipePatch { end: Some(new_end), ..PipePatch::default() };
        layout.update_pipe(id, &patch).unwrap();
        let pipe = layout.pipe(id).unwrap();
        prop_assert!((pipe.length() - pipe.start.distance_to(&pipe.end)).abs() < 1e-9);

        layout.translate_entities(&[id], Vec3::new(delta.0, delta.1, delta.2));
        let pipe = layout.pipe(id).unwrap();
        prop_assert!((pipe.length() - pipe.start.distance_to(&pipe.end)).abs() < 1e-9);
    }
}
