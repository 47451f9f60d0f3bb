use std::collections::HashMap;

use iso_kernel::Point3d;
use iso_types::PipeSegment;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::classify::{classify, Fitting, JunctionKind};
use crate::resolve::{resolve, JunctionKey, JunctionNode};
use crate::types::TopologyConfig;

/// Accumulated trims for both ends of one pipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Trim {
    pub start: f64,
    pub end: f64,
}

/// The rendered extent of a pipe once fittings have taken their share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleSpan {
    pub start: Point3d,
    pub end: Point3d,
    /// Never below the configured minimum visible length.
    pub length: f64,
}

/// Fitting counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittingCounts {
    pub open_ends: usize,
    pub straights: usize,
    pub elbows: usize,
    pub multis: usize,
}

/// Derived connectivity and fitting geometry for one pipe list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Junctions in key order.
    pub junctions: Vec<JunctionNode>,
    /// One fitting per junction, same order as `junctions`.
    pub fittings: Vec<Fitting>,
    pub trims: HashMap<Uuid, Trim>,
    pub min_visible_length: f64,
}

impl Topology {
    /// Resolve and classify every junction of `pipes`.
    #[instrument(skip(pipes, config), fields(pipe_count = pipes.len()))]
    pub fn build(pipes: &[PipeSegment], config: &TopologyConfig) -> Self {
        let map = resolve(pipes, config.key_decimals);

        let mut trims: HashMap<Uuid, Trim> = pipes.iter().map(|p| (p.id, Trim::default())).collect();
        let mut fittings = Vec::with_capacity(map.len());

        for node in map.values() {
            let classification = classify(node, pipes, config);
            for cut in classification.trims {
                let trim = trims.entry(cut.pipe_id).or_default();
                if cut.is_start {
                    trim.start = cut.amount;
                } else {
                    trim.end = cut.amount;
                }
            }
            fittings.push(classification.fitting);
        }

        let topology = Self {
            junctions: map.into_values().collect(),
            fittings,
            trims,
            min_visible_length: config.min_visible_length,
        };

        let counts = topology.counts();
        info!(
            junctions = topology.junctions.len(),
            open_ends = counts.open_ends,
            straights = counts.straights,
            elbows = counts.elbows,
            multis = counts.multis,
            "topology rebuilt"
        );

        topology
    }

    pub fn counts(&self) -> FittingCounts {
        let mut counts = FittingCounts::default();
        for f in &self.fittings {
            match f.kind() {
                JunctionKind::OpenEnd => counts.open_ends += 1,
                JunctionKind::Straight => counts.straights += 1,
                JunctionKind::Elbow => counts.elbows += 1,
                JunctionKind::Multi => counts.multis += 1,
            }
        }
        counts
    }

    pub fn trim(&self, pipe_id: Uuid) -> Trim {
        self.trims.get(&pipe_id).copied().unwrap_or_default()
    }

    pub fn fitting_at(&self, key: &JunctionKey) -> Option<&Fitting> {
        self.fittings.iter().find(|f| f.key == *key)
    }

    pub fn junction_at(&self, key: &JunctionKey) -> Option<&JunctionNode> {
        self.junctions
            .binary_search_by(|j| j.key.cmp(key))
            .ok()
            .map(|i| &self.junctions[i])
    }

    /// The rendered extent of `pipe`, centered on the trimmed interval.
    pub fn visible_span(&self, pipe: &PipeSegment) -> VisibleSpan {
        let trim = self.trim(pipe.id);
        let dir = pipe.direction();
        let raw = pipe.length() - trim.start - trim.end;
        let length = raw.max(self.min_visible_length);
        let center = pipe.start + dir * (trim.start + raw * 0.5);
        VisibleSpan {
            start: center - dir * (length * 0.5),
            end: center + dir * (length * 0.5),
            length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Metadata, Subscriber};

    fn pipe(a: [f64; 3], b: [f64; 3]) -> PipeSegment {
        PipeSegment::new(
            "P".to_string(),
            Point3d::from_array(a),
            Point3d::from_array(b),
            0.2,
        )
    }

    #[test]
    fn l_shape_has_one_elbow_and_two_open_ends() {
        let pipes = vec![
            pipe([0.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
            pipe([2.0, 0.0, 0.0], [2.0, 0.0, 2.0]),
        ];
        let topo = Topology::build(&pipes, &TopologyConfig::default());
        let counts = topo.counts();
        assert_eq!(counts.elbows, 1);
        assert_eq!(counts.open_ends, 2);
        assert_eq!(topo.junctions.len(), topo.fittings.len());

        assert_abs_diff_eq!(topo.trim(pipes[0].id).end, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(topo.trim(pipes[0].id).start, 0.0);
        assert_abs_diff_eq!(topo.trim(pipes[1].id).start, 0.3, epsilon = 1e-12);

        let span = topo.visible_span(&pipes[0]);
        assert_abs_diff_eq!(span.length, 1.7, epsilon = 1e-12);
        assert_abs_diff_eq!(span.start, Point3d::ORIGIN, epsilon = 1e-12);
        assert_abs_diff_eq!(span.end, Point3d::new(1.7, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(pipes[0].length(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn overlong_trims_floor_to_min_visible_length() {
        let pipes = vec![
            pipe([0.0, 0.0, 0.0], [0.4, 0.0, 0.0]),
            pipe([0.4, 0.0, 0.0], [0.4, 0.0, 3.0]),
            pipe([0.0, 0.0, 0.0], [0.0, 0.0, -3.0]),
        ];
        let topo = Topology::build(&pipes, &TopologyConfig::default());
        let span = topo.visible_span(&pipes[0]);
        assert_abs_diff_eq!(span.length, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(span.start.distance_to(&span.end), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn fitting_lookup_by_key() {
        let pipes = vec![
            pipe([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            pipe([1.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
        ];
        let topo = Topology::build(&pipes, &TopologyConfig::default());
        let key = JunctionKey::quantize(&Point3d::new(1.0, 0.0, 0.0), 3);
        let fitting = topo.fitting_at(&key).unwrap();
        assert_eq!(fitting.kind(), JunctionKind::Straight);
        assert_eq!(topo.junction_at(&key).unwrap().degree(), 2);
        assert!(topo.fitting_at(&JunctionKey::quantize(&Point3d::new(9.0, 9.0, 9.0), 3)).is_none());
    }

    /// Counts events and hands out span ids; nothing is stored.
    struct CountingSubscriber {
        events: Arc<AtomicUsize>,
        next_span: AtomicU64,
    }

    impl Subscriber for CountingSubscriber {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(self.next_span.fetch_add(1, Ordering::Relaxed))
        }

        fn record(&self, _: &Id, _: &Record<'_>) {}

        fn record_follows_from(&self, _: &Id, _: &Id) {}

        fn event(&self, _: &Event<'_>) {
            self.events.fetch_add(1, Ordering::Relaxed);
        }

        fn enter(&self, _: &Id) {}

        fn exit(&self, _: &Id) {}
    }

    #[test]
    fn tracing_does_not_affect_topology() {
        let pipes = vec![
            pipe([0.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
            pipe([2.0, 0.0, 0.0], [2.0, 0.0, 2.0]),
            pipe([2.0, 0.0, 2.0], [2.0, 0.0, 4.0]),
            pipe([2.0, 0.0, 2.0], [4.0, 0.0, 2.0]),
            pipe([0.0, 0.0, 0.0], [-2.0, 0.0, 0.0]),
        ];
        let config = TopologyConfig::default();

        let events = Arc::new(AtomicUsize::new(0));
        let subscriber = CountingSubscriber {
            events: Arc::clone(&events),
            next_span: AtomicU64::new(1),
        };
        let traced = tracing::subscriber::with_default(subscriber, || Topology::build(&pipes, &config));
        assert!(events.load(Ordering::Relaxed) >= 1);

        // Same pipeline by hand through the uninstrumented helpers.
        let map = resolve(&pipes, config.key_decimals);
        let mut trims: HashMap<Uuid, Trim> = pipes.iter().map(|p| (p.id, Trim::default())).collect();
        let mut fittings = Vec::new();
        for node in map.values() {
            let c = classify(node, &pipes, &config);
            for cut in c.trims {
                let trim = trims.get_mut(&cut.pipe_id).unwrap();
                if cut.is_start {
                    trim.start = cut.amount;
                } else {
                    trim.end = cut.amount;
                }
            }
            fittings.push(c.fitting);
        }
        let expected = Topology {
            junctions: map.into_values().collect(),
            fittings,
            trims,
            min_visible_length: config.min_visible_length,
        };

        assert_eq!(traced, expected);
        assert_eq!(traced.counts().elbows, 1);
        assert_eq!(traced.counts().multis, 1);
        assert_eq!(traced.counts().straights, 1);
        assert_eq!(traced, Topology::build(&pipes, &config));
    }

    #[test]
    fn empty_layout_has_empty_topology() {
        let topo = Topology::build(&[], &TopologyConfig::default());
        assert!(topo.junctions.is_empty());
        assert_eq!(topo.counts(), FittingCounts::default());
    }
}
