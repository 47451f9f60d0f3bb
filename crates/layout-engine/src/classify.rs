use iso_kernel::{Point3d, Quat, Vec3};
use iso_types::{bottleneck_pipe, joint_status, PipeSegment, PipeStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resolve::{JunctionKey, JunctionNode};
use crate::types::TopologyConfig;

/// Coarse junction classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JunctionKind {
    OpenEnd,
    Straight,
    Elbow,
    Multi,
}

/// Quadratic Bézier through the junction: from `start` (a point on the
/// first pipe) to `end` (on the second), pulled by `control` at the corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElbowCurve {
    pub start: Point3d,
    pub control: Point3d,
    pub end: Point3d,
}

impl ElbowCurve {
    pub fn point_at(&self, t: f64) -> Point3d {
        let t = t.clamp(0.0, 1.0);
        let a = self.start.lerp(&self.control, t);
        let b = self.control.lerp(&self.end, t);
        a.lerp(&b, t)
    }

    /// `segments + 1` evenly spaced points from start to end.
    pub fn sample(&self, segments: usize) -> Vec<Point3d> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f64 / segments as f64))
            .collect()
    }
}

/// Fitting geometry derived for one junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FittingShape {
    OpenEnd,
    Straight {
        /// Rotates a +Y ring onto the shared axis.
        weld_rotation: Quat,
        axis: Vec3,
    },
    Elbow {
        bend_radius: f64,
        tube_radius: f64,
        curve: ElbowCurve,
    },
    Multi {
        sphere_radius: f64,
    },
}

impl FittingShape {
    pub fn kind(&self) -> JunctionKind {
        match self {
            FittingShape::OpenEnd => JunctionKind::OpenEnd,
            FittingShape::Straight { .. } => JunctionKind::Straight,
            FittingShape::Elbow { .. } => JunctionKind::Elbow,
            FittingShape::Multi { .. } => JunctionKind::Multi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fitting {
    pub key: JunctionKey,
    pub point: Point3d,
    pub shape: FittingShape,
    /// Pipes meeting here, in junction entry order.
    pub pipes: Vec<Uuid>,
    /// Joint readiness; only two-pipe joints carry one.
    pub status: Option<PipeStatus>,
    /// The pipe holding back progress at a two-pipe joint.
    pub bottleneck: Option<Uuid>,
}

impl Fitting {
    pub fn kind(&self) -> JunctionKind {
        self.shape.kind()
    }
}

/// Distance cut from one end of a pipe to make room for a fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimCut {
    pub pipe_id: Uuid,
    pub pipe_index: usize,
    pub is_start: bool,
    pub amount: f64,
}

/// Classification of one junction plus the trims it imposes.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub fitting: Fitting,
    pub trims: Vec<TrimCut>,
}

/// Classify a junction and compute the trims it imposes on its pipes.
///
/// `pipes` must be the list the node was resolved from. An entry whose
/// index falls outside `pipes` leaves the junction as an untrimmed open end.
pub fn classify(node: &JunctionNode, pipes: &[PipeSegment], config: &TopologyConfig) -> Classification {
    let mut fitting = Fitting {
        key: node.key,
        point: node.point,
        shape: FittingShape::OpenEnd,
        pipes: node.entries.iter().map(|e| e.pipe_id).collect(),
        status: None,
        bottleneck: None,
    };
    let mut trims = Vec::new();

    match node.entries.as_slice() {
        [] | [_] => {}
        [e1, e2] => {
            let (Some(p1), Some(p2)) = (pipes.get(e1.pipe_index), pipes.get(e2.pipe_index)) else {
                return Classification { fitting, trims };
            };
            fitting.status = Some(joint_status(p1.status.level(), p2.status.level()));
            fitting.bottleneck = Some(bottleneck_pipe(p1, p2).id);

            let degenerate = e1.outward.is_zero() || e2.outward.is_zero();
            let dot = e1.outward.dot(&e2.outward);

            if degenerate || dot < config.straight_dot {
                let axis = if e1.outward.is_zero() { e2.outward } else { e1.outward };
                fitting.shape = FittingShape::Straight {
                    weld_rotation: Quat::from_up_to(axis),
                    axis,
                };
            } else {
                let r = config.bend_radius(p1.diameter, p2.diameter);
                for e in [e1, e2] {
                    trims.push(TrimCut {
                        pipe_id: e.pipe_id,
                        pipe_index: e.pipe_index,
                        is_start: e.is_start,
                        amount: r,
                    });
                }
                fitting.shape = FittingShape::Elbow {
                    bend_radius: r,
                    tube_radius: p1.radius(),
                    curve: ElbowCurve {
                        start: node.point + e1.outward * r,
                        control: node.point,
                        end: node.point + e2.outward * r,
                    },
                };
            }
        }
        [first, ..] => {
            if let Some(p) = pipes.get(first.pipe_index) {
                fitting.shape = FittingShape::Multi {
                    sphere_radius: p.radius(),
                };
            }
        }
    }

    Classification { fitting, trims }
}
