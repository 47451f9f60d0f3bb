use std::collections::BTreeMap;
use std::fmt;

use iso_kernel::{Point3d, Vec3};
use iso_types::PipeSegment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quantized endpoint coordinates. Two endpoints belong to the same
/// junction exactly when their keys are equal.
///
/// Coordinates are stored as integers scaled by `10^decimals`, so `-0.0004`
/// and `0.0004` both land on `0` and never produce a distinct "negative
/// zero" key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JunctionKey {
    pub coords: [i64; 3],
    pub decimals: u32,
}

impl JunctionKey {
    pub fn quantize(point: &Point3d, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        let q = |v: f64| (v * scale).round() as i64;
        Self {
            coords: [q(point.x), q(point.y), q(point.z)],
            decimals,
        }
    }
}

impl fmt::Display for JunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10f64.powi(self.decimals as i32);
        let d = self.decimals as usize;
        let [x, y, z] = self.coords;
        write!(
            f,
            "{:.d$},{:.d$},{:.d$}",
            x as f64 / scale,
            y as f64 / scale,
            z as f64 / scale,
        )
    }
}

/// One pipe end touching a junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionEntry {
    pub pipe_id: Uuid,
    /// Position of the pipe in the list the junction map was built from.
    pub pipe_index: usize,
    /// Unit vector pointing from the junction along the pipe. Zero for a
    /// degenerate pipe.
    pub outward: Vec3,
    pub is_start: bool,
}

/// All pipe ends sharing one quantized location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionNode {
    pub key: JunctionKey,
    /// The first endpoint seen for this key.
    pub point: Point3d,
    pub entries: Vec<JunctionEntry>,
}

impl JunctionNode {
    pub fn degree(&self) -> usize {
        self.entries.len()
    }
}

/// Junction map ordered by key.
pub type JunctionMap = BTreeMap<JunctionKey, JunctionNode>;

/// Build the junction map for a pipe list.
///
/// Entries follow pipe order, start end before end end, so the result is a
/// pure function of the input ordering.
pub fn resolve(pipes: &[PipeSegment], decimals: u32) -> JunctionMap {
    let mut map = JunctionMap::new();

    for (pipe_index, pipe) in pipes.iter().enumerate() {
        let along = pipe.end - pipe.start;
        let ends = [
            (pipe.start, along.normalize_or_zero(), true),
            (pipe.end, (-along).normalize_or_zero(), false),
        ];

        for (point, outward, is_start) in ends {
            let key = JunctionKey::quantize(&point, decimals);
            map.entry(key)
                .or_insert_with(|| JunctionNode {
                    key,
                    point,
                    entries: Vec::new(),
                })
                .entries
                .push(JunctionEntry {
                    pipe_id: pipe.id,
                    pipe_index,
                    outward,
                    is_start,
                });
        }
    }

    map
}
