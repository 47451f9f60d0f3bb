use iso_kernel::{Point3d, Vec3};
use iso_types::{Annotation, PipeSegment};
use layout_engine::LayoutCommands;
use tracing::debug;
use uuid::Uuid;

/// Unweighted average of the selected points: both ends of every selected
/// pipe and the position of every selected annotation.
pub fn selection_centroid(ids: &[Uuid], pipes: &[PipeSegment], annotations: &[Annotation]) -> Option<Point3d> {
    let pipe_points = pipes
        .iter()
        .filter(|p| ids.contains(&p.id))
        .flat_map(|p| [p.start, p.end]);
    let annotation_points = annotations
        .iter()
        .filter(|a| ids.contains(&a.id))
        .map(|a| a.position);
    let points: Vec<Point3d> = pipe_points.chain(annotation_points).collect();
    Point3d::centroid(&points)
}

/// Drives a group move from a transform handle.
///
/// The handle starts at the selection centroid and then follows the drag
/// incrementally; each tick emits the delta since the previous tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTransform {
    ids: Vec<Uuid>,
    handle: Option<Point3d>,
}

impl GroupTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Option<Point3d> {
        self.handle
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    /// Re-anchor on a new selection. Call only when the selection changes.
    pub fn refresh(&mut self, ids: &[Uuid], pipes: &[PipeSegment], annotations: &[Annotation]) {
        self.ids = ids.to_vec();
        self.handle = selection_centroid(ids, pipes, annotations);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.handle = None;
    }

    /// Move the handle to `position` and forward the delta to `sink`.
    /// Returns the delta applied, or `None` without a handle or movement.
    pub fn drag_to(&mut self, position: Point3d, sink: &mut dyn LayoutCommands) -> Option<Vec3> {
        let handle = self.handle?;
        let delta = position - handle;
        if delta.is_zero() {
            return None;
        }
        self.handle = Some(position);
        debug!(delta = ?delta.to_array(), count = self.ids.len(), "group drag");
        sink.translate_entities(&self.ids, delta);
        Some(delta)
    }
}
