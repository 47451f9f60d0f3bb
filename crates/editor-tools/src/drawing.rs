//! Interactive two-click pipe drawing.
//!
//! The tool picks a start point on the ground plane, then previews and
//! commits end points. Each commit chains: the new end becomes the next
//! start, so a polyline is drawn one click per segment.

use iso_kernel::{Plane, Point3d, Ray, Vec3};
use iso_types::PipeSegment;
use layout_engine::{EngineError, LayoutCommands};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::DrawingConfig;
use crate::snap::{endpoint_snap, grid_snap, SnapResult, SnapSource};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrawingPhase {
    Idle,
    AwaitingStart,
    AwaitingEnd { start: Point3d },
}

/// Constraint on where the end point may go relative to the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisLock {
    /// Keep the start's x; the end slides along Z on the start's level.
    X,
    /// Keep the start's x and z; the end moves vertically.
    Y,
    /// Keep the start's z; the end slides along X on the start's level.
    Z,
}

/// What a drawing event did.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Nothing changed (no plane hit, click on the pending start, tool idle).
    Ignored,
    StartPlaced(Point3d),
    Committed { id: Uuid, end: Point3d },
    /// The layout refused the segment; the phase is unchanged.
    Rejected(EngineError),
    /// The pending start was dropped; still drawing.
    StartCleared,
    /// Drawing mode ended.
    Exited,
}

/// The pointer state the tool reads on every event.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput<'a> {
    pub ray: Ray,
    pub camera_position: Point3d,
    pub pipes: &'a [PipeSegment],
}

#[derive(Debug, Clone)]
pub struct DrawingTool {
    phase: DrawingPhase,
    axis_lock: Option<AxisLock>,
    fixed_length: bool,
    preview: Option<SnapResult>,
    config: DrawingConfig,
}

impl DrawingTool {
    pub fn new(config: DrawingConfig) -> Self {
        Self {
            phase: DrawingPhase::Idle,
            axis_lock: None,
            fixed_length: false,
            preview: None,
            config,
        }
    }

    pub fn phase(&self) -> DrawingPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != DrawingPhase::Idle
    }

    pub fn start(&self) -> Option<Point3d> {
        match self.phase {
            DrawingPhase::AwaitingEnd { start } => Some(start),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<SnapResult> {
        self.preview
    }

    pub fn axis_lock(&self) -> Option<AxisLock> {
        self.axis_lock
    }

    pub fn set_axis_lock(&mut self, lock: Option<AxisLock>) {
        self.axis_lock = lock;
    }

    pub fn fixed_length(&self) -> bool {
        self.fixed_length
    }

    pub fn set_fixed_length(&mut self, enabled: bool) {
        self.fixed_length = enabled;
    }

    pub fn config(&self) -> &DrawingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DrawingConfig) {
        self.config = config;
    }

    /// Enter drawing mode. Has no effect when already drawing.
    pub fn begin(&mut self) {
        if self.phase == DrawingPhase::Idle {
            debug!("drawing started");
            self.phase = DrawingPhase::AwaitingStart;
        }
    }

    /// Force the tool back to idle, dropping any pending start or preview.
    pub fn reset(&mut self) {
        self.phase = DrawingPhase::Idle;
        self.preview = None;
    }

    /// The point a click would commit for this pointer, if any.
    pub fn candidate(&self, input: &PointerInput<'_>) -> Option<SnapResult> {
        if self.phase == DrawingPhase::Idle {
            return None;
        }
        if let Some(point) = endpoint_snap(&input.ray, input.pipes, self.config.snap_radius) {
            return Some(SnapResult {
                point,
                source: SnapSource::Endpoint,
            });
        }

        match self.phase {
            DrawingPhase::Idle => None,
            DrawingPhase::AwaitingStart => {
                let hit = input.ray.intersect_plane(&Plane::ground())?;
                Some(grid_snap(hit, self.config.grid_step))
            }
            DrawingPhase::AwaitingEnd { start } => {
                let raw = self.locked_point(&input.ray, start, input.camera_position)?;
                if self.fixed_length {
                    let dir = raw - start;
                    if let Some(unit) = dir.normalized() {
                        return Some(SnapResult {
                            point: start + unit * self.config.fixed_length,
                            source: SnapSource::FixedLength,
                        });
                    }
                    return Some(SnapResult {
                        point: raw,
                        source: SnapSource::Free,
                    });
                }
                Some(self.grid_snap_free(raw, start))
            }
        }
    }

    /// Grid-snap only the coordinates the axis lock leaves free; the rest
    /// keep the start's values, so an off-grid start stays on its lock.
    fn grid_snap_free(&self, raw: Point3d, start: Point3d) -> SnapResult {
        let snapped = grid_snap(raw, self.config.grid_step);
        let p = snapped.point;
        let point = match self.axis_lock {
            None => Point3d::new(p.x, start.y, p.z),
            Some(AxisLock::X) => Point3d::new(start.x, start.y, p.z),
            Some(AxisLock::Z) => Point3d::new(p.x, start.y, start.z),
            Some(AxisLock::Y) => Point3d::new(start.x, p.y, start.z),
        };
        SnapResult {
            point,
            source: snapped.source,
        }
    }

    /// Raw end point under the active axis lock, before any snapping.
    fn locked_point(&self, ray: &Ray, start: Point3d, camera: Point3d) -> Option<Point3d> {
        match self.axis_lock {
            None => ray.intersect_plane(&Plane::horizontal_through(start)),
            Some(AxisLock::X) => {
                let hit = ray.intersect_plane(&Plane::horizontal_through(start))?;
                Some(Point3d::new(start.x, start.y, hit.z))
            }
            Some(AxisLock::Z) => {
                let hit = ray.intersect_plane(&Plane::horizontal_through(start))?;
                Some(Point3d::new(hit.x, start.y, start.z))
            }
            Some(AxisLock::Y) => {
                let facing = (camera - start).horizontal();
                let normal = if facing.is_zero() { Vec3::Z } else { facing };
                let hit = ray.intersect_plane(&Plane::new(start, normal))?;
                Some(Point3d::new(start.x, hit.y, start.z))
            }
        }
    }

    /// Update the preview for a pointer move.
    pub fn pointer_move(&mut self, input: &PointerInput<'_>) -> Option<SnapResult> {
        self.preview = self.candidate(input);
        self.preview
    }

    /// Place a start point or commit a segment through `sink`.
    pub fn click(&mut self, ray: Ray, camera_position: Point3d, sink: &mut dyn LayoutCommands) -> DrawOutcome {
        let candidate = {
            let input = PointerInput {
                ray,
                camera_position,
                pipes: sink.pipes(),
            };
            self.candidate(&input)
        };
        let Some(candidate) = candidate else {
            return DrawOutcome::Ignored;
        };
        self.preview = Some(candidate);

        match self.phase {
            DrawingPhase::Idle => DrawOutcome::Ignored,
            DrawingPhase::AwaitingStart => {
                debug!(point = ?candidate.point.to_array(), source = ?candidate.source, "start placed");
                self.phase = DrawingPhase::AwaitingEnd {
                    start: candidate.point,
                };
                DrawOutcome::StartPlaced(candidate.point)
            }
            DrawingPhase::AwaitingEnd { start } => {
                let end = candidate.point;
                if start.distance_to(&end) < self.config.min_segment {
                    return DrawOutcome::Ignored;
                }
                match sink.add_pipe(start, end) {
                    Ok(id) => {
                        debug!(%id, end = ?end.to_array(), source = ?candidate.source, "segment committed");
                        self.phase = DrawingPhase::AwaitingEnd { start: end };
                        DrawOutcome::Committed { id, end }
                    }
                    Err(e) => {
                        warn!(error = %e, "segment rejected");
                        DrawOutcome::Rejected(e)
                    }
                }
            }
        }
    }

    /// Drop the pending start, or leave drawing mode when there is none.
    pub fn escape(&mut self) -> DrawOutcome {
        match self.phase {
            DrawingPhase::AwaitingEnd { .. } => {
                self.phase = DrawingPhase::AwaitingStart;
                self.preview = None;
                DrawOutcome::StartCleared
            }
            DrawingPhase::AwaitingStart => {
                self.reset();
                debug!("drawing exited");
                DrawOutcome::Exited
            }
            DrawingPhase::Idle => DrawOutcome::Ignored,
        }
    }
}

impl Default for DrawingTool {
    fn default() -> Self {
        Self::new(DrawingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn down_at(x: f64, y: f64, z: f64) -> Ray {
        Ray::new(Point3d::new(x, y + 10.0, z), Vec3::new(0.0, -1.0, 0.0))
    }

    fn input(ray: Ray) -> PointerInput<'static> {
        PointerInput {
            ray,
            camera_position: Point3d::new(0.0, 10.0, 10.0),
            pipes: &[],
        }
    }

    fn awaiting_end(start: Point3d) -> DrawingTool {
        let mut tool = DrawingTool::default();
        tool.phase = DrawingPhase::AwaitingEnd { start };
        tool
    }

    #[test]
    fn idle_tool_has_no_candidate() {
        let tool = DrawingTool::default();
        assert!(tool.candidate(&input(down_at(1.0, 0.0, 1.0))).is_none());
    }

    #[test]
    fn start_projects_to_ground_and_grid() {
        let mut tool = DrawingTool::default();
        tool.begin();
        let c = tool.pointer_move(&input(down_at(1.3, 0.0, -0.8))).unwrap();
        assert_eq!(c.point, Point3d::new(1.5, 0.0, -1.0));
        assert_eq!(c.source, SnapSource::Grid);
    }

    #[test]
    fn end_stays_on_start_height_without_lock() {
        let tool = awaiting_end(Point3d::new(0.0, 2.0, 0.0));
        let ray = Ray::through(Point3d::new(0.0, 12.0, 0.0), Point3d::new(1.0, 2.0, 1.0));
        let c = tool.candidate(&input(ray)).unwrap();
        assert_abs_diff_eq!(c.point, Point3d::new(1.0, 2.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn x_lock_keeps_start_x() {
        let mut tool = awaiting_end(Point3d::ORIGIN);
        tool.set_axis_lock(Some(AxisLock::X));
        let c = tool.candidate(&input(down_at(3.2, 0.0, 2.1))).unwrap();
        assert_eq!(c.point, Point3d::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn off_grid_start_keeps_locked_coordinates() {
        let start = Point3d::new(1.2, 0.3, 0.3);
        let mut tool = awaiting_end(start);
        tool.set_axis_lock(Some(AxisLock::X));
        let c = tool.candidate(&input(down_at(1.25, 0.3, 4.1))).unwrap();
        assert_eq!(c.source, SnapSource::Grid);
        assert_eq!(c.point.x, start.x);
        assert_eq!(c.point.y, start.y);
        assert_abs_diff_eq!(c.point.z, 4.0, epsilon = 1e-12);

        tool.set_axis_lock(Some(AxisLock::Z));
        let c = tool.candidate(&input(down_at(2.3, 0.3, 4.1))).unwrap();
        assert_eq!((c.point.y, c.point.z), (start.y, start.z));
        assert_abs_diff_eq!(c.point.x, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn off_grid_start_height_survives_grid() {
        let start = Point3d::new(1.2, 0.3, 0.3);
        let tool = awaiting_end(start);
        let c = tool.candidate(&input(down_at(2.3, 0.3, 2.2))).unwrap();
        assert_eq!(c.point.y, start.y);
        assert_abs_diff_eq!(c.point, Point3d::new(2.5, 0.3, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn z_lock_keeps_start_z() {
        let mut tool = awaiting_end(Point3d::ORIGIN);
        tool.set_axis_lock(Some(AxisLock::Z));
        let c = tool.candidate(&input(down_at(3.2, 0.0, 2.1))).unwrap();
        assert_eq!(c.point, Point3d::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn y_lock_moves_vertically_on_camera_facing_plane() {
        let mut tool = awaiting_end(Point3d::ORIGIN);
        tool.set_axis_lock(Some(AxisLock::Y));
        // Camera on +Z looks horizontally at a point 3 units up.
        let camera = Point3d::new(0.0, 3.0, 10.0);
        let ray = Ray::through(camera, Point3d::new(0.4, 3.0, 0.0));
        let c = tool
            .candidate(&PointerInput {
                ray,
                camera_position: camera,
                pipes: &[],
            })
            .unwrap();
        assert_eq!(c.point, Point3d::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn y_lock_with_overhead_camera_falls_back() {
        let mut tool = awaiting_end(Point3d::ORIGIN);
        tool.set_axis_lock(Some(AxisLock::Y));
        let camera = Point3d::new(0.0, 10.0, 0.0);
        let ray = Ray::through(Point3d::new(0.0, 2.0, 5.0), Point3d::new(0.0, 2.0, 0.0));
        let c = tool
            .candidate(&PointerInput {
                ray,
                camera_position: camera,
                pipes: &[],
            })
            .unwrap();
        assert_eq!(c.point, Point3d::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn fixed_length_forces_magnitude() {
        let mut tool = awaiting_end(Point3d::ORIGIN);
        tool.set_fixed_length(true);
        let c = tool.candidate(&input(down_at(1.0, 0.0, 0.2))).unwrap();
        assert_eq!(c.source, SnapSource::FixedLength);
        assert_abs_diff_eq!(c.point.distance_to(&Point3d::ORIGIN), 6.0, epsilon = 1e-9);
        assert!(c.point.z > 0.0);
    }

    #[test]
    fn endpoint_snap_overrides_fixed_length() {
        let pipes = vec![PipeSegment::new(
            "P".to_string(),
            Point3d::new(5.0, 0.0, 0.0),
            Point3d::new(5.0, 0.0, 5.0),
            0.2,
        )];
        let mut tool = awaiting_end(Point3d::ORIGIN);
        tool.set_fixed_length(true);
        let c = tool
            .candidate(&PointerInput {
                ray: down_at(5.2, 0.0, 0.1),
                camera_position: Point3d::new(0.0, 10.0, 10.0),
                pipes: &pipes,
            })
            .unwrap();
        assert_eq!(c.point, Point3d::new(5.0, 0.0, 0.0));
        assert_eq!(c.source, SnapSource::Endpoint);
    }

    #[test]
    fn escape_steps_back_then_exits() {
        let mut tool = awaiting_end(Point3d::ORIGIN);
        assert_eq!(tool.escape(), DrawOutcome::StartCleared);
        assert_eq!(tool.phase(), DrawingPhase::AwaitingStart);
        assert_eq!(tool.escape(), DrawOutcome::Exited);
        assert_eq!(tool.phase(), DrawingPhase::Idle);
        assert_eq!(tool.escape(), DrawOutcome::Ignored);
    }

    #[test]
    fn ray_missing_plane_gives_no_candidate() {
        let mut tool = DrawingTool::default();
        tool.begin();
        let up = Ray::new(Point3d::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(tool.pointer_move(&input(up)).is_none());
        assert!(tool.preview().is_none());
    }
}
