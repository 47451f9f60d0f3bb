use std::fmt;

use editor_tools::{
    entities_in_rect, DrawOutcome, DrawingConfig, DrawingTool, GroupTransform, MarqueeTracker,
    PointerInput, Selection, SnapResult, Viewport,
};
use iso_kernel::{Camera, Point3d, Ray, Vec3};
use layout_engine::{EngineError, JunctionKey, Layout, TopologyConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::messages::Pointer;

/// Runtime configuration for the whole editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub topology: TopologyConfig,
    pub drawing: DrawingConfig,
}

/// Which interactive tool owns pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Select,
    Draw,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Select => write!(f, "select"),
            InteractionMode::Draw => write!(f, "draw"),
        }
    }
}

/// Errors surfaced by the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    #[error("cannot start {requested} while in {active} mode")]
    ModeConflict {
        active: InteractionMode,
        requested: String,
    },

    #[error("no camera set")]
    NoCamera,
}

/// The editor state behind the bridge.
///
/// Owns the canonical layout plus every interactive tool, and coordinates
/// which tool is active.
#[derive(Debug)]
pub struct EditorState {
    pub layout: Layout,
    pub drawing: DrawingTool,
    pub selection: Selection,
    pub group: GroupTransform,
    pub marquee: Option<MarqueeTracker>,
    pub mode: InteractionMode,
    pub camera: Option<Camera>,
    pub viewport: Viewport,
    pub config: EditorConfig,
}

impl EditorState {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            layout: Layout::with_config(config.topology),
            drawing: DrawingTool::new(config.drawing),
            selection: Selection::new(),
            group: GroupTransform::new(),
            marquee: None,
            mode: InteractionMode::Select,
            camera: None,
            viewport: Viewport::default(),
            config,
        }
    }

    /// Replace the configuration; rebuilds topology.
    pub fn configure(&mut self, config: EditorConfig) {
        self.layout.set_config(config.topology);
        self.drawing.set_config(config.drawing);
        self.config = config;
    }

    pub fn is_drawing(&self) -> bool {
        self.mode == InteractionMode::Draw
    }

    // -- Mode coordination --

    /// Enter draw mode. A marquee in progress is dropped.
    pub fn start_drawing(&mut self) {
        if self.marquee.take().is_some() {
            debug!("marquee cancelled by draw mode");
        }
        self.mode = InteractionMode::Draw;
        self.drawing.begin();
    }

    /// Leave draw mode unconditionally.
    pub fn exit_drawing(&mut self) {
        self.drawing.reset();
        self.mode = InteractionMode::Select;
    }

    pub fn begin_marquee(&mut self, px: (f64, f64)) -> Result<(), BridgeError> {
        if self.is_drawing() {
            return Err(BridgeError::ModeConflict {
                active: self.mode,
                requested: "marquee".to_string(),
            });
        }
        self.marquee = Some(MarqueeTracker::new(px));
        Ok(())
    }

    pub fn update_marquee(&mut self, px: (f64, f64)) {
        if let Some(m) = self.marquee.as_mut() {
            m.update(px);
        }
    }

    /// Finish the marquee and replace the selection with whatever it
    /// encloses. Returns whether the selection changed; a drag below the
    /// pixel threshold is a click-through and selects nothing.
    pub fn end_marquee(&mut self, px: (f64, f64)) -> Result<bool, BridgeError> {
        let Some(mut marquee) = self.marquee.take() else {
            return Ok(false);
        };
        marquee.update(px);
        if marquee.is_click(self.config.drawing.marquee_min_px) {
            return Ok(false);
        }
        let camera = self.camera.ok_or(BridgeError::NoCamera)?;
        let rect = marquee.ndc_rect(&self.viewport);
        let ids = entities_in_rect(&rect, &camera, self.layout.pipes(), self.layout.annotations());
        debug!(count = ids.len(), "marquee selection");
        Ok(self.apply_selection(|sel| sel.set(ids)))
    }

    // -- Drawing --

    /// Resolve a pointer into a world ray. `Ok(None)` when NDC coordinates
    /// cannot be unprojected.
    pub fn pointer_ray(&self, pointer: &Pointer) -> Result<Option<Ray>, BridgeError> {
        match *pointer {
            Pointer::Ray { origin, direction } => Ok(Some(Ray::new(origin, direction))),
            Pointer::Ndc { x, y } => {
                let camera = self.camera.ok_or(BridgeError::NoCamera)?;
                Ok(camera.ray_through_ndc(x, y))
            }
        }
    }

    fn camera_position(&self, ray: &Ray) -> Point3d {
        self.camera.map_or(ray.origin, |c| c.position)
    }

    pub fn pointer_move(&mut self, pointer: &Pointer) -> Result<Option<SnapResult>, BridgeError> {
        let Some(ray) = self.pointer_ray(pointer)? else {
            return Ok(None);
        };
        let input = PointerInput {
            ray,
            camera_position: self.camera_position(&ray),
            pipes: self.layout.pipes(),
        };
        Ok(self.drawing.pointer_move(&input))
    }

    pub fn click(&mut self, pointer: &Pointer) -> Result<DrawOutcome, BridgeError> {
        let Some(ray) = self.pointer_ray(pointer)? else {
            return Ok(DrawOutcome::Ignored);
        };
        let eye = self.camera_position(&ray);
        let outcome = self.drawing.click(ray, eye, &mut self.layout);
        if let DrawOutcome::Committed { .. } = outcome {
            self.after_layout_change();
        }
        Ok(outcome)
    }

    /// Step the drawing tool back. In select mode this only drops a marquee.
    pub fn escape(&mut self) -> DrawOutcome {
        if self.is_drawing() {
            let outcome = self.drawing.escape();
            if outcome == DrawOutcome::Exited {
                self.mode = InteractionMode::Select;
            }
            return outcome;
        }
        self.marquee = None;
        DrawOutcome::Ignored
    }

    // -- Selection --

    fn apply_selection(&mut self, f: impl FnOnce(&mut Selection) -> bool) -> bool {
        let changed = f(&mut self.selection);
        if changed {
            self.refresh_group();
        }
        changed
    }

    fn refresh_group(&mut self) {
        self.group
            .refresh(self.selection.ids(), self.layout.pipes(), self.layout.annotations());
    }

    pub fn select_entity(&mut self, id: Option<Uuid>, multi: bool) -> bool {
        if let Some(id) = id {
            if !self.layout.contains(id) {
                warn!(%id, "select ignored: unknown id");
                return false;
            }
        }
        self.apply_selection(|sel| sel.click(id, multi))
    }

    pub fn set_selection(&mut self, ids: Vec<Uuid>) -> bool {
        let layout = &self.layout;
        let existing: Vec<Uuid> = ids.into_iter().filter(|id| layout.contains(*id)).collect();
        self.apply_selection(|sel| sel.set(existing))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.apply_selection(Selection::clear)
    }

    /// Select the pipe holding back the joint at `key`. Fittings without a
    /// bottleneck leave the selection alone.
    pub fn click_fitting(&mut self, key: &JunctionKey) -> bool {
        let bottleneck = self.layout.topology().fitting_at(key).and_then(|f| f.bottleneck);
        match bottleneck {
            Some(id) => {
                debug!(%id, %key, "fitting click selects bottleneck");
                self.apply_selection(|sel| sel.select_single(Some(id), false))
            }
            None => false,
        }
    }

    pub fn hover(&mut self, id: Option<Uuid>) -> bool {
        self.selection.set_hovered(id)
    }

    /// Move the transform handle; the selection follows by the same delta.
    pub fn drag_handle(&mut self, position: Point3d) -> Option<Vec3> {
        self.group.drag_to(position, &mut self.layout)
    }

    pub fn end_drag(&mut self) {
        self.layout.end_translate();
    }

    pub fn delete_selection(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        let removed = self.layout.delete_entities(&ids);
        self.after_layout_change();
        removed
    }

    /// Prune stale selection ids and re-anchor the transform handle after a
    /// mutation that did not come from the handle itself.
    pub fn after_layout_change(&mut self) {
        let layout = &self.layout;
        self.selection.retain_existing(|id| layout.contains(id));
        if self.selection.hovered().is_some_and(|id| !layout.contains(id)) {
            self.selection.set_hovered(None);
        }
        self.refresh_group();
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
