//! LayoutBuilder: a fluent API for scripting editor sessions in tests.
//!
//! Wraps `editor_bridge::dispatch()` to test the real dispatch path, not a simulation.
//! Pipes and annotations are addressed by string names instead of UUIDs.

use std::collections::HashMap;

use editor_bridge::messages::*;
use editor_bridge::{EditorConfig, EditorState};
use iso_kernel::{Camera, Point3d, Vec3};
use iso_types::{Annotation, PipePatch, PipeSegment, PipeStatus};
use layout_engine::{JunctionKey, Topology};
use uuid::Uuid;

use crate::helpers::*;

/// A fluent builder for scripting and verifying pipe layouts in tests.
#[derive(Debug)]
pub struct LayoutBuilder {
    pub state: EditorState,
    named: HashMap<String, Uuid>,
    history: Vec<(String, String)>,
    auto_check: bool,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            state: EditorState::with_config(config),
            named: HashMap::new(),
            history: Vec::new(),
            auto_check: false,
        }
    }

    /// Enable auto-checking: after every message, verify every pipe still
    /// satisfies `length == distance(start, end)`.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    // ── Raw dispatch ────────────────────────────────────────────────────

    /// Dispatch one message. An `Error` response becomes `DispatchError`.
    pub fn send(&mut self, msg: UiToEditor) -> Result<Vec<EditorToUi>, HarnessError> {
        let msg_type = message_type(&msg);
        let responses = editor_bridge::dispatch(&mut self.state, msg);

        let summary: Vec<&str> = responses.iter().map(response_type).collect();
        self.history.push((msg_type, summary.join(",")));

        if let Some(message) = responses.iter().find_map(|r| match r {
            EditorToUi::Error { message } => Some(message.clone()),
            _ => None,
        }) {
            return Err(HarnessError::DispatchError { message });
        }
        if self.auto_check {
            crate::assertions::assert_length_invariant(self.state.layout.pipes(), &self.last_step())?;
        }
        Ok(responses)
    }

    fn last_step(&self) -> String {
        self.history
            .last()
            .map(|(m, _)| m.clone())
            .unwrap_or_default()
    }

    // ── Building ────────────────────────────────────────────────────────

    /// Import one pipe under `name`.
    pub fn pipe(&mut self, name: &str, start: [f64; 3], end: [f64; 3]) -> Result<Uuid, HarnessError> {
        self.check_name_available(name)?;
        let seg = segment(name, start, end);
        let id = seg.id;
        self.send(UiToEditor::ImportPipes { pipes: vec![seg] })?;
        if self.state.layout.pipe(id).is_none() {
            return Err(HarnessError::DispatchError {
                message: format!("import of {} was dropped", name),
            });
        }
        self.named.insert(name.to_string(), id);
        Ok(id)
    }

    /// Draw a chained run on the ground plane with the drawing tool, one
    /// click per ground point `(x, z)`. Segment `i` is registered as
    /// `names[i]`, so `names` must be one shorter than `points`.
    pub fn draw_run(&mut self, names: &[&str], points: &[(f64, f64)]) -> Result<Vec<Uuid>, HarnessError> {
        if names.len() + 1 != points.len() {
            return Err(HarnessError::AssertionFailed {
                detail: format!("draw_run: {} names for {} points", names.len(), points.len()),
            });
        }
        for name in names {
            self.check_name_available(name)?;
        }

        self.send(UiToEditor::StartDrawing)?;
        let mut ids = Vec::with_capacity(names.len());
        for (i, &(x, z)) in points.iter().enumerate() {
            let before = self.state.layout.pipes().len();
            self.send(UiToEditor::Click {
                pointer: down_pointer(x, z),
            })?;
            if i == 0 {
                continue;
            }
            let pipes = self.state.layout.pipes();
            if pipes.len() != before + 1 {
                return Err(HarnessError::DispatchError {
                    message: format!("click {} at ({}, {}) committed nothing", i, x, z),
                });
            }
            let id = pipes[pipes.len() - 1].id;
            self.named.insert(names[i - 1].to_string(), id);
            ids.push(id);
        }
        self.send(UiToEditor::CancelDrawing)?;
        Ok(ids)
    }

    /// Add an annotation under `name`.
    pub fn annotation(&mut self, name: &str, at: [f64; 3], text: &str) -> Result<Uuid, HarnessError> {
        self.check_name_available(name)?;
        self.send(UiToEditor::AddAnnotation {
            position: Point3d::from_array(at),
        })?;
        let id = self
            .state
            .layout
            .annotations()
            .last()
            .map(|a| a.id)
            .ok_or_else(|| HarnessError::DispatchError {
                message: "AddAnnotation: no annotation created".to_string(),
            })?;
        if !text.is_empty() {
            self.send(UiToEditor::UpdateAnnotation {
                id,
                text: text.to_string(),
            })?;
        }
        self.named.insert(name.to_string(), id);
        Ok(id)
    }

    // ── Editing ─────────────────────────────────────────────────────────

    pub fn patch(&mut self, name: &str, patch: PipePatch) -> Result<&mut Self, HarnessError> {
        let id = self.id(name)?;
        self.send(UiToEditor::UpdatePipe { id, patch })?;
        Ok(self)
    }

    pub fn set_status(&mut self, name: &str, status: PipeStatus) -> Result<&mut Self, HarnessError> {
        self.patch(
            name,
            PipePatch {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    pub fn move_endpoint(&mut self, name: &str, is_start: bool, to: [f64; 3]) -> Result<&mut Self, HarnessError> {
        let p = Some(Point3d::from_array(to));
        let patch = if is_start {
            PipePatch {
                start: p,
                ..Default::default()
            }
        } else {
            PipePatch {
                end: p,
                ..Default::default()
            }
        };
        self.patch(name, patch)
    }

    pub fn delete(&mut self, names: &[&str]) -> Result<&mut Self, HarnessError> {
        let ids = self.ids(names)?;
        self.send(UiToEditor::DeletePipes { ids })?;
        Ok(self)
    }

    pub fn undo(&mut self) -> Result<&mut Self, HarnessError> {
        self.send(UiToEditor::Undo)?;
        Ok(self)
    }

    pub fn redo(&mut self) -> Result<&mut Self, HarnessError> {
        self.send(UiToEditor::Redo)?;
        Ok(self)
    }

    // ── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, names: &[&str]) -> Result<&mut Self, HarnessError> {
        let ids = self.ids(names)?;
        self.send(UiToEditor::SetSelection { ids })?;
        Ok(self)
    }

    /// Click the fitting at `point`.
    pub fn click_fitting(&mut self, point: [f64; 3]) -> Result<&mut Self, HarnessError> {
        let key = JunctionKey::quantize(&Point3d::from_array(point), self.state.layout.config().key_decimals);
        self.send(UiToEditor::ClickFitting { key })?;
        Ok(self)
    }

    /// Marquee-select between two pixel corners through `camera`.
    pub fn marquee(
        &mut self,
        camera: Camera,
        viewport: (f64, f64),
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<&mut Self, HarnessError> {
        self.send(UiToEditor::SetCamera { camera })?;
        self.send(UiToEditor::SetViewport {
            width: viewport.0,
            height: viewport.1,
        })?;
        self.send(UiToEditor::MarqueeBegin { x: from.0, y: from.1 })?;
        self.send(UiToEditor::MarqueeEnd { x: to.0, y: to.1 })?;
        Ok(self)
    }

    /// Drag the transform handle by `delta` in `ticks` equal steps, then
    /// release it.
    pub fn drag_selection(&mut self, delta: [f64; 3], ticks: usize) -> Result<&mut Self, HarnessError> {
        let start = self.state.group.handle().ok_or_else(|| HarnessError::AssertionFailed {
            detail: "drag_selection: nothing selected".to_string(),
        })?;
        let delta = Vec3::from_array(delta);
        let ticks = ticks.max(1);
        for i in 1..=ticks {
            let position = start + delta * (i as f64 / ticks as f64);
            self.send(UiToEditor::DragHandle { position })?;
        }
        self.send(UiToEditor::EndDrag)?;
        Ok(self)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn id(&self, name: &str) -> Result<Uuid, HarnessError> {
        self.named
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::PipeNotFound {
                name: name.to_string(),
            })
    }

    pub fn ids(&self, names: &[&str]) -> Result<Vec<Uuid>, HarnessError> {
        names.iter().map(|n| self.id(n)).collect()
    }

    pub fn get_pipe(&self, name: &str) -> Result<&PipeSegment, HarnessError> {
        let id = self.id(name)?;
        self.state
            .layout
            .pipe(id)
            .ok_or_else(|| HarnessError::PipeNotFound {
                name: name.to_string(),
            })
    }

    pub fn get_annotation(&self, name: &str) -> Result<&Annotation, HarnessError> {
        let id = self.id(name)?;
        self.state
            .layout
            .annotation(id)
            .ok_or_else(|| HarnessError::PipeNotFound {
                name: name.to_string(),
            })
    }

    pub fn topology(&self) -> &Topology {
        self.state.layout.topology()
    }

    pub fn pipe_count(&self) -> usize {
        self.state.layout.pipes().len()
    }

    /// Names of the selected entities, in selection order.
    pub fn selected_names(&self) -> Vec<String> {
        self.state
            .selection
            .ids()
            .iter()
            .map(|id| {
                self.named
                    .iter()
                    .find(|(_, v)| *v == id)
                    .map(|(k, _)| k.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect()
    }

    /// `(message type, response types)` for every message sent.
    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    // ── Assertions ──────────────────────────────────────────────────────

    pub fn assert_pipe_count(&self, expected: usize) -> Result<&Self, HarnessError> {
        let actual = self.pipe_count();
        if actual == expected {
            Ok(self)
        } else {
            let names: Vec<&str> = self.state.layout.pipes().iter().map(|p| p.name.as_str()).collect();
            Err(HarnessError::AssertionFailed {
                detail: format!("expected {} pipes, got {}: {:?}", expected, actual, names),
            })
        }
    }

    pub fn assert_selected(&self, names: &[&str]) -> Result<&Self, HarnessError> {
        let expected = self.ids(names)?;
        if self.state.selection.ids() == expected.as_slice() {
            Ok(self)
        } else {
            Err(HarnessError::AssertionFailed {
                detail: format!("expected selection {:?}, got {:?}", names, self.selected_names()),
            })
        }
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        if self.named.contains_key(name) {
            Err(HarnessError::DuplicateName {
                name: name.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The serde tag of a message, for the history log.
fn message_type(msg: &UiToEditor) -> String {
    serde_json::to_value(msg)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn response_type(r: &EditorToUi) -> &'static str {
    match r {
        EditorToUi::LayoutUpdated { .. } => "LayoutUpdated",
        EditorToUi::DrawingChanged { .. } => "DrawingChanged",
        EditorToUi::DrawingExited => "DrawingExited",
        EditorToUi::SelectionChanged { .. } => "SelectionChanged",
        EditorToUi::HoverChanged { .. } => "HoverChanged",
        EditorToUi::Error { .. } => "Error",
    }
}
