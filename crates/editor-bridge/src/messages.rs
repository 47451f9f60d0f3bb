use serde::{Deserialize, Serialize};
use uuid::Uuid;

use editor_tools::{AxisLock, DrawingPhase, SnapResult};
use iso_kernel::{Camera, Point3d, Vec3};
use iso_types::{Annotation, PipePatch, PipeSegment};
use layout_engine::{JunctionKey, Topology};

use crate::editor_state::EditorConfig;

/// Pointer position as either a world-space ray or a position in normalized
/// device coordinates, unprojected through the active camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Pointer {
    Ray { origin: Point3d, direction: Vec3 },
    Ndc { x: f64, y: f64 },
}

/// Messages from the UI to the editor core.
/// Serialized as JSON for postMessage transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiToEditor {
    // -- Setup --
    Configure {
        config: EditorConfig,
    },
    SetCamera {
        camera: Camera,
    },
    /// Viewport size in pixels, for marquee conversion.
    SetViewport {
        width: f64,
        height: f64,
    },

    // -- Drawing --
    StartDrawing,
    SetAxisLock {
        lock: Option<AxisLock>,
    },
    SetFixedLength {
        enabled: bool,
    },
    PointerMove {
        pointer: Pointer,
    },
    Click {
        pointer: Pointer,
    },
    /// Step back in the drawing tool, or clear the selection when not drawing.
    Escape,
    CancelDrawing,

    // -- Selection --
    /// Pointer-down for a marquee, in pixels from the top-left corner.
    MarqueeBegin {
        x: f64,
        y: f64,
    },
    MarqueeUpdate {
        x: f64,
        y: f64,
    },
    MarqueeEnd {
        x: f64,
        y: f64,
    },
    /// Click on an entity, or on empty space for `None`.
    SelectEntity {
        id: Option<Uuid>,
        #[serde(default)]
        multi: bool,
    },
    /// Click on a fitting; selects the pipe holding the joint back.
    ClickFitting {
        key: JunctionKey,
    },
    SetSelection {
        ids: Vec<Uuid>,
    },
    HoverEntity {
        id: Option<Uuid>,
    },
    /// The transform handle moved to `position`.
    DragHandle {
        position: Point3d,
    },
    EndDrag,

    // -- Editing --
    UpdatePipe {
        id: Uuid,
        patch: PipePatch,
    },
    UpdatePipesBatch {
        ids: Vec<Uuid>,
        patch: PipePatch,
    },
    DeletePipes {
        ids: Vec<Uuid>,
    },
    DeleteSelection,
    AddAnnotation {
        position: Point3d,
    },
    UpdateAnnotation {
        id: Uuid,
        text: String,
    },
    DeleteAnnotation {
        id: Uuid,
    },
    ImportPipes {
        pipes: Vec<PipeSegment>,
    },

    // -- History --
    Undo,
    Redo,
}

/// Messages from the editor core to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EditorToUi {
    /// The layout changed; topology is already rebuilt.
    LayoutUpdated {
        pipes: Vec<PipeSegment>,
        annotations: Vec<Annotation>,
        topology: Topology,
    },

    DrawingChanged {
        phase: DrawingPhase,
        start: Option<Point3d>,
        preview: Option<SnapResult>,
    },

    DrawingExited,

    SelectionChanged {
        ids: Vec<Uuid>,
        /// Transform handle position; `None` for an empty selection.
        centroid: Option<Point3d>,
    },

    HoverChanged {
        id: Option<Uuid>,
    },

    Error {
        message: String,
    },
}
