use editor_tools::DrawOutcome;
use tracing::warn;

use crate::editor_state::{BridgeError, EditorState};
use crate::messages::{EditorToUi, UiToEditor};

/// Dispatch a UI message to the editor and return the responses.
///
/// One message can change several things at once (a commit changes both
/// the layout and the drawing preview), so every affected view gets its
/// own response, in a stable order: layout, drawing, selection, hover.
/// Errors become a single `Error` response.
pub fn dispatch(state: &mut EditorState, msg: UiToEditor) -> Vec<EditorToUi> {
    match handle_message(state, msg) {
        Ok(responses) => responses,
        Err(e) => {
            warn!(error = %e, "message rejected");
            vec![EditorToUi::Error {
                message: e.to_string(),
            }]
        }
    }
}

fn handle_message(state: &mut EditorState, msg: UiToEditor) -> Result<Vec<EditorToUi>, BridgeError> {
    match msg {
        // -- Setup --
        UiToEditor::Configure { config } => {
            state.configure(config);
            Ok(vec![layout_updated(state), drawing_changed(state)])
        }

        UiToEditor::SetCamera { camera } => {
            state.camera = Some(camera);
            Ok(Vec::new())
        }

        UiToEditor::SetViewport { width, height } => {
            state.viewport = editor_tools::Viewport::new(width, height);
            Ok(Vec::new())
        }

        // -- Drawing --
        UiToEditor::StartDrawing => {
            state.start_drawing();
            Ok(vec![drawing_changed(state)])
        }

        UiToEditor::SetAxisLock { lock } => {
            state.drawing.set_axis_lock(lock);
            Ok(vec![drawing_changed(state)])
        }

        UiToEditor::SetFixedLength { enabled } => {
            state.drawing.set_fixed_length(enabled);
            Ok(vec![drawing_changed(state)])
        }

        UiToEditor::PointerMove { pointer } => {
            if !state.is_drawing() {
                return Ok(Vec::new());
            }
            state.pointer_move(&pointer)?;
            Ok(vec![drawing_changed(state)])
        }

        UiToEditor::Click { pointer } => {
            if !state.is_drawing() {
                return Ok(Vec::new());
            }
            match state.click(&pointer)? {
                DrawOutcome::Committed { .. } => Ok(vec![
                    layout_updated(state),
                    drawing_changed(state),
                    selection_changed(state),
                ]),
                DrawOutcome::Rejected(e) => Err(e.into()),
                DrawOutcome::Ignored => Ok(Vec::new()),
                _ => Ok(vec![drawing_changed(state)]),
            }
        }

        UiToEditor::Escape => {
            if state.is_drawing() {
                return match state.escape() {
                    DrawOutcome::Exited => Ok(vec![EditorToUi::DrawingExited]),
                    _ => Ok(vec![drawing_changed(state)]),
                };
            }
            state.escape();
            let changed = state.clear_selection();
            Ok(selection_if(state, changed))
        }

        UiToEditor::CancelDrawing => {
            state.exit_drawing();
            Ok(vec![EditorToUi::DrawingExited])
        }

        // -- Selection --
        UiToEditor::MarqueeBegin { x, y } => {
            state.begin_marquee((x, y))?;
            Ok(Vec::new())
        }

        UiToEditor::MarqueeUpdate { x, y } => {
            state.update_marquee((x, y));
            Ok(Vec::new())
        }

        UiToEditor::MarqueeEnd { x, y } => {
            let changed = state.end_marquee((x, y))?;
            Ok(selection_if(state, changed))
        }

        UiToEditor::SelectEntity { id, multi } => {
            let changed = state.select_entity(id, multi);
            Ok(selection_if(state, changed))
        }

        UiToEditor::ClickFitting { key } => {
            let changed = state.click_fitting(&key);
            Ok(selection_if(state, changed))
        }

        UiToEditor::SetSelection { ids } => {
            let changed = state.set_selection(ids);
            Ok(selection_if(state, changed))
        }

        UiToEditor::HoverEntity { id } => {
            if state.hover(id) {
                Ok(vec![EditorToUi::HoverChanged {
                    id: state.selection.hovered(),
                }])
            } else {
                Ok(Vec::new())
            }
        }

        UiToEditor::DragHandle { position } => match state.drag_handle(position) {
            Some(_) => Ok(vec![layout_updated(state), selection_changed(state)]),
            None => Ok(Vec::new()),
        },

        UiToEditor::EndDrag => {
            state.end_drag();
            Ok(Vec::new())
        }

        // -- Editing --
        UiToEditor::UpdatePipe { id, patch } => {
            state.layout.update_pipe(id, &patch)?;
            Ok(layout_changed(state))
        }

        UiToEditor::UpdatePipesBatch { ids, patch } => {
            state.layout.update_pipes_batch(&ids, &patch)?;
            Ok(layout_changed(state))
        }

        UiToEditor::DeletePipes { ids } => {
            state.layout.delete_pipes(&ids);
            Ok(layout_changed(state))
        }

        UiToEditor::DeleteSelection => {
            if state.selection.is_empty() {
                return Ok(Vec::new());
            }
            state.delete_selection();
            Ok(vec![layout_updated(state), selection_changed(state)])
        }

        UiToEditor::AddAnnotation { position } => {
            state.layout.add_annotation(position);
            Ok(vec![layout_updated(state)])
        }

        UiToEditor::UpdateAnnotation { id, text } => {
            state.layout.update_annotation(id, &text)?;
            Ok(vec![layout_updated(state)])
        }

        UiToEditor::DeleteAnnotation { id } => {
            state.layout.delete_annotation(id)?;
            Ok(layout_changed(state))
        }

        UiToEditor::ImportPipes { pipes } => {
            state.layout.import_pipes(pipes);
            Ok(layout_changed(state))
        }

        // -- History --
        UiToEditor::Undo => {
            state.layout.undo()?;
            Ok(layout_changed(state))
        }

        UiToEditor::Redo => {
            state.layout.redo()?;
            Ok(layout_changed(state))
        }
    }
}

/// Responses after a layout mutation that may have removed selected ids.
fn layout_changed(state: &mut EditorState) -> Vec<EditorToUi> {
    state.after_layout_change();
    vec![layout_updated(state), selection_changed(state)]
}

fn selection_if(state: &EditorState, changed: bool) -> Vec<EditorToUi> {
    if changed {
        vec![selection_changed(state)]
    } else {
        Vec::new()
    }
}

/// Snapshot of the layout and its rebuilt topology.
pub fn layout_updated(state: &EditorState) -> EditorToUi {
    EditorToUi::LayoutUpdated {
        pipes: state.layout.pipes().to_vec(),
        annotations: state.layout.annotations().to_vec(),
        topology: state.layout.topology().clone(),
    }
}

pub fn drawing_changed(state: &EditorState) -> EditorToUi {
    EditorToUi::DrawingChanged {
        phase: state.drawing.phase(),
        start: state.drawing.start(),
        preview: state.drawing.preview(),
    }
}

pub fn selection_changed(state: &EditorState) -> EditorToUi {
    EditorToUi::SelectionChanged {
        ids: state.selection.ids().to_vec(),
        centroid: state.group.handle(),
    }
}
