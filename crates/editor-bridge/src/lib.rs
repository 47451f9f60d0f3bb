//! UI bridge for the isometric pipe editor.
//!
//! Wraps the layout store and the interactive tools in one [`EditorState`]
//! and exposes a JSON message protocol over it. On `wasm32` the
//! `wasm_api` module exports the entry points a web worker calls.

pub mod dispatch;
pub mod editor_state;
pub mod messages;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use dispatch::dispatch;
pub use editor_state::{BridgeError, EditorConfig, EditorState, InteractionMode};
pub use messages::{EditorToUi, Pointer, UiToEditor};

/// Parse a JSON message and dispatch it, returning JSON responses.
///
/// The non-wasm counterpart of `wasm_api::process_message`, for hosts that
/// embed the editor natively.
pub fn process_json(state: &mut EditorState, json_input: &str) -> Result<String, BridgeError> {
    let msg: UiToEditor = serde_json::from_str(json_input).map_err(|e| BridgeError::Serialization {
        reason: e.to_string(),
    })?;
    let responses = dispatch(state, msg);
    serde_json::to_string(&responses).map_err(|e| BridgeError::Serialization {
        reason: e.to_string(),
    })
}
