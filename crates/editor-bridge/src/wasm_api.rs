//! WASM entry points for the web worker.
//!
//! This module is only compiled for the `wasm32` target. JavaScript posts
//! JSON `UiToEditor` messages and receives a JSON array of `EditorToUi`
//! responses.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::dispatch;
use crate::editor_state::EditorState;
use crate::messages::{EditorToUi, UiToEditor};

// Single-threaded in the web worker.
thread_local! {
    static EDITOR_STATE: RefCell<Option<EditorState>> = const { RefCell::new(None) };
}

fn error_json(message: &str) -> String {
    let response = vec![EditorToUi::Error {
        message: message.to_string(),
    }];
    serde_json::to_string(&response).unwrap_or_else(|_| "[]".to_string())
}

/// Initialize the editor. Must be called once before any other function.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();

    EDITOR_STATE.with(|cell| {
        *cell.borrow_mut() = Some(EditorState::new());
    });
}

/// Process a JSON message from the UI and return a JSON array of responses.
#[wasm_bindgen]
pub fn process_message(json_input: &str) -> String {
    let responses = EDITOR_STATE.with(|cell| {
        let mut state = cell.borrow_mut();
        let Some(state) = state.as_mut() else {
            return Err("editor not initialized; call init() first".to_string());
        };
        let msg: UiToEditor =
            serde_json::from_str(json_input).map_err(|e| format!("failed to parse message: {}", e))?;
        Ok(dispatch::dispatch(state, msg))
    });

    match responses {
        Ok(responses) => serde_json::to_string(&responses)
            .unwrap_or_else(|e| error_json(&format!("serialization failed: {}", e))),
        Err(message) => error_json(&message),
    }
}

/// Current layout and topology as a `LayoutUpdated` JSON object, for UIs
/// that query state instead of waiting for a response.
#[wasm_bindgen]
pub fn get_layout() -> String {
    EDITOR_STATE.with(|cell| {
        let state = cell.borrow();
        match state.as_ref() {
            Some(state) => serde_json::to_string(&dispatch::layout_updated(state)).unwrap_or_default(),
            None => r#"{"type":"Error","message":"editor not initialized"}"#.to_string(),
        }
    })
}
