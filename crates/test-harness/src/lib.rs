//! Test harness for scripted pipe-editor sessions.
//!
//! Drives the editor through the same JSON message dispatch the UI uses
//! and checks the resulting layout and topology.
//!
//! # Key Components
//!
//! - [`LayoutBuilder`]: fluent API for drawing, editing and selecting by name
//! - [`helpers`]: pointer rays, cameras, segment constructors
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod workflow;

pub use helpers::HarnessError;
pub use workflow::LayoutBuilder;
