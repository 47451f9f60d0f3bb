//! Interactive editing tools: pipe drawing with snapping and axis locks,
//! selection, marquee picking and group moves.
//!
//! Tools never own the layout. They read pipes through, and commit changes
//! to, a [`layout_engine::LayoutCommands`] implementation.

pub mod config;
pub mod drawing;
pub mod marquee;
pub mod selection;
pub mod snap;
pub mod transform;

pub use config::DrawingConfig;
pub use drawing::{AxisLock, DrawOutcome, DrawingPhase, DrawingTool, PointerInput};
pub use marquee::{entities_in_rect, select_projected, MarqueeTracker, NdcRect, Viewport};
pub use selection::{Selection, SelectionMode};
pub use snap::{endpoint_snap, grid_snap, SnapResult, SnapSource};
pub use transform::{selection_centroid, GroupTransform};
