//! Rectangular marquee selection in screen space.

use iso_kernel::{Camera, Point3d};
use iso_types::{Annotation, PipeSegment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pixel position (origin top-left, y down) to normalized device
    /// coordinates (origin center, y up).
    pub fn to_ndc(&self, px: f64, py: f64) -> (f64, f64) {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        (px / w * 2.0 - 1.0, 1.0 - py / h * 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Axis-aligned rectangle in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NdcRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl NdcRect {
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Tracks a marquee drag from pointer-down to pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeTracker {
    /// Pointer-down position in pixels.
    pub start_px: (f64, f64),
    pub current_px: (f64, f64),
}

impl MarqueeTracker {
    pub fn new(start_px: (f64, f64)) -> Self {
        Self {
            start_px,
            current_px: start_px,
        }
    }

    pub fn update(&mut self, px: (f64, f64)) {
        self.current_px = px;
    }

    pub fn width(&self) -> f64 {
        (self.current_px.0 - self.start_px.0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.current_px.1 - self.start_px.1).abs()
    }

    /// A drag smaller than `min_px` on both axes is a click.
    pub fn is_click(&self, min_px: f64) -> bool {
        self.width() < min_px && self.height() < min_px
    }

    pub fn ndc_rect(&self, viewport: &Viewport) -> NdcRect {
        NdcRect::from_corners(
            viewport.to_ndc(self.start_px.0, self.start_px.1),
            viewport.to_ndc(self.current_px.0, self.current_px.1),
        )
    }
}

/// Ids whose projected position lies inside `rect`, in input order.
pub fn select_projected(
    rect: &NdcRect,
    projected: impl IntoIterator<Item = (Uuid, Option<(f64, f64)>)>,
) -> Vec<Uuid> {
    projected
        .into_iter()
        .filter_map(|(id, ndc)| {
            let (x, y) = ndc?;
            rect.contains(x, y).then_some(id)
        })
        .collect()
}

/// Entities inside `rect`: pipes by midpoint, then annotations by position.
/// Points behind the camera are never selected.
pub fn entities_in_rect(
    rect: &NdcRect,
    camera: &Camera,
    pipes: &[PipeSegment],
    annotations: &[Annotation],
) -> Vec<Uuid> {
    let project = |id: Uuid, p: Point3d| (id, camera.project_ndc(&p));
    select_projected(
        rect,
        pipes
            .iter()
            .map(|p| project(p.id, p.midpoint()))
            .chain(annotations.iter().map(|a| project(a.id, a.position))),
    )
}
