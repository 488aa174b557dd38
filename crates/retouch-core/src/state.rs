use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ZoomConfig;
use crate::error::{Result, RetouchError};
use crate::geometry::{clamp_rect, pan_viewport, zoom_viewport, Point, Rect, Rotation};

/// An annotation placed on the image. Positions are in image space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Marker { position: Point, number: u32 },
    Label { position: Point, text: String },
    Arrow { from: Point, to: Point },
}

impl Annotation {
    /// Apply `f` to every stored coordinate.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Annotation {
        match self {
            Annotation::Marker { position, number } => Annotation::Marker {
                position: f(*position),
                number: *number,
            },
            Annotation::Label { position, text } => Annotation::Label {
                position: f(*position),
                text: text.clone(),
            },
            Annotation::Arrow { from, to } => Annotation::Arrow {
                from: f(*from),
                to: f(*to),
            },
        }
    }
}

/// Freehand blur brush stroke in image space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlurStroke {
    pub points: Vec<Point>,
    /// Brush radius in image pixels.
    pub radius: f32,
    /// Blur intensity in (0, 1]; the Gaussian sigma is `strength * radius`.
    pub strength: f32,
}

impl BlurStroke {
    /// Image-space bounding box of the painted area.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let r = self.radius as f64;
        Some(Rect::new(x0 - r, y0 - r, x1 - x0 + 2.0 * r, y1 - y0 + 2.0 * r))
    }
}

/// The complete edit state. Both rendered surfaces are derived from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Visible region in image space, before rotation.
    pub viewport: Rect,
    pub rotation: Rotation,
    /// Cumulative zoom relative to `base_viewport`.
    pub zoom: f64,
    /// Viewport in effect at zoom 1.0 (set by crop and reset).
    pub base_viewport: Rect,
    pub annotations: Vec<Annotation>,
    pub blur_strokes: Vec<BlurStroke>,
}

impl ViewState {
    /// Fresh state showing the whole image.
    pub fn new(bounds: Rect) -> Self {
        Self {
            viewport: bounds,
            rotation: Rotation::Deg0,
            zoom: 1.0,
            base_viewport: bounds,
            annotations: Vec::new(),
            blur_strokes: Vec::new(),
        }
    }

    pub fn next_marker_number(&self) -> u32 {
        self.annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Marker { number, .. } => Some(*number),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Zoom in (`factor > 1`) or out about `anchor`.
    ///
    /// Fails without touching the state when the new zoom would leave
    /// `[zoom.min, zoom.max]`, the viewport would shrink below the minimum
    /// side, or nothing would change.
    pub fn zoom_by(
        &mut self,
        factor: f64,
        anchor: Option<Point>,
        bounds: Rect,
        limits: &ZoomConfig,
    ) -> Result<()> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(RetouchError::Geometry(format!("invalid zoom factor {factor}")));
        }
        let next = zoom_viewport(self.viewport, factor, anchor, bounds);
        if next.is_empty() || next.width <= 0.0 {
            return Err(RetouchError::Geometry("zoom produced an empty viewport".into()));
        }

        let actual = self.viewport.width / next.width;
        if (actual - 1.0).abs() < 1e-9 {
            return Err(RetouchError::Geometry("viewport already at its limit".into()));
        }
        let zoom = self.zoom * actual;
        if zoom < limits.min - 1e-9 || zoom > limits.max + 1e-9 {
            return Err(RetouchError::Geometry(format!(
                "zoom {zoom:.3} outside [{}, {}]",
                limits.min, limits.max
            )));
        }
        let min_w = bounds.width * limits.min_viewport_fraction;
        let min_h = bounds.height * limits.min_viewport_fraction;
        if actual > 1.0 && (next.width < min_w || next.height < min_h) {
            return Err(RetouchError::Geometry(format!(
                "viewport {next} below minimum {min_w:.1}x{min_h:.1}"
            )));
        }

        self.viewport = next;
        self.zoom = zoom;
        Ok(())
    }

    /// Translate the viewport. Returns `false` when it is pinned at the bounds.
    pub fn pan_by(&mut self, dx: f64, dy: f64, bounds: Rect) -> bool {
        let next = pan_viewport(self.viewport, dx, dy, bounds);
        if next == self.viewport {
            return false;
        }
        self.viewport = next;
        true
    }

    /// Narrow the viewport to `rect` (non-destructive crop).
    pub fn crop_to(&mut self, rect: Rect, bounds: Rect) -> Result<()> {
        let clamped = clamp_rect(rect, bounds);
        if clamped.width < 1.0 || clamped.height < 1.0 {
            return Err(RetouchError::Geometry(format!(
                "crop {clamped} smaller than 1x1"
            )));
        }
        self.viewport = clamped;
        self.base_viewport = clamped;
        self.zoom = 1.0;
        Ok(())
    }

    /// Return to the viewport of the last crop or reset.
    pub fn reset_zoom(&mut self) -> bool {
        if self.viewport == self.base_viewport && self.zoom == 1.0 {
            return false;
        }
        self.viewport = self.base_viewport;
        self.zoom = 1.0;
        true
    }

    pub fn rotate_clockwise(&mut self) {
        self.rotation = self.rotation.clockwise();
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.rotation = self.rotation.counter_clockwise();
    }

    /// Drop every edit and show the whole image again.
    pub fn reset(&mut self, bounds: Rect) {
        debug!("View state reset");
        *self = ViewState::new(bounds);
    }
}
