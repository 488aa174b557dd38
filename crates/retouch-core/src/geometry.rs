//! Coordinate math shared by the renderer and the interaction controller.
//!
//! Three coordinate systems are involved:
//! - **image space**: pixels of the working bitmap, origin top-left;
//! - **frame space**: the viewport cut out of image space and rotated
//!   clockwise, origin top-left of the rotated buffer;
//! - **display space**: frame space scaled onto the display surface.
//!
//! Every function here is pure. The renderer draws with [`FrameTransform`]
//! and the controller inverts with the same type, so the two can never drift.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Integer pixel dimensions, never smaller than 1x1.
    pub fn to_pixels(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// Axis-aligned rectangle. Width and height are never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Full-image bounds for a bitmap of `width` x `height`.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Normalized rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x0 = a.x.min(b.x);
        let y0 = a.y.min(b.y);
        Self::new(x0, y0, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= EPSILON || self.height <= EPSILON
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when `self` lies inside `outer` (within floating-point tolerance).
    pub fn is_within(&self, outer: &Rect) -> bool {
        let tol = 1e-6;
        self.x >= outer.x - tol
            && self.y >= outer.y - tol
            && self.right() <= outer.right() + tol
            && self.bottom() <= outer.bottom() + tol
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Rect::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    /// Snap to whole pixels inside `bounds`, keeping at least 1x1.
    ///
    /// Both the renderer and the pointer mapping use the snapped rectangle,
    /// so a fractional viewport left behind by panning never shifts the
    /// rendered pixels relative to the stored annotations.
    pub fn snapped(&self, bounds: &Rect) -> Rect {
        if !self.is_finite() {
            return *bounds;
        }
        let max_x = (bounds.right() - 1.0).max(bounds.x);
        let max_y = (bounds.bottom() - 1.0).max(bounds.y);
        let x0 = self.x.round().clamp(bounds.x, max_x);
        let y0 = self.y.round().clamp(bounds.y, max_y);
        let x1 = self.right().round().clamp(x0 + 1.0, bounds.right().max(x0 + 1.0));
        let y1 = self.bottom().round().clamp(y0 + 1.0, bounds.bottom().max(y0 + 1.0));
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}x{:.1} at ({:.1}, {:.1})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Clockwise quarter-turn rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Parse any multiple of 90 (negative values wrap around).
    pub fn from_degrees(deg: i32) -> Option<Self> {
        if deg % 90 != 0 {
            return None;
        }
        match deg.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Compose two rotations (addition mod 360).
    pub fn add(self, other: Rotation) -> Rotation {
        let deg = (self.degrees() + other.degrees()) as i32;
        Rotation::from_degrees(deg).unwrap_or_default()
    }

    pub fn clockwise(self) -> Rotation {
        self.add(Rotation::Deg90)
    }

    pub fn counter_clockwise(self) -> Rotation {
        self.add(Rotation::Deg270)
    }

    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(value as i32)
            .ok_or_else(|| format!("rotation must be a multiple of 90, got {value}"))
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 {
        r.degrees()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Clamp a rectangle into `bounds`.
///
/// Along each axis, a rectangle that fits is shifted inside; one that does
/// not fit is intersected with the bounds. The result may be empty when `r`
/// lies entirely outside `bounds` or is not finite; callers reject empty
/// results.
pub fn clamp_rect(r: Rect, bounds: Rect) -> Rect {
    if !r.is_finite() {
        return Rect::new(bounds.x, bounds.y, 0.0, 0.0);
    }
    let (x, width) = clamp_axis(r.x, r.width, bounds.x, bounds.width);
    let (y, height) = clamp_axis(r.y, r.height, bounds.y, bounds.height);
    Rect::new(x, y, width, height)
}

fn clamp_axis(start: f64, len: f64, bound_start: f64, bound_len: f64) -> (f64, f64) {
    let bound_end = bound_start + bound_len;
    if len <= bound_len {
        (start.clamp(bound_start, bound_end - len), len)
    } else {
        let s = start.max(bound_start);
        let e = (start + len).min(bound_end);
        (s, (e - s).max(0.0))
    }
}

/// Width and height after rotating a `w` x `h` buffer.
pub fn rotate_rect_dims(w: f64, h: f64, rotation: Rotation) -> (f64, f64) {
    if rotation.swaps_axes() {
        (h, w)
    } else {
        (w, h)
    }
}

/// Maps image space to frame space (viewport cut-out, then clockwise rotation).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransform {
    pub viewport: Rect,
    pub rotation: Rotation,
}

impl FrameTransform {
    pub fn new(viewport: Rect, rotation: Rotation) -> Self {
        Self { viewport, rotation }
    }

    /// Size of the rotated cut-out.
    pub fn frame_size(&self) -> Size {
        let (w, h) = rotate_rect_dims(self.viewport.width, self.viewport.height, self.rotation);
        Size::new(w, h)
    }

    pub fn image_to_frame(&self, p: Point) -> Point {
        let lx = p.x - self.viewport.x;
        let ly = p.y - self.viewport.y;
        let (w, h) = (self.viewport.width, self.viewport.height);
        match self.rotation {
            Rotation::Deg0 => Point::new(lx, ly),
            Rotation::Deg90 => Point::new(h - ly, lx),
            Rotation::Deg180 => Point::new(w - lx, h - ly),
            Rotation::Deg270 => Point::new(ly, w - lx),
        }
    }

    pub fn frame_to_image(&self, q: Point) -> Point {
        let (w, h) = (self.viewport.width, self.viewport.height);
        let (lx, ly) = match self.rotation {
            Rotation::Deg0 => (q.x, q.y),
            Rotation::Deg90 => (q.y, h - q.x),
            Rotation::Deg180 => (w - q.x, h - q.y),
            Rotation::Deg270 => (w - q.y, q.x),
        };
        Point::new(lx + self.viewport.x, ly + self.viewport.y)
    }

    /// Frame-space point to display-surface point.
    pub fn frame_to_display(&self, q: Point, display: Size) -> Point {
        let frame = self.frame_size();
        Point::new(
            q.x * display.width / frame.width,
            q.y * display.height / frame.height,
        )
    }

    pub fn display_to_frame(&self, p: Point, display: Size) -> Point {
        let frame = self.frame_size();
        Point::new(
            p.x * frame.width / display.width,
            p.y * frame.height / display.height,
        )
    }

    /// Average image pixels per display pixel, for converting brush sizes.
    pub fn image_per_display(&self, display: Size) -> f64 {
        let frame = self.frame_size();
        let sx = frame.width / display.width;
        let sy = frame.height / display.height;
        (sx + sy) / 2.0
    }
}

/// Map a point on the display surface back into image space.
///
/// Exact inverse of [`image_to_display_point`] for the same arguments.
pub fn display_to_image_point(
    p: Point,
    viewport: Rect,
    display: Size,
    rotation: Rotation,
) -> Point {
    let t = FrameTransform::new(viewport, rotation);
    t.frame_to_image(t.display_to_frame(p, display))
}

/// Forward transform used by the renderer: image space to display surface.
pub fn image_to_display_point(
    p: Point,
    viewport: Rect,
    display: Size,
    rotation: Rotation,
) -> Point {
    let t = FrameTransform::new(viewport, rotation);
    t.frame_to_display(t.image_to_frame(p), display)
}

/// Shrink (`factor > 1`) or grow (`factor < 1`) the viewport about `anchor`.
///
/// The anchor keeps its relative position inside the viewport. A grown
/// viewport is capped at the bounds (aspect ratio preserved) and shifted
/// back inside them.
pub fn zoom_viewport(viewport: Rect, factor: f64, anchor: Option<Point>, bounds: Rect) -> Rect {
    if factor <= 0.0 || !factor.is_finite() {
        return viewport;
    }
    let anchor = anchor
        .filter(Point::is_finite)
        .unwrap_or_else(|| viewport.center());

    let mut width = viewport.width / factor;
    let mut height = viewport.height / factor;
    let cap = (bounds.width / width).min(bounds.height / height).min(1.0);
    width *= cap;
    height *= cap;

    let scale_x = if viewport.width > 0.0 { width / viewport.width } else { 1.0 };
    let scale_y = if viewport.height > 0.0 { height / viewport.height } else { 1.0 };
    let x = anchor.x - (anchor.x - viewport.x) * scale_x;
    let y = anchor.y - (anchor.y - viewport.y) * scale_y;

    clamp_rect(Rect::new(x, y, width, height), bounds)
}

/// Translate the viewport by an image-space delta, stopping at the bounds.
pub fn pan_viewport(viewport: Rect, dx: f64, dy: f64, bounds: Rect) -> Rect {
    if !dx.is_finite() || !dy.is_finite() {
        return viewport;
    }
    clamp_rect(
        Rect::new(viewport.x + dx, viewport.y + dy, viewport.width, viewport.height),
        bounds,
    )
}

/// Largest surface with the frame's aspect ratio that fits in `layout`.
pub fn fit_display_size(frame: Size, layout: Size) -> Size {
    if frame.width <= 0.0 || frame.height <= 0.0 {
        return Size::new(layout.width.max(1.0).round(), layout.height.max(1.0).round());
    }
    let scale = (layout.width / frame.width).min(layout.height / frame.height);
    Size::new(
        (frame.width * scale).round().max(1.0),
        (frame.height * scale).round().max(1.0),
    )
}
