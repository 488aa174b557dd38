//! Pointer-driven editing.
//!
//! The controller turns press/move/release/leave on the display surface into
//! `ViewState` edits. Display coordinates never leave this module: every
//! point is mapped into image space through the same transform the renderer
//! draws with.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BlurConfig, EditorConfig, ZoomConfig};
use crate::geometry::{FrameTransform, Point, Rect, Size};
use crate::state::{Annotation, BlurStroke, ViewState};

/// Active pointer tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    None,
    Pan,
    Zoom,
    Crop,
    Blur,
    Marker,
    Label,
    Arrow,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::None,
        Mode::Pan,
        Mode::Zoom,
        Mode::Crop,
        Mode::Blur,
        Mode::Marker,
        Mode::Label,
        Mode::Arrow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mode::None => "Select",
            Mode::Pan => "Pan",
            Mode::Zoom => "Zoom",
            Mode::Crop => "Crop",
            Mode::Blur => "Blur",
            Mode::Marker => "Marker",
            Mode::Label => "Label",
            Mode::Arrow => "Arrow",
        }
    }
}

/// What the host should do after a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Nothing changed.
    Ignored,
    /// Only the live overlay (crop selection) changed.
    Overlay,
    /// The view changed transiently; re-render, but do not record history.
    Redraw,
    /// A gesture finished and changed the view; record one history entry.
    Commit,
}

/// Where the display surface sits relative to the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayGeometry {
    /// Full image bounds.
    pub bounds: Rect,
    /// Size of the display surface, in display pixels.
    pub display: Size,
}

impl DisplayGeometry {
    pub fn new(bounds: Rect, display: Size) -> Self {
        Self { bounds, display }
    }

    /// The transform the renderer uses for `view`.
    pub fn transform(&self, view: &ViewState) -> FrameTransform {
        FrameTransform::new(view.viewport.snapped(&self.bounds), view.rotation)
    }

    pub fn to_image(&self, view: &ViewState, p: Point) -> Point {
        let t = self.transform(view);
        t.frame_to_image(t.display_to_frame(p, self.display))
    }

    pub fn to_display(&self, view: &ViewState, p: Point) -> Point {
        let t = self.transform(view);
        t.frame_to_display(t.image_to_frame(p), self.display)
    }

    /// Clamp a point onto the display surface.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0.0, self.display.width),
            p.y.clamp(0.0, self.display.height),
        )
    }
}

#[derive(Clone, Debug)]
enum Gesture {
    Drag {
        last: Point,
        before_viewport: Rect,
        before_zoom: f64,
    },
    Crop {
        start: Point,
        current: Point,
    },
    Blur(BlurStroke),
    Point(Point),
    Arrow {
        from: Point,
        to: Point,
    },
}

#[derive(Clone, Debug)]
pub struct InteractionController {
    mode: Mode,
    pointer_down: bool,
    gesture: Option<Gesture>,
    label_text: String,
    blur: BlurConfig,
    zoom: ZoomConfig,
    min_crop_display_px: f64,
}

impl InteractionController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            mode: Mode::None,
            pointer_down: false,
            gesture: None,
            label_text: String::new(),
            blur: config.blur.clone(),
            zoom: config.zoom.clone(),
            min_crop_display_px: config.min_crop_display_px,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch tools. Any gesture in progress is dropped.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "Mode changed");
        }
        self.mode = mode;
        self.pointer_down = false;
        self.gesture = None;
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn label_text(&self) -> &str {
        &self.label_text
    }

    /// Text used by the next label placed with the pointer.
    pub fn set_label_text(&mut self, text: impl Into<String>) {
        self.label_text = text.into();
    }

    pub fn blur_brush(&self) -> &BlurConfig {
        &self.blur
    }

    pub fn set_blur_brush(&mut self, blur: BlurConfig) {
        self.blur = blur;
    }

    /// Live crop selection in display space.
    pub fn crop_selection(&self) -> Option<Rect> {
        match &self.gesture {
            Some(Gesture::Crop { start, current }) => Some(Rect::from_corners(*start, *current)),
            _ => None,
        }
    }

    /// `view` with the in-progress stroke or arrow added, for live rendering.
    pub fn preview<'a>(&self, view: &'a ViewState) -> Cow<'a, ViewState> {
        match &self.gesture {
            Some(Gesture::Blur(stroke)) => {
                let mut v = view.clone();
                v.blur_strokes.push(stroke.clone());
                Cow::Owned(v)
            }
            Some(Gesture::Arrow { from, to }) => {
                let mut v = view.clone();
                v.annotations.push(Annotation::Arrow {
                    from: *from,
                    to: *to,
                });
                Cow::Owned(v)
            }
            _ => Cow::Borrowed(view),
        }
    }

    pub fn pointer_down(
        &mut self,
        view: &mut ViewState,
        geom: &DisplayGeometry,
        p: Point,
    ) -> PointerOutcome {
        if self.pointer_down || self.mode == Mode::None {
            return PointerOutcome::Ignored;
        }
        let p = geom.clamp(p);
        let at = geom.to_image(view, p);

        let (gesture, outcome) = match self.mode {
            Mode::None => return PointerOutcome::Ignored,
            Mode::Pan | Mode::Zoom => (
                Gesture::Drag {
                    last: p,
                    before_viewport: view.viewport,
                    before_zoom: view.zoom,
                },
                PointerOutcome::Ignored,
            ),
            Mode::Crop => (
                Gesture::Crop {
                    start: p,
                    current: p,
                },
                PointerOutcome::Overlay,
            ),
            Mode::Blur => {
                let t = geom.transform(view);
                let longest = geom.bounds.width.max(geom.bounds.height) as f32;
                let radius = (self.blur.radius * t.image_per_display(geom.display) as f32)
                    .min(longest);
                (
                    Gesture::Blur(BlurStroke {
                        points: vec![at],
                        radius,
                        strength: self.blur.strength.min(1.0),
                    }),
                    PointerOutcome::Redraw,
                )
            }
            Mode::Marker | Mode::Label => (Gesture::Point(at), PointerOutcome::Ignored),
            Mode::Arrow => (Gesture::Arrow { from: at, to: at }, PointerOutcome::Redraw),
        };
        self.pointer_down = true;
        self.gesture = Some(gesture);
        outcome
    }

    pub fn pointer_move(
        &mut self,
        view: &mut ViewState,
        geom: &DisplayGeometry,
        p: Point,
    ) -> PointerOutcome {
        if !self.pointer_down {
            return PointerOutcome::Ignored;
        }
        let p = geom.clamp(p);
        let mode = self.mode;
        let Some(gesture) = self.gesture.as_mut() else {
            return PointerOutcome::Ignored;
        };

        match gesture {
            Gesture::Drag { last, .. } if mode == Mode::Pan => {
                let from = geom.to_image(view, *last);
                let to = geom.to_image(view, p);
                *last = p;
                // Dragging the content right moves the viewport left.
                if view.pan_by(from.x - to.x, from.y - to.y, geom.bounds) {
                    PointerOutcome::Redraw
                } else {
                    PointerOutcome::Ignored
                }
            }
            Gesture::Drag { last, .. } => {
                let dy = p.y - last.y;
                *last = p;
                if dy == 0.0 {
                    return PointerOutcome::Ignored;
                }
                let factor = if dy < 0.0 {
                    1.0 + self.zoom.drag_step
                } else {
                    1.0 / (1.0 + self.zoom.drag_step)
                };
                match view.zoom_by(factor, None, geom.bounds, &self.zoom) {
                    Ok(()) => PointerOutcome::Redraw,
                    Err(e) => {
                        debug!(error = %e, "Drag zoom ignored");
                        PointerOutcome::Ignored
                    }
                }
            }
            Gesture::Crop { current, .. } => {
                *current = p;
                PointerOutcome::Overlay
            }
            Gesture::Blur(stroke) => {
                let at = geom.to_image(view, p);
                if stroke.points.last() == Some(&at) {
                    return PointerOutcome::Ignored;
                }
                stroke.points.push(at);
                PointerOutcome::Redraw
            }
            Gesture::Arrow { to, .. } => {
                *to = geom.to_image(view, p);
                PointerOutcome::Redraw
            }
            Gesture::Point(_) => PointerOutcome::Ignored,
        }
    }

    /// Finish the gesture. Returns `Commit` when the view changed.
    pub fn pointer_up(
        &mut self,
        view: &mut ViewState,
        geom: &DisplayGeometry,
        p: Point,
    ) -> PointerOutcome {
        if !self.pointer_down {
            return PointerOutcome::Ignored;
        }
        let p = geom.clamp(p);
        self.pointer_down = false;
        let Some(gesture) = self.gesture.take() else {
            return PointerOutcome::Ignored;
        };

        match gesture {
            Gesture::Drag {
                before_viewport, ..
            } => {
                if view.viewport != before_viewport {
                    PointerOutcome::Commit
                } else {
                    PointerOutcome::Ignored
                }
            }
            Gesture::Crop { start, .. } => self.finish_crop(view, geom, start, p),
            Gesture::Blur(mut stroke) => {
                let at = geom.to_image(view, p);
                if stroke.points.last() != Some(&at) {
                    stroke.points.push(at);
                }
                view.blur_strokes.push(stroke);
                PointerOutcome::Commit
            }
            Gesture::Point(at) => {
                if !geom.bounds.contains(at) {
                    return PointerOutcome::Ignored;
                }
                if self.mode == Mode::Marker {
                    let number = view.next_marker_number();
                    view.annotations.push(Annotation::Marker {
                        position: at,
                        number,
                    });
                    PointerOutcome::Commit
                } else {
                    let text = self.label_text.trim();
                    if text.is_empty() {
                        debug!("Label ignored: no text");
                        return PointerOutcome::Ignored;
                    }
                    view.annotations.push(Annotation::Label {
                        position: at,
                        text: text.to_string(),
                    });
                    PointerOutcome::Commit
                }
            }
            Gesture::Arrow { from, .. } => {
                let to = geom.to_image(view, p);
                if from.distance(to) < 1.0 {
                    debug!("Arrow ignored: too short");
                    return PointerOutcome::Ignored;
                }
                view.annotations.push(Annotation::Arrow { from, to });
                PointerOutcome::Commit
            }
        }
    }

    /// The pointer left the surface: drop the gesture without committing.
    ///
    /// Live pan/zoom changes are rolled back so the view matches the last
    /// history entry again.
    pub fn pointer_leave(&mut self, view: &mut ViewState) -> PointerOutcome {
        if !self.pointer_down {
            return PointerOutcome::Ignored;
        }
        self.pointer_down = false;
        match self.gesture.take() {
            Some(Gesture::Drag {
                before_viewport,
                before_zoom,
                ..
            }) => {
                if view.viewport == before_viewport {
                    return PointerOutcome::Ignored;
                }
                view.viewport = before_viewport;
                view.zoom = before_zoom;
                PointerOutcome::Redraw
            }
            Some(Gesture::Crop { .. }) => PointerOutcome::Overlay,
            Some(Gesture::Blur(_)) | Some(Gesture::Arrow { .. }) => PointerOutcome::Redraw,
            Some(Gesture::Point(_)) | None => PointerOutcome::Ignored,
        }
    }

    fn finish_crop(
        &self,
        view: &mut ViewState,
        geom: &DisplayGeometry,
        start: Point,
        end: Point,
    ) -> PointerOutcome {
        let selection = Rect::from_corners(start, end);
        if selection.width < self.min_crop_display_px || selection.height < self.min_crop_display_px
        {
            debug!(selection = %selection, "Crop selection too small");
            return PointerOutcome::Overlay;
        }
        let a = geom.to_image(view, start);
        let b = geom.to_image(view, end);
        match view.crop_to(Rect::from_corners(a, b), geom.bounds) {
            Ok(()) => PointerOutcome::Commit,
            Err(e) => {
                debug!(error = %e, "Crop ignored");
                PointerOutcome::Overlay
            }
        }
    }
}
