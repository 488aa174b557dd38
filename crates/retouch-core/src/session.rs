use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info};

use crate::action::{ApplyOutcome, EditAction};
use crate::config::{BlurConfig, EditorConfig};
use crate::controller::{DisplayGeometry, InteractionController, Mode, PointerOutcome};
use crate::error::{Result, RetouchError};
use crate::export::{export_image, ExportedImage};
use crate::geometry::{fit_display_size, FrameTransform, Point, Rect, Size};
use crate::history::{HistoryEntry, HistoryManager};
use crate::render::{RenderQuality, RenderTarget, Renderer};
use crate::source::ImageSource;
use crate::state::{Annotation, BlurStroke, ViewState};

/// Default layout box for the display surface.
const DEFAULT_LAYOUT: Size = Size::new(800.0, 600.0);

/// One loaded image and everything done to it.
#[derive(Debug)]
pub struct EditSession {
    source: Arc<ImageSource>,
    view: ViewState,
    history: HistoryManager,
    controller: InteractionController,
    renderer: Renderer,
    config: EditorConfig,
    layout: Size,
}

impl EditSession {
    pub fn new(source: ImageSource, config: EditorConfig) -> Self {
        let source = Arc::new(source);
        let view = ViewState::new(source.bounds());
        let mut history = HistoryManager::new(config.max_history);
        history.push(HistoryEntry::new(view.clone(), Arc::clone(&source)));
        info!(
            file = source.file_name(),
            width = source.width(),
            height = source.height(),
            "Edit session started"
        );
        Self {
            source,
            view,
            history,
            controller: InteractionController::new(&config),
            renderer: Renderer::new(config.style.clone()),
            config,
            layout: DEFAULT_LAYOUT,
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.controller.set_mode(mode);
    }

    pub fn set_label_text(&mut self, text: impl Into<String>) {
        self.controller.set_label_text(text);
    }

    pub fn set_blur_brush(&mut self, blur: BlurConfig) {
        self.controller.set_blur_brush(blur);
    }

    /// Shared handle to the base image, for encoding off the UI thread.
    pub fn shared_source(&self) -> Arc<ImageSource> {
        Arc::clone(&self.source)
    }

    /// Set the layout box the display surface is fitted into.
    pub fn set_layout(&mut self, layout: Size) {
        self.layout = Size::new(layout.width.max(1.0), layout.height.max(1.0));
    }

    /// Display surface size for the current view.
    pub fn display_size(&self) -> Size {
        let bounds = self.source.bounds();
        let frame = FrameTransform::new(self.view.viewport.snapped(&bounds), self.view.rotation)
            .frame_size();
        fit_display_size(frame, self.layout)
    }

    pub fn display_geometry(&self) -> DisplayGeometry {
        DisplayGeometry::new(self.source.bounds(), self.display_size())
    }

    /// Render the display surface, including any gesture in progress.
    pub fn render_display(&self, quality: RenderQuality) -> RgbaImage {
        let view = self.controller.preview(&self.view);
        self.renderer.render(
            Some(&self.source),
            &view,
            RenderTarget::Fit(self.display_size()),
            quality,
        )
    }

    /// Display render of the settled view, cached on the current history entry.
    ///
    /// Undo and redo land on entries that keep their cached render, so going
    /// back redisplays without rendering again. Renders made mid-gesture or
    /// at `Fast` quality are never cached.
    pub fn display_image(&mut self, quality: RenderQuality) -> Arc<RgbaImage> {
        let settled = !self.controller.is_pointer_down();
        let wanted = self.display_size().to_pixels();
        if settled {
            let cached = self
                .history
                .current()
                .filter(|e| e.view == self.view && Arc::ptr_eq(&e.source, &self.source))
                .and_then(|e| e.preview.clone())
                .filter(|img| img.dimensions() == wanted);
            if let Some(image) = cached {
                return image;
            }
        }
        let image = Arc::new(self.render_display(quality));
        if settled && quality == RenderQuality::High {
            self.history.set_current_preview(Arc::clone(&image));
        }
        image
    }

    /// Encode the full-resolution render with the configured format.
    pub fn export(&self) -> Result<ExportedImage> {
        export_image(&self.source, &self.view, &self.config.export, &self.renderer)
    }

    /// Apply a discrete edit. Geometrically invalid edits are ignored.
    pub fn apply(&mut self, action: EditAction) -> Result<ApplyOutcome> {
        if !action.is_finite() {
            debug!(?action, "Edit ignored: non-finite value");
            return Ok(ApplyOutcome::Ignored);
        }
        let bounds = self.source.bounds();

        let result = match action {
            EditAction::Undo => return Ok(self.undo()),
            EditAction::Redo => return Ok(self.redo()),
            EditAction::Bake => return self.bake(),
            EditAction::RotateClockwise => {
                self.view.rotate_clockwise();
                Ok(())
            }
            EditAction::RotateCounterClockwise => {
                self.view.rotate_counter_clockwise();
                Ok(())
            }
            EditAction::ZoomIn => {
                self.view
                    .zoom_by(self.config.zoom.step, None, bounds, &self.config.zoom)
            }
            EditAction::ZoomOut => {
                self.view
                    .zoom_by(1.0 / self.config.zoom.step, None, bounds, &self.config.zoom)
            }
            EditAction::ZoomReset => changed(self.view.reset_zoom(), "zoom already reset"),
            EditAction::Pan { dx, dy } => {
                changed(self.view.pan_by(dx, dy, bounds), "viewport pinned at bounds")
            }
            EditAction::Crop {
                x,
                y,
                width,
                height,
            } => self.view.crop_to(Rect::new(x, y, width, height), bounds),
            EditAction::Blur {
                points,
                radius,
                strength,
            } => {
                let stroke = BlurStroke {
                    points,
                    radius: radius.unwrap_or(self.config.blur.radius),
                    strength: strength.unwrap_or(self.config.blur.strength),
                };
                self.add_blur(stroke)
            }
            EditAction::Marker { x, y } => {
                let number = self.view.next_marker_number();
                self.add_annotation(Annotation::Marker {
                    position: Point::new(x, y),
                    number,
                })
            }
            EditAction::Label { x, y, text } => {
                if text.trim().is_empty() {
                    Err(RetouchError::Input("label text is empty".into()))
                } else {
                    self.add_annotation(Annotation::Label {
                        position: Point::new(x, y),
                        text,
                    })
                }
            }
            EditAction::Arrow { from, to } => {
                if from.distance(to) < 1.0 {
                    Err(RetouchError::Geometry("arrow shorter than one pixel".into()))
                } else {
                    self.add_annotation(Annotation::Arrow { from, to })
                }
            }
            EditAction::ClearBlur => {
                let had = !self.view.blur_strokes.is_empty();
                self.view.blur_strokes.clear();
                changed(had, "no blur strokes")
            }
            EditAction::ClearAnnotations => {
                let had = !self.view.annotations.is_empty();
                self.view.annotations.clear();
                changed(had, "no annotations")
            }
            EditAction::ResetAll => {
                let fresh = ViewState::new(bounds);
                let had = self.view != fresh;
                self.view.reset(bounds);
                changed(had, "nothing to reset")
            }
        };

        match result {
            Ok(()) => {
                self.commit();
                Ok(ApplyOutcome::Committed)
            }
            Err(RetouchError::Geometry(reason)) => {
                debug!(%reason, "Edit ignored");
                Ok(ApplyOutcome::Ignored)
            }
            Err(e) => Err(e),
        }
    }

    pub fn pointer_down(&mut self, p: Point) -> PointerOutcome {
        if !p.is_finite() {
            return PointerOutcome::Ignored;
        }
        let geom = self.display_geometry();
        let outcome = self.controller.pointer_down(&mut self.view, &geom, p);
        self.settle(outcome)
    }

    pub fn pointer_move(&mut self, p: Point) -> PointerOutcome {
        if !p.is_finite() {
            return PointerOutcome::Ignored;
        }
        let geom = self.display_geometry();
        let outcome = self.controller.pointer_move(&mut self.view, &geom, p);
        self.settle(outcome)
    }

    pub fn pointer_up(&mut self, p: Point) -> PointerOutcome {
        if !p.is_finite() {
            return PointerOutcome::Ignored;
        }
        let geom = self.display_geometry();
        let outcome = self.controller.pointer_up(&mut self.view, &geom, p);
        self.settle(outcome)
    }

    pub fn pointer_leave(&mut self) -> PointerOutcome {
        let outcome = self.controller.pointer_leave(&mut self.view);
        self.settle(outcome)
    }

    fn settle(&mut self, outcome: PointerOutcome) -> PointerOutcome {
        if outcome == PointerOutcome::Commit {
            self.commit();
        }
        outcome
    }

    fn commit(&mut self) {
        let entry = HistoryEntry::new(self.view.clone(), Arc::clone(&self.source));
        self.history.push(entry);
        debug!(entries = self.history.len(), "History entry pushed");
    }

    fn undo(&mut self) -> ApplyOutcome {
        match self.history.undo() {
            Some(entry) => {
                self.restore(entry);
                ApplyOutcome::Committed
            }
            None => {
                info!("Nothing to undo");
                ApplyOutcome::Ignored
            }
        }
    }

    fn redo(&mut self) -> ApplyOutcome {
        match self.history.redo() {
            Some(entry) => {
                self.restore(entry);
                ApplyOutcome::Committed
            }
            None => {
                info!("Nothing to redo");
                ApplyOutcome::Ignored
            }
        }
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.view = entry.view;
        self.source = entry.source;
    }

    fn add_blur(&mut self, stroke: BlurStroke) -> Result<()> {
        if stroke.points.is_empty() {
            return Err(RetouchError::Geometry("blur stroke has no points".into()));
        }
        let longest = self.source.width().max(self.source.height()) as f32;
        if stroke.radius <= 0.0
            || stroke.radius > longest
            || stroke.strength <= 0.0
            || stroke.strength > 1.0
        {
            return Err(RetouchError::Geometry(format!(
                "invalid blur brush radius={} strength={} (radius up to {longest}, strength in (0, 1])",
                stroke.radius, stroke.strength
            )));
        }
        self.view.blur_strokes.push(stroke);
        Ok(())
    }

    fn add_annotation(&mut self, annotation: Annotation) -> Result<()> {
        let bounds = self.source.bounds();
        let inside = match &annotation {
            Annotation::Marker { position, .. } | Annotation::Label { position, .. } => {
                bounds.contains(*position)
            }
            Annotation::Arrow { from, to } => bounds.contains(*from) && bounds.contains(*to),
        };
        if !inside {
            return Err(RetouchError::Geometry("annotation outside the image".into()));
        }
        self.view.annotations.push(annotation);
        Ok(())
    }

    /// Resample viewport, rotation and blur into a new base image.
    fn bake(&mut self) -> Result<ApplyOutcome> {
        let bounds = self.source.bounds();
        let transform = FrameTransform::new(self.view.viewport.snapped(&bounds), self.view.rotation);
        let fresh = ViewState::new(bounds);
        if self.view.viewport.snapped(&bounds) == bounds
            && self.view.rotation == fresh.rotation
            && self.view.blur_strokes.is_empty()
        {
            debug!("Bake ignored: nothing to resample");
            return Ok(ApplyOutcome::Ignored);
        }

        let frame = self.renderer.render_frame(&self.source, &self.view, false);
        let baked = ImageSource::from_rgba(frame, self.source.file_name());
        let annotations = self
            .view
            .annotations
            .iter()
            .map(|a| a.map_points(|p| transform.image_to_frame(p)))
            .collect();

        info!(
            from = %bounds,
            width = baked.width(),
            height = baked.height(),
            "Edits baked into a new base image"
        );
        self.view = ViewState::new(baked.bounds());
        self.view.annotations = annotations;
        self.source = Arc::new(baked);
        self.commit();
        Ok(ApplyOutcome::Committed)
    }
}

fn changed(did_change: bool, reason: &str) -> Result<()> {
    if did_change {
        Ok(())
    } else {
        Err(RetouchError::Geometry(reason.to_string()))
    }
}
