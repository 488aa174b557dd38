//! Single composition routine shared by the display surface and export.
//!
//! Order is fixed: crop to the viewport, blur strokes, rotate, draw
//! annotations through the frame transform, then scale to the target.

pub mod annotate;
pub mod blur;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::config::AnnotationStyle;
use crate::consts::PLACEHOLDER_RGBA;
use crate::geometry::{FrameTransform, Point, Rotation, Size};
use crate::source::ImageSource;
use crate::state::{BlurStroke, ViewState};

use self::annotate::{draw_annotations, ScaledStyle};
use self::blur::apply_blur_stroke;

/// Output size of a render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderTarget {
    /// Viewport resolution, rotated. Used for export and bake.
    Native,
    /// Scaled to an exact display surface size.
    Fit(Size),
}

/// Resampling filter used for the final scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderQuality {
    /// Cheap filter for live feedback while a gesture is in progress.
    Fast,
    #[default]
    High,
}

impl RenderQuality {
    fn filter(self) -> FilterType {
        match self {
            RenderQuality::Fast => FilterType::Triangle,
            RenderQuality::High => FilterType::Lanczos3,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Renderer {
    style: AnnotationStyle,
}

impl Renderer {
    pub fn new(style: AnnotationStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Render `view` of `source` into a new buffer.
    ///
    /// Never fails: without a source a neutral placeholder is returned.
    pub fn render(
        &self,
        source: Option<&ImageSource>,
        view: &ViewState,
        target: RenderTarget,
        quality: RenderQuality,
    ) -> RgbaImage {
        let Some(source) = source else {
            let (w, h) = match target {
                RenderTarget::Fit(size) => size.to_pixels(),
                RenderTarget::Native => view.viewport.size().to_pixels(),
            };
            return placeholder(w, h);
        };

        let frame = self.render_frame(source, view, true);
        match target {
            RenderTarget::Native => frame,
            RenderTarget::Fit(size) => {
                let (w, h) = size.to_pixels();
                if frame.dimensions() == (w, h) {
                    frame
                } else {
                    imageops::resize(&frame, w, h, quality.filter())
                }
            }
        }
    }

    /// Native-resolution frame: cropped, blurred and rotated, optionally
    /// with annotations drawn on top.
    pub fn render_frame(
        &self,
        source: &ImageSource,
        view: &ViewState,
        include_annotations: bool,
    ) -> RgbaImage {
        let bounds = source.bounds();
        let viewport = view.viewport.snapped(&bounds);
        let transform = FrameTransform::new(viewport, view.rotation);

        let mut cut = imageops::crop_imm(
            source.bitmap(),
            viewport.x as u32,
            viewport.y as u32,
            viewport.width as u32,
            viewport.height as u32,
        )
        .to_image();

        for stroke in &view.blur_strokes {
            let local = BlurStroke {
                points: stroke
                    .points
                    .iter()
                    .map(|p| Point::new(p.x - viewport.x, p.y - viewport.y))
                    .collect(),
                radius: stroke.radius,
                strength: stroke.strength,
            };
            apply_blur_stroke(&mut cut, &local);
        }

        let mut frame = match view.rotation {
            Rotation::Deg0 => cut,
            Rotation::Deg90 => imageops::rotate90(&cut),
            Rotation::Deg180 => imageops::rotate180(&cut),
            Rotation::Deg270 => imageops::rotate270(&cut),
        };

        if include_annotations && !view.annotations.is_empty() {
            let placed: Vec<_> = view
                .annotations
                .iter()
                .map(|a| a.map_points(|p| transform.image_to_frame(p)))
                .collect();
            let style = ScaledStyle::for_frame(&self.style, frame.width(), frame.height());
            draw_annotations(&mut frame, &placed, &style);
        }

        debug!(
            viewport = %viewport,
            rotation = %view.rotation,
            strokes = view.blur_strokes.len(),
            annotations = view.annotations.len(),
            "Frame rendered"
        );
        frame
    }
}

/// Neutral frame shown before an image is loaded.
pub fn placeholder(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width.max(1), height.max(1), Rgba(PLACEHOLDER_RGBA))
}
