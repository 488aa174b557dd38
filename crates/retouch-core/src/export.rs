use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExportConfig;
use crate::error::{Result, RetouchError};
use crate::render::{RenderQuality, RenderTarget, Renderer};
use crate::source::ImageSource;
use crate::state::ViewState;

/// Encoded output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    #[default]
    Jpeg,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// Guess from a path extension; unknown extensions give `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }
}

/// An encoded export, ready to hand to the surrounding form.
#[derive(Clone, Debug)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Render `view` at native resolution and encode it. `view` is not modified.
pub fn export_image(
    source: &ImageSource,
    view: &ViewState,
    config: &ExportConfig,
    renderer: &Renderer,
) -> Result<ExportedImage> {
    let frame = renderer.render(Some(source), view, RenderTarget::Native, RenderQuality::High);
    let (width, height) = frame.dimensions();
    let bytes = encode(&frame, config.format, config.quality)?;
    if bytes.is_empty() {
        return Err(RetouchError::Export("encoder produced no data".into()));
    }

    let file_name = edit_file_name(source.file_name(), config.format);
    info!(
        file = %file_name,
        width,
        height,
        bytes = bytes.len(),
        "Image exported"
    );
    Ok(ExportedImage {
        bytes,
        mime: config.format.mime(),
        file_name,
        width,
        height,
    })
}

/// Encode an RGBA frame. JPEG output is flattened onto white.
pub fn encode(frame: &RgbaImage, format: ExportFormat, quality: u8) -> Result<Vec<u8>> {
    let (w, h) = frame.dimensions();
    let mut buf = Cursor::new(Vec::new());
    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut buf)
                .write_image(frame.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(|e| RetouchError::Export(e.to_string()))?;
        }
        ExportFormat::Jpeg => {
            let rgb = flatten_on_white(frame);
            JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
                .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(|e| RetouchError::Export(e.to_string()))?;
        }
    }
    Ok(buf.into_inner())
}

fn flatten_on_white(frame: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, a] = frame.get_pixel(x, y).0;
        let alpha = a as u16;
        let mix = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([mix(r), mix(g), mix(b)])
    })
}

/// `<base>_edit.<ext>`, where `base` is `original` without its extension.
pub fn edit_file_name(original: &str, format: ExportFormat) -> String {
    let trimmed = original.trim();
    let base = match trimmed.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => trimmed,
    };
    let base = if base.is_empty() { "image" } else { base };
    format!("{base}_edit.{}", format.extension())
}
