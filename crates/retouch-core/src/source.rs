use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use tracing::info;

use crate::error::{Result, RetouchError};
use crate::geometry::Rect;

/// The decoded working bitmap of an edit session.
///
/// Never mutated after construction: destructive edits (bake) build a new
/// `ImageSource` and the session swaps it in wholesale.
#[derive(Clone, Debug)]
pub struct ImageSource {
    bitmap: RgbaImage,
    file_name: String,
    /// Dimensions before the working-resolution downscale.
    original_size: (u32, u32),
}

impl ImageSource {
    /// Wrap an already decoded bitmap, downscaling it to `scale_cap`.
    pub fn from_image(image: DynamicImage, file_name: impl Into<String>, scale_cap: u32) -> Self {
        let original_size = (image.width(), image.height());
        let (w, h) = working_dimensions(original_size.0, original_size.1, scale_cap);
        let bitmap = if (w, h) == original_size {
            image.into_rgba8()
        } else {
            image.resize_exact(w, h, FilterType::Lanczos3).into_rgba8()
        };
        Self {
            bitmap,
            file_name: file_name.into(),
            original_size,
        }
    }

    /// Build a source directly from RGBA pixels, without any downscale.
    pub fn from_rgba(bitmap: RgbaImage, file_name: impl Into<String>) -> Self {
        let original_size = bitmap.dimensions();
        Self {
            bitmap,
            file_name: file_name.into(),
            original_size,
        }
    }

    /// Decode an in-memory file selected by the user.
    ///
    /// `mime` is the type reported by the picker, when known; anything that
    /// is not `image/*` is rejected before decoding.
    pub fn decode(
        bytes: &[u8],
        file_name: impl Into<String>,
        mime: Option<&str>,
        scale_cap: u32,
    ) -> Result<Self> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(RetouchError::Input("no file selected".into()));
        }
        if let Some(mime) = mime {
            if !mime.trim().to_ascii_lowercase().starts_with("image/") {
                return Err(RetouchError::Input(format!(
                    "{file_name} is not an image ({mime})"
                )));
            }
        }

        let image = image::load_from_memory(bytes)
            .map_err(|e| RetouchError::Decode(format!("{file_name}: {e}")))?;
        let source = Self::from_image(image, file_name, scale_cap);
        info!(
            file = %source.file_name,
            original = ?source.original_size,
            working = ?source.bitmap.dimensions(),
            "Image decoded"
        );
        Ok(source)
    }

    /// Load an image file from disk.
    pub fn open(path: &Path, scale_cap: u32) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.jpg")
            .to_string();
        Self::decode(&bytes, name, None, scale_cap)
    }

    /// Load an existing image for editing from a location string.
    ///
    /// Query strings and fragments are ignored when deriving the file name.
    pub fn open_existing(location: &str, scale_cap: u32) -> Result<Self> {
        let path_part = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .trim_start_matches("file://");
        let bytes = std::fs::read(path_part)?;
        Self::decode(&bytes, file_name_from_location(location), None, scale_cap)
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn original_size(&self) -> (u32, u32) {
        self.original_size
    }
}

/// Working dimensions after capping the longest side at `cap`.
pub fn working_dimensions(width: u32, height: u32, cap: u32) -> (u32, u32) {
    let longest = width.max(height);
    if cap == 0 || longest <= cap {
        return (width, height);
    }
    let scale = cap as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// File name shown for an image loaded from a URL or path.
///
/// Takes the last path segment; adds `.jpg` when it has no extension and
/// falls back to `image.jpg` when there is no usable segment.
pub fn file_name_from_location(location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or("");
    let last = path.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if last.is_empty() {
        "image.jpg".to_string()
    } else if last.contains('.') {
        last.to_string()
    } else {
        format!("{last}.jpg")
    }
}
