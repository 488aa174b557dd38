use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use retouch_core::config::EditorConfig;
use retouch_core::session::EditSession;
use retouch_core::source::ImageSource;

/// Colour that identifies its own coordinates, so any pixel of a render can
/// be traced back to the source pixel it came from.
pub fn coord_color(x: u32, y: u32) -> Rgba<u8> {
    Rgba([
        (x & 0xff) as u8,
        (y & 0xff) as u8,
        (((x >> 8) << 4) | (y >> 8)) as u8,
        255,
    ])
}

/// Synthetic image where every pixel is `coord_color(x, y)`.
pub fn coord_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, coord_color)
}

/// Flat mid-grey image.
pub fn grey_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
}

/// Vertical black/white stripes, `period` pixels wide each.
pub fn stripes_image(width: u32, height: u32, period: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| {
        if (x / period) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

pub fn coord_source(width: u32, height: u32) -> ImageSource {
    ImageSource::from_rgba(coord_image(width, height), "photo.png")
}

pub fn coord_session(width: u32, height: u32) -> EditSession {
    EditSession::new(coord_source(width, height), EditorConfig::default())
}

pub fn session_with(image: RgbaImage, config: EditorConfig) -> EditSession {
    EditSession::new(ImageSource::from_rgba(image, "photo.png"), config)
}

/// PNG-encode an image in memory.
pub fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Largest per-channel difference between two pixels.
pub fn pixel_diff(a: Rgba<u8>, b: Rgba<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}
