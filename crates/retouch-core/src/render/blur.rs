use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use ndarray::Array2;
use rayon::prelude::*;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::consts::{MAX_DIRECT_BLUR_SIGMA, PARALLEL_PIXEL_THRESHOLD};
use crate::state::BlurStroke;

/// Blur the pixels under one brush stroke, in place.
///
/// The stroke must already be in `buf` coordinates. Only the stroke's
/// bounding box (plus the kernel margin) is blurred, and the result is
/// blended back through an antialiased mask of the brush path, so pixels
/// outside the stroke are left untouched.
pub fn apply_blur_stroke(buf: &mut RgbaImage, stroke: &BlurStroke) {
    let Some(bounds) = stroke.bounds() else {
        return;
    };
    let (bw, bh) = buf.dimensions();
    // Kernel never wider than the buffer.
    let sigma = stroke_sigma(stroke).min(bw.max(bh) as f32 / 3.0).max(0.5);
    let margin = (sigma * 3.0).ceil() as f64;

    let x0 = (bounds.x - margin).floor().max(0.0) as u32;
    let y0 = (bounds.y - margin).floor().max(0.0) as u32;
    let x1 = ((bounds.right() + margin).ceil().max(0.0) as u32).min(bw);
    let y1 = ((bounds.bottom() + margin).ceil().max(0.0) as u32).min(bh);
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let (w, h) = (x1 - x0, y1 - y0);

    let Some(mask) = stroke_mask(stroke, x0 as f32, y0 as f32, w, h) else {
        return;
    };
    let region = imageops::crop_imm(&*buf, x0, y0, w, h).to_image();
    let blurred = blur_region(&region, sigma);

    for (i, &alpha) in mask.iter().enumerate() {
        if alpha == 0 {
            continue;
        }
        let coverage = alpha as f32 / 255.0;
        let (col, row) = (i as u32 % w, i as u32 / w);
        let soft = blurred.get_pixel(col, row);
        let px = buf.get_pixel_mut(x0 + col, y0 + row);
        for c in 0..4 {
            let orig = px.0[c] as f32;
            let target = soft.0[c] as f32;
            px.0[c] = (orig + (target - orig) * coverage).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Gaussian sigma for a stroke; never below half a pixel.
pub fn stroke_sigma(stroke: &BlurStroke) -> f32 {
    (stroke.strength * stroke.radius).max(0.5)
}

/// Downsample factor and the sigma to convolve with at that scale.
pub fn blur_plan(sigma: f32) -> (u32, f32) {
    let factor = (sigma / MAX_DIRECT_BLUR_SIGMA).ceil().max(1.0) as u32;
    (factor, sigma / factor as f32)
}

/// Gaussian blur of an RGBA region. Wide blurs run on a shrunken copy and
/// are scaled back up, which keeps the kernel short.
fn blur_region(region: &RgbaImage, sigma: f32) -> RgbaImage {
    let (factor, scaled_sigma) = blur_plan(sigma);
    if factor == 1 {
        return blur_rgba(region, sigma);
    }
    let (w, h) = region.dimensions();
    let small = imageops::resize(
        region,
        (w / factor).max(1),
        (h / factor).max(1),
        FilterType::Triangle,
    );
    let soft = blur_rgba(&small, scaled_sigma);
    imageops::resize(&soft, w, h, FilterType::Triangle)
}

fn blur_rgba(img: &RgbaImage, sigma: f32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let channels: Vec<Array2<f32>> = (0..4)
        .map(|c| {
            let plane = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                img.get_pixel(col as u32, row as u32).0[c] as f32
            });
            gaussian_blur_array(&plane, sigma)
        })
        .collect();
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba(std::array::from_fn(|c| {
            channels[c][[y as usize, x as usize]].round().clamp(0.0, 255.0) as u8
        }))
    })
}

/// Coverage mask (one byte per pixel) of the brush path inside a region.
fn stroke_mask(stroke: &BlurStroke, ox: f32, oy: f32, w: u32, h: u32) -> Option<Vec<u8>> {
    let mut pixmap = Pixmap::new(w, h)?;
    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = true;

    let first = stroke.points.first()?;
    let radius = stroke.radius.max(0.5);
    if stroke.points.len() == 1 {
        let circle = PathBuilder::from_circle(first.x as f32 - ox, first.y as f32 - oy, radius)?;
        pixmap.fill_path(
            &circle,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    } else {
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32 - ox, first.y as f32 - oy);
        for p in &stroke.points[1..] {
            pb.line_to(p.x as f32 - ox, p.y as f32 - oy);
        }
        let path = pb.finish()?;
        let brush = Stroke {
            width: radius * 2.0,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &brush, Transform::identity(), None);
    }

    Some(pixmap.pixels().iter().map(|p| p.alpha()).collect())
}

/// Separable Gaussian blur of a single channel, edges clamped.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as i32;
    let s2 = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|x| (-((x * x) as f32) / s2).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let sample = |row: usize, col: usize| {
        kernel.iter().enumerate().fold(0.0f32, |sum, (ki, &kv)| {
            let src_col = (col as isize + ki as isize - radius as isize)
                .clamp(0, w as isize - 1) as usize;
            sum + data[[row, src_col]] * kv
        })
    };

    let rows: Vec<f32> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h)
            .into_par_iter()
            .flat_map_iter(|row| (0..w).map(move |col| sample(row, col)))
            .collect()
    } else {
        (0..h)
            .flat_map(|row| (0..w).map(move |col| sample(row, col)))
            .collect()
    };
    Array2::from_shape_vec((h, w), rows).unwrap_or_else(|_| data.clone())
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let sample = |row: usize, col: usize| {
        kernel.iter().enumerate().fold(0.0f32, |sum, (ki, &kv)| {
            let src_row = (row as isize + ki as isize - radius as isize)
                .clamp(0, h as isize - 1) as usize;
            sum + data[[src_row, col]] * kv
        })
    };

    let rows: Vec<f32> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h)
            .into_par_iter()
            .flat_map_iter(|row| (0..w).map(move |col| sample(row, col)))
            .collect()
    } else {
        (0..h)
            .flat_map(|row| (0..w).map(move |col| sample(row, col)))
            .collect()
    };
    Array2::from_shape_vec((h, w), rows).unwrap_or_else(|_| data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized() {
        let k = make_gaussian_kernel(2.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(k.len() % 2, 1);
    }

    #[test]
    fn test_wide_blur_keeps_kernel_short() {
        assert_eq!(blur_plan(3.0), (1, 3.0));
        let (factor, sigma) = blur_plan(6_000.0);
        assert!(factor > 1);
        assert!(sigma <= MAX_DIRECT_BLUR_SIGMA);
        let taps = make_gaussian_kernel(sigma).len();
        assert!(taps <= 2 * (MAX_DIRECT_BLUR_SIGMA * 3.0).ceil() as usize + 1);
    }

    #[test]
    fn test_blur_of_constant_is_constant() {
        let data = Array2::from_elem((9, 11), 42.0f32);
        let out = gaussian_blur_array(&data, 1.5);
        for v in out.iter() {
            assert!((*v - 42.0).abs() < 1e-3);
        }
    }
}
