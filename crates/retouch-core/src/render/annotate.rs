//! Annotation drawing in frame space, using tiny-skia for shapes and an
//! 8x8 bitmap font for numbers and labels.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::config::AnnotationStyle;
use crate::consts::ANNOTATION_REFERENCE_SIDE;
use crate::geometry::Point;
use crate::state::Annotation;

const HEAD_ANGLE: f32 = std::f32::consts::PI / 6.0;
const MIN_ARROW_LENGTH: f32 = 1.0;
const GLYPH_SIDE: i32 = 8;
const LABEL_PADDING: i32 = 4;

/// Style sizes scaled to the rendered frame.
#[derive(Clone, Debug)]
pub struct ScaledStyle {
    pub style: AnnotationStyle,
    pub marker_radius: f32,
    pub marker_glyph_scale: u32,
    pub label_glyph_scale: u32,
    pub arrow_width: f32,
    pub arrow_head: f32,
}

impl ScaledStyle {
    pub fn for_frame(style: &AnnotationStyle, frame_w: u32, frame_h: u32) -> Self {
        let k = (frame_w.max(frame_h) as f32 / ANNOTATION_REFERENCE_SIDE).max(0.5);
        let marker_radius = (style.marker_radius * k).max(3.0);
        Self {
            style: style.clone(),
            marker_radius,
            marker_glyph_scale: ((marker_radius * 1.2) / GLYPH_SIDE as f32).round().max(1.0) as u32,
            label_glyph_scale: ((style.label_scale as f32) * k).round().max(1.0) as u32,
            arrow_width: (style.arrow_width * k).max(1.0),
            arrow_head: (style.arrow_head * k).max(3.0),
        }
    }
}

/// Draw annotations whose coordinates are already in `img` (frame) space.
pub fn draw_annotations(img: &mut RgbaImage, annotations: &[Annotation], style: &ScaledStyle) {
    if annotations.is_empty() {
        return;
    }

    with_pixmap(img, |pixmap| {
        for ann in annotations {
            match ann {
                Annotation::Marker { position, .. } => draw_marker_disc(pixmap, *position, style),
                Annotation::Arrow { from, to } => draw_arrow(pixmap, *from, *to, style),
                Annotation::Label { position, text } => {
                    draw_label_background(pixmap, *position, text, style)
                }
            }
        }
    });

    for ann in annotations {
        match ann {
            Annotation::Marker { position, number } => {
                let text = number.to_string();
                let scale = style.marker_glyph_scale as i32;
                let (tw, th) = text_extent(&text, scale);
                draw_bitmap_text(
                    img,
                    position.x.round() as i32 - tw / 2,
                    position.y.round() as i32 - th / 2,
                    &text,
                    Rgba(style.style.marker_text),
                    scale,
                );
            }
            Annotation::Label { position, text } => {
                draw_bitmap_text(
                    img,
                    position.x.round() as i32,
                    position.y.round() as i32,
                    text,
                    Rgba(style.style.label_text),
                    style.label_glyph_scale as i32,
                );
            }
            Annotation::Arrow { .. } => {}
        }
    }
}

/// Run `f` on a premultiplied copy of `img`, then write the result back.
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = img.dimensions();
    let Some(size) = IntSize::from_wh(w, h) else {
        return;
    };
    let mut data = Vec::with_capacity(img.as_raw().len());
    for px in img.pixels() {
        let [r, g, b, a] = px.0;
        let c = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let Some(mut pixmap) = Pixmap::from_vec(data, size) else {
        return;
    };

    f(&mut pixmap);

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
}

fn paint_for(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = true;
    paint
}

fn draw_marker_disc(pixmap: &mut Pixmap, at: Point, style: &ScaledStyle) {
    if let Some(circle) = PathBuilder::from_circle(at.x as f32, at.y as f32, style.marker_radius) {
        pixmap.fill_path(
            &circle,
            &paint_for(style.style.marker_fill),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn draw_label_background(pixmap: &mut Pixmap, at: Point, text: &str, style: &ScaledStyle) {
    let Some(bg) = style.style.label_background else {
        return;
    };
    let (tw, th) = text_extent(text, style.label_glyph_scale as i32);
    if tw == 0 {
        return;
    }
    let pad = LABEL_PADDING * style.label_glyph_scale as i32;
    if let Some(rect) = tiny_skia::Rect::from_xywh(
        (at.x.round() as i32 - pad) as f32,
        (at.y.round() as i32 - pad) as f32,
        (tw + 2 * pad) as f32,
        (th + 2 * pad) as f32,
    ) {
        pixmap.fill_rect(rect, &paint_for(bg), Transform::identity(), None);
    }
}

fn draw_arrow(pixmap: &mut Pixmap, from: Point, to: Point, style: &ScaledStyle) {
    let (sx, sy, ex, ey) = (from.x as f32, from.y as f32, to.x as f32, to.y as f32);
    let Some((h1x, h1y, h2x, h2y)) = arrow_head_points(sx, sy, ex, ey, style.arrow_head) else {
        return;
    };

    let mut pb = PathBuilder::new();
    pb.move_to(sx, sy);
    pb.line_to(ex, ey);
    pb.move_to(ex, ey);
    pb.line_to(h1x, h1y);
    pb.move_to(ex, ey);
    pb.line_to(h2x, h2y);
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width: style.arrow_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(
        &path,
        &paint_for(style.style.arrow_color),
        &stroke,
        Transform::identity(),
        None,
    );
}

/// End points of the two arrow-head strokes, or `None` for a degenerate arrow.
pub fn arrow_head_points(
    start_x: f32,
    start_y: f32,
    end_x: f32,
    end_y: f32,
    head_size: f32,
) -> Option<(f32, f32, f32, f32)> {
    let dx = end_x - start_x;
    let dy = end_y - start_y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < MIN_ARROW_LENGTH {
        return None;
    }
    let back = dy.atan2(dx) + std::f32::consts::PI;
    let a1 = back - HEAD_ANGLE;
    let a2 = back + HEAD_ANGLE;
    Some((
        end_x + a1.cos() * head_size,
        end_y + a1.sin() * head_size,
        end_x + a2.cos() * head_size,
        end_y + a2.sin() * head_size,
    ))
}

/// Width and height in pixels of `text` at `scale` (longest line).
pub fn text_extent(text: &str, scale: i32) -> (i32, i32) {
    let scale = scale.max(1);
    let lines: Vec<&str> = text.split('\n').collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
    (longest * GLYPH_SIDE * scale, lines.len() as i32 * GLYPH_SIDE * scale)
}

fn draw_bitmap_text(img: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>, scale: i32) {
    let scale = scale.max(1);
    let (w, h) = (img.width() as i32, img.height() as i32);
    let mut cursor_x = x;
    let mut cursor_y = y;
    for ch in text.chars() {
        if ch == '\n' {
            cursor_x = x;
            cursor_y += GLYPH_SIDE * scale;
            continue;
        }
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += GLYPH_SIDE * scale;
            continue;
        };
        for (row_idx, row_bits) in glyph.iter().enumerate() {
            for col_idx in 0..GLYPH_SIDE {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = cursor_y + row_idx as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        let (tx, ty) = (px + sx, py + sy);
                        if tx >= 0 && ty >= 0 && tx < w && ty < h {
                            let dst = img.get_pixel_mut(tx as u32, ty as u32);
                            *dst = blend_pixel(*dst, color);
                        }
                    }
                }
            }
        }
        cursor_x += GLYPH_SIDE * scale;
    }
}

/// Source-over blend of straight-alpha colours.
fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src.0[3] as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = src.0[c] as f32 / 255.0;
        let d = dst.0[c] as f32 / 255.0;
        let v = (s * sa + d * da * (1.0 - sa)) / out_a.max(f32::EPSILON);
        out[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}
