#[allow(dead_code)]
mod common;

use image::Rgba;

use retouch_core::config::AnnotationStyle;
use retouch_core::consts::PLACEHOLDER_RGBA;
use retouch_core::geometry::{Point, Rect, Rotation, Size};
use retouch_core::render::{RenderQuality, RenderTarget, Renderer};
use retouch_core::source::ImageSource;
use retouch_core::state::{Annotation, BlurStroke, ViewState};

fn renderer() -> Renderer {
    Renderer::new(AnnotationStyle::default())
}

fn marker_color() -> Rgba<u8> {
    Rgba(AnnotationStyle::default().marker_fill)
}

// ---------------------------------------------------------------------------
// Placeholder / crop / scale
// ---------------------------------------------------------------------------

#[test]
fn test_render_without_source_is_placeholder() {
    let view = ViewState::new(Rect::from_size(10, 10));
    let out = renderer().render(
        None,
        &view,
        RenderTarget::Fit(Size::new(320.0, 240.0)),
        RenderQuality::High,
    );
    assert_eq!(out.dimensions(), (320, 240));
    assert!(out.pixels().all(|p| p.0 == PLACEHOLDER_RGBA));
}

#[test]
fn test_native_render_is_the_viewport() {
    let source = common::coord_source(200, 100);
    let mut view = ViewState::new(source.bounds());
    view.viewport = Rect::new(20.0, 10.0, 50.0, 40.0);

    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(out.dimensions(), (50, 40));
    assert_eq!(*out.get_pixel(0, 0), common::coord_color(20, 10));
    assert_eq!(*out.get_pixel(49, 39), common::coord_color(69, 49));
}

#[test]
fn test_fractional_viewport_renders_snapped_pixels() {
    let source = common::coord_source(200, 100);
    let mut view = ViewState::new(source.bounds());
    view.viewport = Rect::new(20.4, 9.6, 50.0, 40.0);

    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(out.dimensions(), (50, 40));
    assert_eq!(*out.get_pixel(0, 0), common::coord_color(20, 10));
}

#[test]
fn test_fit_render_has_exact_target_size() {
    let source = common::coord_source(200, 100);
    let view = ViewState::new(source.bounds());
    let out = renderer().render(
        Some(&source),
        &view,
        RenderTarget::Fit(Size::new(100.0, 50.0)),
        RenderQuality::Fast,
    );
    assert_eq!(out.dimensions(), (100, 50));
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

#[test]
fn test_quarter_turn_swaps_dimensions_and_moves_pixels_clockwise() {
    let source = common::coord_source(40, 30);
    let mut view = ViewState::new(source.bounds());
    view.rotation = Rotation::Deg90;

    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(out.dimensions(), (30, 40));
    // The bottom-left source pixel becomes the top-left frame pixel.
    assert_eq!(*out.get_pixel(0, 0), common::coord_color(0, 29));
    assert_eq!(*out.get_pixel(29, 0), common::coord_color(0, 0));
}

#[test]
fn test_four_quarter_turns_render_identical_pixels() {
    let source = common::coord_source(64, 48);
    let mut view = ViewState::new(source.bounds());
    for _ in 0..4 {
        view.rotate_clockwise();
    }
    assert_eq!(view.rotation, Rotation::Deg0);
    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(out.as_raw(), source.bitmap().as_raw());
}

// ---------------------------------------------------------------------------
// Blur
// ---------------------------------------------------------------------------

#[test]
fn test_blur_is_localized_to_the_stroke() {
    let source = ImageSource::from_rgba(common::stripes_image(200, 200, 2), "stripes.png");
    let mut view = ViewState::new(source.bounds());
    view.blur_strokes.push(BlurStroke {
        points: vec![Point::new(40.0, 40.0), Point::new(60.0, 40.0)],
        radius: 10.0,
        strength: 0.35,
    });

    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);

    // Under the stroke the stripes are smeared towards grey.
    let center = out.get_pixel(50, 40);
    assert!(center.0[0] > 40 && center.0[0] < 215, "pixel not blurred: {center:?}");

    // Far away nothing changed.
    for &(x, y) in &[(150u32, 150u32), (10, 120), (190, 10)] {
        assert_eq!(out.get_pixel(x, y), source.bitmap().get_pixel(x, y));
    }
}

#[test]
fn test_blur_outside_viewport_is_harmless() {
    let source = common::coord_source(100, 100);
    let mut view = ViewState::new(source.bounds());
    view.viewport = Rect::new(0.0, 0.0, 40.0, 40.0);
    view.blur_strokes.push(BlurStroke {
        points: vec![Point::new(90.0, 90.0)],
        radius: 5.0,
        strength: 0.5,
    });
    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(*out.get_pixel(20, 20), common::coord_color(20, 20));
}

#[test]
fn test_huge_brush_blurs_whole_image() {
    let source = ImageSource::from_rgba(common::stripes_image(200, 200, 2), "stripes.png");
    let mut view = ViewState::new(source.bounds());
    view.blur_strokes.push(BlurStroke {
        points: vec![Point::new(100.0, 100.0)],
        radius: 20_000.0,
        strength: 1.0,
    });

    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(out.dimensions(), (200, 200));
    for &(x, y) in &[(100u32, 100u32), (20, 180), (180, 20)] {
        let v = out.get_pixel(x, y).0[0];
        assert!(v > 90 && v < 165, "stripes not smoothed at ({x}, {y}): {v}");
    }
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

#[test]
fn test_marker_follows_rotation() {
    let source = ImageSource::from_rgba(common::grey_image(400, 300), "grey.png");
    let mut view = ViewState::new(source.bounds());
    view.annotations.push(Annotation::Marker {
        position: Point::new(100.0, 100.0),
        number: 1,
    });
    view.rotate_clockwise();

    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(out.dimensions(), (300, 400));

    // (100, 100) in a 400x300 image lands at (200, 100) after a clockwise turn.
    let rotated = *out.get_pixel(195, 100);
    assert!(common::pixel_diff(rotated, marker_color()) <= 2, "{rotated:?}");

    // Nothing is drawn at the unrotated position.
    assert_eq!(*out.get_pixel(95, 100), Rgba([128, 128, 128, 255]));
}

#[test]
fn test_arrow_is_drawn_along_its_shaft() {
    let source = ImageSource::from_rgba(common::grey_image(400, 300), "grey.png");
    let mut view = ViewState::new(source.bounds());
    view.annotations.push(Annotation::Arrow {
        from: Point::new(50.0, 150.0),
        to: Point::new(350.0, 150.0),
    });
    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    let mid = *out.get_pixel(200, 150);
    assert!(common::pixel_diff(mid, Rgba(AnnotationStyle::default().arrow_color)) <= 2);
    assert_eq!(*out.get_pixel(200, 100), Rgba([128, 128, 128, 255]));
}

#[test]
fn test_label_draws_background_box() {
    let source = ImageSource::from_rgba(common::grey_image(400, 300), "grey.png");
    let mut view = ViewState::new(source.bounds());
    view.annotations.push(Annotation::Label {
        position: Point::new(100.0, 100.0),
        text: "Hi".into(),
    });
    let out = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    // The padding left of the text is covered by the translucent dark box.
    let pad = *out.get_pixel(98, 104);
    assert!(pad.0[0] < 100, "{pad:?}");
}

#[test]
fn test_render_does_not_touch_view_state() {
    let source = common::coord_source(100, 80);
    let mut view = ViewState::new(source.bounds());
    view.annotations.push(Annotation::Marker {
        position: Point::new(10.0, 10.0),
        number: 1,
    });
    let before = view.clone();
    let _ = renderer().render(Some(&source), &view, RenderTarget::Native, RenderQuality::High);
    assert_eq!(view, before);
}
