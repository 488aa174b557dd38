#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;

use retouch_core::action::EditAction;
use retouch_core::config::EditorConfig;
use retouch_core::controller::{DisplayGeometry, Mode, PointerOutcome};
use retouch_core::geometry::{Point, Rect, Rotation, Size};
use retouch_core::state::{Annotation, ViewState};

// A 1000x800 image in the default 800x600 layout is shown at 750x600,
// i.e. 0.75 display pixels per image pixel.
const SCALE: f64 = 0.75;

// ---------------------------------------------------------------------------
// Display mapping
// ---------------------------------------------------------------------------

#[test]
fn test_display_geometry_round_trip() {
    let bounds = Rect::from_size(1000, 800);
    for rotation in Rotation::ALL {
        let mut view = ViewState::new(bounds);
        view.viewport = Rect::new(120.0, 80.0, 500.0, 300.0);
        view.rotation = rotation;
        let display = if rotation.swaps_axes() {
            Size::new(300.0, 500.0)
        } else {
            Size::new(500.0, 300.0)
        };
        let geom = DisplayGeometry::new(bounds, display);
        for &(x, y) in &[(0.0, 0.0), (17.5, 33.25), (250.0, 150.0), (299.0, 299.0)] {
            let p = Point::new(x, y);
            let back = geom.to_display(&view, geom.to_image(&view, p));
            assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
            assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_session_display_size_fits_layout() {
    let session = common::coord_session(1000, 800);
    assert_eq!(session.display_size(), Size::new(750.0, 600.0));
}

// ---------------------------------------------------------------------------
// Crop
// ---------------------------------------------------------------------------

#[test]
fn test_crop_drag_sets_viewport_in_image_space() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Crop);

    assert_eq!(session.pointer_down(Point::new(75.0, 75.0)), PointerOutcome::Overlay);
    assert_eq!(session.pointer_move(Point::new(375.0, 300.0)), PointerOutcome::Overlay);
    let sel = session.controller().crop_selection().unwrap();
    assert_eq!(sel, Rect::new(75.0, 75.0, 300.0, 225.0));

    assert_eq!(session.pointer_up(Point::new(375.0, 300.0)), PointerOutcome::Commit);
    let vp = session.view().viewport;
    assert_abs_diff_eq!(vp.x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(vp.y, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(vp.width, 400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(vp.height, 300.0, epsilon = 1e-9);
    assert_eq!(session.history().len(), 2);
    assert!(session.controller().crop_selection().is_none());
}

#[test]
fn test_tiny_crop_selection_is_ignored() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Crop);
    session.pointer_down(Point::new(100.0, 100.0));
    session.pointer_move(Point::new(105.0, 160.0));
    assert_ne!(session.pointer_up(Point::new(105.0, 160.0)), PointerOutcome::Commit);
    assert_eq!(session.view().viewport, Rect::from_size(1000, 800));
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_leaving_surface_cancels_crop() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Crop);
    session.pointer_down(Point::new(10.0, 10.0));
    session.pointer_move(Point::new(400.0, 400.0));
    session.pointer_leave();
    assert!(!session.controller().is_pointer_down());
    assert_eq!(session.view().viewport, Rect::from_size(1000, 800));
    assert_eq!(session.history().len(), 1);
    // A release after leaving does nothing.
    assert_eq!(session.pointer_up(Point::new(400.0, 400.0)), PointerOutcome::Ignored);
}

// ---------------------------------------------------------------------------
// Pan / zoom drags
// ---------------------------------------------------------------------------

#[test]
fn test_pan_drag_moves_viewport_and_commits_once() {
    let mut session = common::coord_session(1000, 800);
    session.apply(EditAction::ZoomIn).unwrap();
    session.apply(EditAction::ZoomIn).unwrap();
    let before = session.view().viewport;
    let history_before = session.history().len();

    session.set_mode(Mode::Pan);
    session.pointer_down(Point::new(300.0, 300.0));
    for step in 1..=5 {
        let out = session.pointer_move(Point::new(300.0 + step as f64 * 4.0, 300.0));
        assert_eq!(out, PointerOutcome::Redraw);
    }
    assert_eq!(session.history().len(), history_before);
    assert_eq!(session.pointer_up(Point::new(320.0, 300.0)), PointerOutcome::Commit);
    assert_eq!(session.history().len(), history_before + 1);

    // Dragging right by 20 display px shows content further left. Snapping
    // can shift the per-move scale by a pixel, hence the loose tolerance.
    let after = session.view().viewport;
    let display_per_image = session.display_size().width / before.width;
    assert_abs_diff_eq!(before.x - after.x, 20.0 / display_per_image, epsilon = 0.5);
    assert_abs_diff_eq!(after.y, before.y, epsilon = 1e-9);
}

#[test]
fn test_pan_at_full_view_does_not_commit() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Pan);
    session.pointer_down(Point::new(300.0, 300.0));
    assert_eq!(session.pointer_move(Point::new(350.0, 320.0)), PointerOutcome::Ignored);
    assert_eq!(session.pointer_up(Point::new(350.0, 320.0)), PointerOutcome::Ignored);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_leaving_during_pan_rolls_back() {
    let mut session = common::coord_session(1000, 800);
    session.apply(EditAction::ZoomIn).unwrap();
    let before = session.view().clone();

    session.set_mode(Mode::Pan);
    session.pointer_down(Point::new(300.0, 300.0));
    session.pointer_move(Point::new(360.0, 330.0));
    assert_ne!(session.view().viewport, before.viewport);
    session.pointer_leave();
    assert_eq!(session.view(), &before);
}

#[test]
fn test_drag_zoom_up_zooms_in_and_down_zooms_out() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Zoom);
    session.pointer_down(Point::new(300.0, 300.0));
    assert_eq!(session.pointer_move(Point::new(300.0, 290.0)), PointerOutcome::Redraw);
    let zoomed = session.view().viewport;
    assert!(zoomed.width < 1000.0);
    assert_abs_diff_eq!(session.view().zoom, 1.02, epsilon = 1e-9);

    assert_eq!(session.pointer_move(Point::new(300.0, 300.0)), PointerOutcome::Redraw);
    assert!(session.view().viewport.width > zoomed.width);
    assert_eq!(session.pointer_move(Point::new(310.0, 300.0)), PointerOutcome::Ignored);
}

#[test]
fn test_drag_zoom_never_shrinks_below_minimum_viewport() {
    let mut config = EditorConfig::default();
    // Let the viewport floor, not the zoom ceiling, be the binding limit.
    config.zoom.max = 100.0;
    let mut session = common::session_with(common::coord_image(1000, 800), config);
    let min_w = 1000.0 / 15.0;
    let min_h = 800.0 / 15.0;

    session.set_mode(Mode::Zoom);
    session.pointer_down(Point::new(300.0, 300.0));
    let mut y = 300.0;
    let mut ignored = 0;
    for _ in 0..400 {
        y -= 0.5;
        if session.pointer_move(Point::new(300.0, y)) == PointerOutcome::Ignored {
            ignored += 1;
        }
        let vp = session.view().viewport;
        assert!(vp.width >= min_w - 1e-9, "viewport {vp} below minimum");
        assert!(vp.height >= min_h - 1e-9, "viewport {vp} below minimum");
    }
    assert!(ignored > 0, "the floor was never reached");
    assert_eq!(session.pointer_up(Point::new(300.0, y)), PointerOutcome::Commit);
}

#[test]
fn test_ten_upward_drag_steps_respect_minimum_viewport() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Zoom);
    session.pointer_down(Point::new(300.0, 300.0));
    for i in 1..=10 {
        session.pointer_move(Point::new(300.0, 300.0 - i as f64));
        assert!(session.view().viewport.width >= 1000.0 / 15.0);
    }
    assert!(session.view().zoom > 1.0);
}

// ---------------------------------------------------------------------------
// Blur and annotations
// ---------------------------------------------------------------------------

#[test]
fn test_blur_stroke_is_recorded_in_image_space() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Blur);
    session.pointer_down(Point::new(75.0, 75.0));
    assert_eq!(session.pointer_move(Point::new(150.0, 75.0)), PointerOutcome::Redraw);
    // The live stroke is visible before it is committed.
    assert_eq!(
        session.controller().preview(session.view()).blur_strokes.len(),
        1
    );
    assert!(session.view().blur_strokes.is_empty());

    assert_eq!(session.pointer_up(Point::new(150.0, 75.0)), PointerOutcome::Commit);
    let stroke = &session.view().blur_strokes[0];
    assert_eq!(stroke.points.len(), 2);
    assert_abs_diff_eq!(stroke.points[0].x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(stroke.points[1].x, 200.0, epsilon = 1e-9);
    // Brush radius is given in display pixels.
    assert_abs_diff_eq!(stroke.radius as f64, 18.0 / SCALE, epsilon = 1e-3);
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_markers_are_numbered_in_order() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Marker);
    for (i, x) in [75.0, 150.0].into_iter().enumerate() {
        session.pointer_down(Point::new(x, 75.0));
        assert_eq!(session.pointer_up(Point::new(x, 75.0)), PointerOutcome::Commit);
        match &session.view().annotations[i] {
            Annotation::Marker { position, number } => {
                assert_eq!(*number, i as u32 + 1);
                assert_abs_diff_eq!(position.x, x / SCALE, epsilon = 1e-9);
                assert_abs_diff_eq!(position.y, 100.0, epsilon = 1e-9);
            }
            other => panic!("expected a marker, got {other:?}"),
        }
    }
}

#[test]
fn test_marker_on_rotated_view_lands_on_image_point() {
    let mut session = common::coord_session(1000, 800);
    session.apply(EditAction::RotateClockwise).unwrap();
    // Rotated frame is 800x1000, shown at 480x600.
    assert_eq!(session.display_size(), Size::new(480.0, 600.0));
    session.set_mode(Mode::Marker);
    session.pointer_down(Point::new(0.0, 0.0));
    session.pointer_up(Point::new(0.0, 0.0));
    match &session.view().annotations[0] {
        Annotation::Marker { position, .. } => {
            // The top-left of a clockwise-rotated view is the image's bottom-left.
            assert_abs_diff_eq!(position.x, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(position.y, 800.0, epsilon = 1e-9);
        }
        other => panic!("expected a marker, got {other:?}"),
    }
}

#[test]
fn test_label_needs_text() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Label);
    session.pointer_down(Point::new(75.0, 75.0));
    assert_eq!(session.pointer_up(Point::new(75.0, 75.0)), PointerOutcome::Ignored);

    session.set_label_text("Door");
    session.pointer_down(Point::new(75.0, 75.0));
    assert_eq!(session.pointer_up(Point::new(75.0, 75.0)), PointerOutcome::Commit);
    assert!(matches!(
        &session.view().annotations[0],
        Annotation::Label { text, .. } if text == "Door"
    ));
}

#[test]
fn test_arrow_drag_commits_and_short_arrow_is_ignored() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Arrow);

    session.pointer_down(Point::new(75.0, 75.0));
    assert_eq!(session.pointer_up(Point::new(75.0, 75.0)), PointerOutcome::Ignored);

    session.pointer_down(Point::new(75.0, 75.0));
    session.pointer_move(Point::new(300.0, 150.0));
    assert_eq!(session.pointer_up(Point::new(300.0, 150.0)), PointerOutcome::Commit);
    match &session.view().annotations[0] {
        Annotation::Arrow { from, to } => {
            assert_abs_diff_eq!(from.x, 100.0, epsilon = 1e-9);
            assert_abs_diff_eq!(to.x, 400.0, epsilon = 1e-9);
            assert_abs_diff_eq!(to.y, 200.0, epsilon = 1e-9);
        }
        other => panic!("expected an arrow, got {other:?}"),
    }
}

#[test]
fn test_events_without_mode_or_press_are_ignored() {
    let mut session = common::coord_session(100, 80);
    assert_eq!(session.pointer_down(Point::new(5.0, 5.0)), PointerOutcome::Ignored);
    session.set_mode(Mode::Blur);
    assert_eq!(session.pointer_move(Point::new(5.0, 5.0)), PointerOutcome::Ignored);
    assert_eq!(session.pointer_up(Point::new(5.0, 5.0)), PointerOutcome::Ignored);
    assert_eq!(session.pointer_leave(), PointerOutcome::Ignored);
}

#[test]
fn test_switching_mode_drops_gesture() {
    let mut session = common::coord_session(1000, 800);
    session.set_mode(Mode::Blur);
    session.pointer_down(Point::new(10.0, 10.0));
    session.pointer_move(Point::new(40.0, 10.0));
    session.set_mode(Mode::Marker);
    assert!(!session.controller().is_pointer_down());
    assert_eq!(session.controller().preview(session.view()).blur_strokes.len(), 0);
}
