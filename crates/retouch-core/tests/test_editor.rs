#[allow(dead_code)]
mod common;

use retouch_core::action::{ApplyOutcome, EditAction};
use retouch_core::config::EditorConfig;
use retouch_core::controller::{Mode, PointerOutcome};
use retouch_core::editor::{Editor, EditorState, Flow};
use retouch_core::error::RetouchError;
use retouch_core::geometry::{Point, Rotation};
use retouch_core::source::ImageSource;

fn png(width: u32, height: u32) -> Vec<u8> {
    common::png_bytes(&common::coord_image(width, height))
}

#[test]
fn test_empty_editor_rejects_edits() {
    let mut editor = Editor::new(EditorConfig::default());
    assert_eq!(editor.state(), EditorState::Empty);
    let err = editor.apply(EditAction::RotateClockwise).unwrap_err();
    assert!(matches!(err, RetouchError::Input(_)));
    assert!(matches!(editor.export(), Err(RetouchError::NoImage)));
    assert_eq!(editor.pointer_down(Point::new(1.0, 1.0)), PointerOutcome::Ignored);
}

#[test]
fn test_load_bytes_makes_editor_ready() {
    let mut editor = Editor::new(EditorConfig::default());
    let outcomes = editor.load_bytes(&png(64, 48), "shot.png", Some("image/png")).unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(editor.state(), EditorState::Ready);
    let session = editor.session().unwrap();
    assert_eq!(session.source().file_name(), "shot.png");
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_edits_during_load_are_queued_and_replayed_in_order() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.begin_load();
    assert_eq!(editor.state(), EditorState::Loading);

    assert_eq!(
        editor.apply(EditAction::RotateClockwise).unwrap(),
        ApplyOutcome::Queued
    );
    assert_eq!(
        editor.apply(EditAction::Marker { x: 5.0, y: 5.0 }).unwrap(),
        ApplyOutcome::Queued
    );
    assert_eq!(editor.apply(EditAction::Undo).unwrap(), ApplyOutcome::Queued);
    assert_eq!(editor.queued(), 3);

    // No pointer edits against a half-loaded image.
    editor.set_mode(Mode::Marker);
    assert_eq!(editor.pointer_down(Point::new(1.0, 1.0)), PointerOutcome::Ignored);

    let source = ImageSource::from_rgba(common::coord_image(40, 30), "late.png");
    let outcomes = editor.finish_load(Ok(source)).unwrap();
    assert_eq!(
        outcomes,
        vec![
            ApplyOutcome::Committed,
            ApplyOutcome::Committed,
            ApplyOutcome::Committed
        ]
    );
    assert_eq!(editor.queued(), 0);
    let view = editor.session().unwrap().view();
    assert_eq!(view.rotation, Rotation::Deg90);
    assert!(view.annotations.is_empty());
}

#[test]
fn test_failed_decode_keeps_previous_session() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.load_bytes(&png(64, 48), "first.png", None).unwrap();
    editor.apply(EditAction::RotateClockwise).unwrap();

    let err = editor
        .load_bytes(b"definitely not an image", "broken.png", None)
        .unwrap_err();
    assert!(matches!(err, RetouchError::Decode(_)));
    assert_eq!(editor.state(), EditorState::Ready);
    let session = editor.session().unwrap();
    assert_eq!(session.source().file_name(), "first.png");
    assert_eq!(session.view().rotation, Rotation::Deg90);
}

#[test]
fn test_failed_decode_from_empty_returns_to_empty_and_drops_queue() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.begin_load();
    editor.apply(EditAction::ZoomIn).unwrap();
    let err = editor
        .finish_load(Err(RetouchError::Decode("truncated".into())))
        .unwrap_err();
    assert!(matches!(err, RetouchError::Decode(_)));
    assert_eq!(editor.state(), EditorState::Empty);
    assert_eq!(editor.queued(), 0);
}

#[test]
fn test_non_image_mime_and_empty_input_are_rejected() {
    let mut editor = Editor::new(EditorConfig::default());
    let err = editor
        .load_bytes(&png(8, 8), "notes.txt", Some("text/plain"))
        .unwrap_err();
    assert!(matches!(err, RetouchError::Input(_)));

    let err = editor.load_bytes(&[], "nothing.png", None).unwrap_err();
    assert!(matches!(err, RetouchError::Input(_)));
    assert_eq!(editor.state(), EditorState::Empty);
}

#[test]
fn test_large_images_are_downscaled_to_working_cap() {
    let mut config = EditorConfig::default();
    config.working_scale_cap = 50;
    let mut editor = Editor::new(config);
    editor.load_bytes(&png(200, 100), "big.png", None).unwrap();
    let source = editor.session().unwrap().source();
    assert_eq!((source.width(), source.height()), (50, 25));
    assert_eq!(source.original_size(), (200, 100));
}

#[test]
fn test_mode_survives_loading_a_new_image() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.load_bytes(&png(32, 32), "a.png", None).unwrap();
    editor.set_mode(Mode::Crop);
    editor.load_bytes(&png(16, 16), "b.png", None).unwrap();
    assert_eq!(editor.session().unwrap().controller().mode(), Mode::Crop);
}

#[test]
fn test_edit_existing_flow_suppresses_picker() {
    let create = Editor::new(EditorConfig::default());
    assert_eq!(create.flow(), Flow::Create);
    assert!(create.auto_open_picker());

    let existing = Editor::for_existing(EditorConfig::default());
    assert_eq!(existing.flow(), Flow::EditExisting);
    assert!(!existing.auto_open_picker());
}

#[test]
fn test_load_existing_from_file_location() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("evidence");
    std::fs::write(&path, png(20, 10)).unwrap();

    let mut editor = Editor::for_existing(EditorConfig::default());
    let location = format!("file://{}?v=3", path.display());
    editor.load_existing(&location).unwrap();
    let session = editor.session().unwrap();
    assert_eq!(session.source().file_name(), "evidence.jpg");
    assert_eq!(session.source().width(), 20);
}
