#[allow(dead_code)]
mod common;

use serde_json::json;

use retouch_core::action::EditAction;
use retouch_core::boundary::{
    check_reorder_response, cookie_value, resolve_csrf_token, submit_with_export, AiTextRequest,
    AiTextResponse, FormSubmission, ReorderRequest, SubmitOutcome, UploadFields,
};
use retouch_core::config::EditorConfig;
use retouch_core::editor::Editor;
use retouch_core::error::{Result, RetouchError};
use retouch_core::export::ExportedImage;

/// Records what the editor did to the form.
#[derive(Default)]
struct FakeForm {
    attached: Option<String>,
    submitted: usize,
    refuse_attach: bool,
}

impl FormSubmission for FakeForm {
    fn attach_file(&mut self, image: &ExportedImage) -> Result<()> {
        if self.refuse_attach {
            return Err(RetouchError::Export("file input is read-only".into()));
        }
        self.attached = Some(image.file_name.clone());
        Ok(())
    }

    fn submit(&mut self) -> Result<()> {
        self.submitted += 1;
        Ok(())
    }
}

fn loaded_editor() -> Editor {
    let mut editor = Editor::new(EditorConfig::default());
    let bytes = common::png_bytes(&common::coord_image(40, 30));
    editor.load_bytes(&bytes, "site.png", Some("image/png")).unwrap();
    editor
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[test]
fn test_reorder_request_shapes() {
    let items = ReorderRequest::items(["3", "1", "2"]);
    assert_eq!(
        serde_json::to_value(&items).unwrap(),
        json!({"items": [{"id": "3"}, {"id": "1"}, {"id": "2"}]})
    );

    let ordered = ReorderRequest::ordered_ids(["b", "a"]);
    assert_eq!(
        serde_json::to_value(&ordered).unwrap(),
        json!({"ordered_ids": ["b", "a"]})
    );
}

#[test]
fn test_reorder_request_parses_either_shape() {
    let a: ReorderRequest = serde_json::from_str(r#"{"items":[{"id":"7"},{"id":"5"}]}"#).unwrap();
    assert_eq!(a.ids(), vec!["7", "5"]);
    let b: ReorderRequest = serde_json::from_str(r#"{"ordered_ids":["x","y"]}"#).unwrap();
    assert_eq!(b.ids(), vec!["x", "y"]);
    assert!(ReorderRequest::ordered_ids(Vec::<String>::new()).is_empty());
}

#[test]
fn test_reorder_response_checks_status() {
    assert!(check_reorder_response(200, r#"{"ok":true}"#).is_ok());
    let err = check_reorder_response(403, "forbidden").unwrap_err();
    assert!(matches!(err, RetouchError::Network(_)));
}

#[test]
fn test_upload_fields_order() {
    let fields = UploadFields {
        object_id: "12".into(),
        app_label: "report_maker".into(),
        model_name: "examobject".into(),
    };
    let names: Vec<&str> = fields.form_fields("a.jpg").iter().map(|(k, _)| *k).collect();
    assert_eq!(names, vec!["file", "object_id", "app_label", "model_name"]);
}

#[test]
fn test_ai_text_contract() {
    let req = AiTextRequest {
        kind: "summary".into(),
        notes: "two cars".into(),
        report_id: "99".into(),
    };
    assert_eq!(
        serde_json::to_value(&req).unwrap(),
        json!({"kind": "summary", "notes": "two cars", "report_id": "99"})
    );

    let ok = AiTextResponse::from_response(200, r#"{"text":"Generated."}"#).unwrap();
    assert_eq!(ok.text, "Generated.");
    assert!(matches!(
        AiTextResponse::from_response(500, "oops"),
        Err(RetouchError::Network(_))
    ));
    assert!(matches!(
        AiTextResponse::from_response(200, "not json"),
        Err(RetouchError::Network(_))
    ));
}

// ---------------------------------------------------------------------------
// CSRF
// ---------------------------------------------------------------------------

#[test]
fn test_csrf_prefers_form_field() {
    let token = resolve_csrf_token(Some("fromfield"), Some("csrftoken=fromcookie"));
    assert_eq!(token.as_deref(), Some("fromfield"));
}

#[test]
fn test_csrf_falls_back_to_cookie() {
    let header = "sessionid=abc; csrftoken=tok%3D123; theme=dark";
    assert_eq!(resolve_csrf_token(Some("  "), Some(header)).as_deref(), Some("tok=123"));
    assert_eq!(resolve_csrf_token(None, Some(header)).as_deref(), Some("tok=123"));
    assert_eq!(resolve_csrf_token(None, Some("sessionid=abc")), None);
    assert_eq!(resolve_csrf_token(None, None), None);
}

#[test]
fn test_cookie_value_matches_whole_name() {
    assert_eq!(cookie_value("csrftokenold=1; csrftoken=2", "csrftoken").as_deref(), Some("2"));
}

// ---------------------------------------------------------------------------
// Submit flow
// ---------------------------------------------------------------------------

#[test]
fn test_submit_attaches_edited_image() {
    let mut editor = loaded_editor();
    editor.apply(EditAction::RotateClockwise).unwrap();
    let mut form = FakeForm::default();

    let outcome = submit_with_export(&editor, &mut form).unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Edited {
            file_name: "site_edit.jpg".into()
        }
    );
    assert_eq!(form.attached.as_deref(), Some("site_edit.jpg"));
    assert_eq!(form.submitted, 1);
}

#[test]
fn test_submit_without_image_is_untouched() {
    let editor = Editor::new(EditorConfig::default());
    let mut form = FakeForm::default();
    assert_eq!(
        submit_with_export(&editor, &mut form).unwrap(),
        SubmitOutcome::Untouched
    );
    assert!(form.attached.is_none());
    assert_eq!(form.submitted, 1);
}

#[test]
fn test_submit_falls_back_when_export_cannot_be_attached() {
    let editor = loaded_editor();
    let mut form = FakeForm {
        refuse_attach: true,
        ..FakeForm::default()
    };
    let outcome = submit_with_export(&editor, &mut form).unwrap();
    assert!(matches!(outcome, SubmitOutcome::Fallback { .. }));
    assert!(form.attached.is_none());
    assert_eq!(form.submitted, 1);
}
