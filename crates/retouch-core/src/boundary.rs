//! Contracts with the hosting application: request payloads, CSRF token
//! lookup, and the export-on-submit flow. No HTTP client lives here.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::editor::Editor;
use crate::error::{Result, RetouchError};
use crate::export::ExportedImage;

/// Hidden form field that carries the CSRF token.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";
/// Cookie consulted when the form field is missing or empty.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Body of a reorder request. Endpoints accept one of two shapes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReorderRequest {
    Items { items: Vec<ReorderItem> },
    OrderedIds { ordered_ids: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    pub id: String,
}

impl ReorderRequest {
    pub fn items<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReorderRequest::Items {
            items: ids.into_iter().map(|id| ReorderItem { id: id.into() }).collect(),
        }
    }

    pub fn ordered_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReorderRequest::OrderedIds {
            ordered_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Ids in their new order, whichever shape was used.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            ReorderRequest::Items { items } => items.iter().map(|i| i.id.as_str()).collect(),
            ReorderRequest::OrderedIds { ordered_ids } => {
                ordered_ids.iter().map(String::as_str).collect()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| RetouchError::Network(e.to_string()))
    }
}

/// Non-file fields of a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFields {
    pub object_id: String,
    pub app_label: String,
    pub model_name: String,
}

impl UploadFields {
    /// Multipart field names and values, `file` first.
    pub fn form_fields<'a>(&'a self, file_name: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("file", file_name),
            ("object_id", self.object_id.as_str()),
            ("app_label", self.app_label.as_str()),
            ("model_name", self.model_name.as_str()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiTextRequest {
    pub kind: String,
    pub notes: String,
    pub report_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiTextResponse {
    pub text: String,
}

impl AiTextResponse {
    /// Parse a 2xx body. Anything else is a network error.
    pub fn from_response(status: u16, body: &str) -> Result<Self> {
        if !(200..300).contains(&status) {
            return Err(RetouchError::Network(format!("HTTP {status}")));
        }
        serde_json::from_str(body).map_err(|e| RetouchError::Network(e.to_string()))
    }
}

/// Check a reorder response. On failure the caller leaves its order alone.
pub fn check_reorder_response(status: u16, body: &str) -> Result<serde_json::Value> {
    if !(200..300).contains(&status) {
        warn!(status, body, "Reorder request failed");
        return Err(RetouchError::Network(format!("HTTP {status}: {body}")));
    }
    serde_json::from_str(body).map_err(|e| RetouchError::Network(e.to_string()))
}

/// Resolve the CSRF token: the hidden form field wins, the cookie is the fallback.
pub fn resolve_csrf_token(form_field: Option<&str>, cookie_header: Option<&str>) -> Option<String> {
    if let Some(value) = form_field.map(str::trim).filter(|v| !v.is_empty()) {
        return Some(value.to_string());
    }
    cookie_value(cookie_header?, CSRF_COOKIE)
}

/// Value of cookie `name` in a `Cookie:` header, percent-decoded.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(percent_decode)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(v) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// The surrounding form, as seen by the editor at submit time.
pub trait FormSubmission {
    /// Replace the form's file field with the edited image.
    fn attach_file(&mut self, image: &ExportedImage) -> Result<()>;

    /// Submit the form as it currently is.
    fn submit(&mut self) -> Result<()>;
}

/// What happened on submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Submitted with the edited image attached under this name.
    Edited { file_name: String },
    /// No image was loaded; submitted untouched.
    Untouched,
    /// Export failed; submitted with the original file instead.
    Fallback { reason: String },
}

/// Export the current edit, attach it, and submit.
///
/// A failed export never blocks the submission: the form goes out with
/// whatever file it already had.
pub fn submit_with_export<F: FormSubmission>(editor: &Editor, form: &mut F) -> Result<SubmitOutcome> {
    if editor.session().is_none() {
        form.submit()?;
        return Ok(SubmitOutcome::Untouched);
    }

    let attached = editor
        .export()
        .and_then(|image| form.attach_file(&image).map(|()| image.file_name));

    let outcome = match attached {
        Ok(file_name) => {
            info!(file = %file_name, "Submitting edited image");
            SubmitOutcome::Edited { file_name }
        }
        Err(e) => {
            warn!(error = %e, "Export failed; submitting original file");
            SubmitOutcome::Fallback {
                reason: e.to_string(),
            }
        }
    };
    form.submit()?;
    Ok(outcome)
}
