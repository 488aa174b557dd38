use std::path::PathBuf;

use retouch_core::geometry::Point;

/// Log lines kept in the status panel.
const MAX_LOG_LINES: usize = 200;

/// UI-only state that does not belong to the edit session.
pub struct UIState {
    pub file_path: Option<PathBuf>,
    pub log_messages: Vec<String>,
    /// Label of the background job in progress, if any.
    pub running: Option<String>,
    pub label_text: String,
    pub blur_radius: f32,
    pub blur_strength: f32,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            file_path: None,
            log_messages: Vec::new(),
            running: None,
            label_text: String::new(),
            blur_radius: retouch_core::consts::DEFAULT_BLUR_RADIUS,
            blur_strength: retouch_core::consts::DEFAULT_BLUR_STRENGTH,
        }
    }
}

impl UIState {
    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_LINES {
            let excess = self.log_messages.len() - MAX_LOG_LINES;
            self.log_messages.drain(..excess);
        }
    }
}

/// Viewport display state.
#[derive(Default)]
pub struct ViewportState {
    pub texture: Option<egui::TextureHandle>,
    /// Layout box last handed to the session, in points.
    pub layout: Option<egui::Vec2>,
    /// The texture no longer matches the session view.
    pub dirty: bool,
    /// Last pointer position in display space, for release events that carry none.
    pub last_pointer: Option<Point>,
}
