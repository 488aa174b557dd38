use std::sync::mpsc;

use retouch_core::action::{ApplyOutcome, EditAction};
use retouch_core::config::{BlurConfig, EditorConfig};
use retouch_core::controller::{Mode, PointerOutcome};
use retouch_core::editor::{Editor, EditorState};
use retouch_core::geometry::Size;
use retouch_core::render::RenderQuality;
use tracing::warn;

use crate::convert::rgba_to_color_image;
use crate::messages::{WorkerCommand, WorkerResult};
use crate::panels;
use crate::state::{UIState, ViewportState};
use crate::worker;

pub struct RetouchApp {
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub result_tx: mpsc::Sender<WorkerResult>,
    pub result_rx: mpsc::Receiver<WorkerResult>,
    pub editor: Editor,
    pub ui_state: UIState,
    pub viewport: ViewportState,
    pub show_about: bool,
    /// Set once the start-up file picker decision has been made.
    picker_checked: bool,
}

impl RetouchApp {
    /// With a `location` the app edits that image; otherwise it starts empty
    /// and offers the file picker.
    pub fn new(ctx: &egui::Context, location: Option<String>) -> std::io::Result<Self> {
        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = worker::spawn_worker(result_tx.clone(), ctx.clone())?;

        let config = EditorConfig::default();
        let editor = match location {
            Some(location) => {
                let _ = cmd_tx.send(WorkerCommand::OpenExisting {
                    location,
                    scale_cap: config.working_scale_cap,
                });
                Editor::for_existing(config)
            }
            None => Editor::new(config),
        };

        Ok(Self {
            cmd_tx,
            result_tx,
            result_rx,
            editor,
            ui_state: UIState::default(),
            viewport: ViewportState::default(),
            show_about: false,
            picker_checked: false,
        })
    }

    /// Drain all pending results from the worker.
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkerResult::Loading { path } => {
                    self.editor.begin_load();
                    self.ui_state.running = Some(format!("Loading {}", path.display()));
                }
                WorkerResult::Decoded { path, result } => {
                    self.ui_state.running = None;
                    match self.editor.finish_load(result) {
                        Ok(outcomes) => {
                            self.ui_state
                                .add_log(format!("Opened: {}", path.display()));
                            if !outcomes.is_empty() {
                                self.ui_state.add_log(format!(
                                    "Replayed {} queued edits",
                                    outcomes.len()
                                ));
                            }
                            self.ui_state.file_path = Some(path);
                            self.sync_session_settings();
                        }
                        Err(e) => self.ui_state.add_log(format!("ERROR: {e}")),
                    }
                    self.viewport.dirty = true;
                }
                WorkerResult::Exported {
                    path,
                    width,
                    height,
                } => {
                    self.ui_state.running = None;
                    self.ui_state
                        .add_log(format!("Saved: {} ({width}x{height})", path.display()));
                }
                WorkerResult::ConfigImported { config } => {
                    self.editor.set_config(config);
                    self.ui_state
                        .add_log("Config imported; applies to the next image opened".into());
                }
                WorkerResult::Error { message } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
                WorkerResult::Log { message } => {
                    self.ui_state.add_log(message);
                }
            }
        }
    }

    /// Push UI-side tool settings into a freshly loaded session.
    fn sync_session_settings(&mut self) {
        let label = self.ui_state.label_text.clone();
        let blur = self.blur_brush();
        if let Some(session) = self.editor.session_mut() {
            session.set_label_text(label);
            session.set_blur_brush(blur);
        }
    }

    pub fn blur_brush(&self) -> BlurConfig {
        BlurConfig {
            radius: self.ui_state.blur_radius,
            strength: self.ui_state.blur_strength,
        }
    }

    /// Apply a discrete edit and log anything that did not commit.
    pub fn apply(&mut self, action: EditAction) {
        match self.editor.apply(action.clone()) {
            Ok(ApplyOutcome::Committed) => self.viewport.dirty = true,
            Ok(ApplyOutcome::Queued) => {
                self.ui_state.add_log("Edit queued until the image is loaded".into())
            }
            Ok(ApplyOutcome::Ignored) => self.ui_state.add_log(ignored_message(&action).into()),
            Err(e) => {
                warn!(?action, "Edit rejected: {e}");
                self.ui_state.add_log(format!("ERROR: {e}"));
            }
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.editor.set_mode(mode);
        self.viewport.dirty = true;
    }

    pub fn handle_pointer(&mut self, outcome: PointerOutcome) {
        if matches!(outcome, PointerOutcome::Redraw | PointerOutcome::Commit) {
            self.viewport.dirty = true;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.editor.state() == EditorState::Ready
    }

    /// Fit the session's display surface into `available` and re-render if needed.
    pub fn refresh_texture(&mut self, ctx: &egui::Context, available: egui::Vec2) {
        if self.viewport.layout != Some(available) {
            self.viewport.layout = Some(available);
            self.viewport.dirty = true;
        }
        if !self.viewport.dirty {
            return;
        }
        if self.editor.session().is_none() {
            self.viewport.texture = None;
            self.viewport.dirty = false;
            return;
        }
        // Keep showing the previous image while a new one decodes.
        let Some(session) = self.editor.session_mut() else {
            return;
        };
        session.set_layout(Size::new(available.x as f64, available.y as f64));
        let quality = if session.controller().is_pointer_down() {
            RenderQuality::Fast
        } else {
            RenderQuality::High
        };
        let image = rgba_to_color_image(&session.display_image(quality));
        match self.viewport.texture {
            Some(ref mut texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.viewport.texture =
                    Some(ctx.load_texture("viewport", image, egui::TextureOptions::LINEAR));
            }
        }
        self.viewport.dirty = false;
    }
}

/// Status line for an edit that left the view unchanged.
fn ignored_message(action: &EditAction) -> &'static str {
    match action {
        EditAction::Undo => "Nothing to undo",
        EditAction::Redo => "Nothing to redo",
        _ => "Edit had no effect",
    }
}

impl eframe::App for RetouchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();

        if !self.picker_checked {
            self.picker_checked = true;
            if self.editor.auto_open_picker() {
                panels::menu_bar::open_file(self);
            }
        }

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::viewport::show(ctx, self);

        if self.show_about {
            egui::Window::new("About Retouch")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Retouch");
                        ui.label("Crop, rotate, blur and annotate images");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_edits_are_explained() {
        assert_eq!(ignored_message(&EditAction::Undo), "Nothing to undo");
        assert_eq!(ignored_message(&EditAction::Redo), "Nothing to redo");
        assert_eq!(ignored_message(&EditAction::Bake), "Edit had no effect");
    }
}
