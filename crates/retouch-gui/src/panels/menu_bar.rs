use retouch_core::action::EditAction;
use retouch_core::config::EditorConfig;
use retouch_core::export::{edit_file_name, ExportFormat};

use crate::app::RetouchApp;
use crate::messages::{WorkerCommand, WorkerResult};

const OPEN: egui::KeyboardShortcut =
    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
const EXPORT: egui::KeyboardShortcut =
    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S);
const QUIT: egui::KeyboardShortcut =
    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
const REDO: egui::KeyboardShortcut = egui::KeyboardShortcut::new(
    egui::Modifiers::COMMAND.plus(egui::Modifiers::SHIFT),
    egui::Key::Z,
);
const UNDO: egui::KeyboardShortcut =
    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Z);

pub fn show(ctx: &egui::Context, app: &mut RetouchApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.add(egui::Button::new("Open...").shortcut_text(ctx.format_shortcut(&OPEN))).clicked() {
                    ui.close();
                    open_file(app);
                }

                let export = egui::Button::new("Export As...").shortcut_text(ctx.format_shortcut(&EXPORT));
                if ui.add_enabled(app.is_ready(), export).clicked() {
                    ui.close();
                    export_file(app);
                }

                ui.separator();

                if ui.button("Import Config...").clicked() {
                    ui.close();
                    import_config(app);
                }

                if ui.button("Export Config...").clicked() {
                    ui.close();
                    export_config(app);
                }

                ui.separator();

                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&QUIT))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let ready = app.is_ready();
                if ui.add_enabled(ready, egui::Button::new("Undo").shortcut_text(ctx.format_shortcut(&UNDO))).clicked() {
                    ui.close();
                    app.apply(EditAction::Undo);
                }
                if ui.add_enabled(ready, egui::Button::new("Redo").shortcut_text(ctx.format_shortcut(&REDO))).clicked() {
                    ui.close();
                    app.apply(EditAction::Redo);
                }
                ui.separator();
                if ui.add_enabled(ready, egui::Button::new("Reset All")).clicked() {
                    ui.close();
                    app.apply(EditAction::ResetAll);
                }
                if ui.button("Reset Config").clicked() {
                    ui.close();
                    app.editor.set_config(EditorConfig::default());
                    app.ui_state.add_log("Config reset to defaults".into());
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus). Redo before undo: the
        // undo shortcut would otherwise swallow Shift+Z as well.
        if ctx.input_mut(|i| i.consume_shortcut(&OPEN)) {
            open_file(app);
        }
        if app.is_ready() && ctx.input_mut(|i| i.consume_shortcut(&EXPORT)) {
            export_file(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&REDO)) {
            app.apply(EditAction::Redo);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&UNDO)) {
            app.apply(EditAction::Undo);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&QUIT)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

pub(crate) fn open_file(app: &mut RetouchApp) {
    let cmd_tx = app.cmd_tx.clone();
    let scale_cap = app.editor.config().working_scale_cap;
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let _ = cmd_tx.send(WorkerCommand::Decode { path, scale_cap });
        }
    });
}

pub(crate) fn export_file(app: &mut RetouchApp) {
    let Some(session) = app.editor.session() else {
        return;
    };
    let default_name = edit_file_name(session.source().file_name(), session.config().export.format);
    let source = session.shared_source();
    let view = session.view().clone();
    let mut config = session.config().export.clone();
    let renderer = session.renderer().clone();
    let cmd_tx = app.cmd_tx.clone();

    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("PNG", &["png"])
            .set_file_name(default_name)
            .save_file()
        {
            if let Some(format) = ExportFormat::from_path(&path) {
                config.format = format;
            }
            let _ = cmd_tx.send(WorkerCommand::Export {
                source,
                view,
                config,
                renderer,
                path,
            });
        }
    });
}

fn import_config(app: &mut RetouchApp) {
    let result_tx = app.result_tx.clone();
    std::thread::spawn(move || {
        let Some(path) = rfd::FileDialog::new().add_filter("TOML", &["toml"]).pick_file() else {
            return;
        };
        let result = match EditorConfig::load(&path) {
            Ok(config) => WorkerResult::ConfigImported { config },
            Err(e) => WorkerResult::Error {
                message: format!("Invalid config {}: {e}", path.display()),
            },
        };
        let _ = result_tx.send(result);
    });
}

fn export_config(app: &mut RetouchApp) {
    let config = app.editor.config().clone();
    let result_tx = app.result_tx.clone();

    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("retouch.toml")
            .save_file()
        {
            let message = match config.save(&path) {
                Ok(()) => WorkerResult::Log {
                    message: format!("Config saved: {}", path.display()),
                },
                Err(e) => WorkerResult::Error {
                    message: format!("Config not saved: {e}"),
                },
            };
            let _ = result_tx.send(message);
        }
    });
}
