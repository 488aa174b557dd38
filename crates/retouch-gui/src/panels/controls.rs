use retouch_core::action::EditAction;
use retouch_core::controller::Mode;

use super::section_header;
use crate::app::RetouchApp;

const LEFT_PANEL_WIDTH: f32 = 240.0;

pub fn show(ctx: &egui::Context, app: &mut RetouchApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                file_section(ui, app);
                ui.separator();
                tools_section(ui, app);
                ui.separator();
                transform_section(ui, app);
                ui.separator();
                brush_section(ui, app);
                ui.separator();
                history_section(ui, app);
            });
        });
}

fn file_section(ui: &mut egui::Ui, app: &mut RetouchApp) {
    let name = app
        .editor
        .session()
        .map(|s| s.source().file_name().to_string());
    section_header(ui, "File", name.as_deref());
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        if ui.button("Open...").clicked() {
            super::menu_bar::open_file(app);
        }
        if ui
            .add_enabled(app.is_ready(), egui::Button::new("Export..."))
            .clicked()
        {
            super::menu_bar::export_file(app);
        }
    });

    if let Some(session) = app.editor.session() {
        let (w, h) = session.source().original_size();
        ui.small(format!(
            "{}x{} (working {}x{})",
            w,
            h,
            session.source().width(),
            session.source().height()
        ));
    }
}

fn tools_section(ui: &mut egui::Ui, app: &mut RetouchApp) {
    let current = app
        .editor
        .session()
        .map(|s| s.controller().mode())
        .unwrap_or_default();
    section_header(ui, "Tool", Some(current.label()));
    ui.add_space(4.0);

    ui.add_enabled_ui(app.is_ready(), |ui| {
        ui.horizontal_wrapped(|ui| {
            for mode in Mode::ALL {
                if ui.selectable_label(current == mode, mode.label()).clicked() {
                    app.set_mode(mode);
                }
            }
        });
    });

    if current == Mode::Label {
        ui.add_space(4.0);
        ui.label("Label text");
        if ui.text_edit_singleline(&mut app.ui_state.label_text).changed() {
            let text = app.ui_state.label_text.clone();
            if let Some(session) = app.editor.session_mut() {
                session.set_label_text(text);
            }
        }
    }
}

fn transform_section(ui: &mut egui::Ui, app: &mut RetouchApp) {
    let status = app.editor.session().map(|s| {
        format!(
            "{}\u{b0} / {:.0}%",
            s.view().rotation.degrees(),
            s.view().zoom * 100.0
        )
    });
    section_header(ui, "View", status.as_deref());
    ui.add_space(4.0);

    ui.add_enabled_ui(app.is_ready(), |ui| {
        ui.horizontal(|ui| {
            if ui.button("\u{27f2} Left").clicked() {
                app.apply(EditAction::RotateCounterClockwise);
            }
            if ui.button("Right \u{27f3}").clicked() {
                app.apply(EditAction::RotateClockwise);
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Zoom +").clicked() {
                app.apply(EditAction::ZoomIn);
            }
            if ui.button("Zoom -").clicked() {
                app.apply(EditAction::ZoomOut);
            }
            if ui.button("Fit").clicked() {
                app.apply(EditAction::ZoomReset);
            }
        });
        if ui
            .button("Bake")
            .on_hover_text("Resample crop, rotation and blur into a new base image")
            .clicked()
        {
            app.apply(EditAction::Bake);
        }
    });
}

fn brush_section(ui: &mut egui::Ui, app: &mut RetouchApp) {
    section_header(ui, "Blur brush", None);
    ui.add_space(4.0);

    let radius = ui.add(egui::Slider::new(&mut app.ui_state.blur_radius, 2.0..=80.0).text("Radius"));
    let strength = ui.add(
        egui::Slider::new(&mut app.ui_state.blur_strength, 0.05..=1.0).text("Strength"),
    );
    if radius.changed() || strength.changed() {
        let brush = app.blur_brush();
        if let Some(session) = app.editor.session_mut() {
            session.set_blur_brush(brush);
        }
    }
}

fn history_section(ui: &mut egui::Ui, app: &mut RetouchApp) {
    let status = app.editor.session().map(|s| {
        format!("{}/{}", s.history().len(), s.history().capacity())
    });
    section_header(ui, "History", status.as_deref());
    ui.add_space(4.0);

    let (can_undo, can_redo) = app
        .editor
        .session()
        .map(|s| (s.history().can_undo(), s.history().can_redo()))
        .unwrap_or((false, false));

    ui.horizontal(|ui| {
        if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
            app.apply(EditAction::Undo);
        }
        if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
            app.apply(EditAction::Redo);
        }
    });

    ui.add_enabled_ui(app.is_ready(), |ui| {
        ui.horizontal(|ui| {
            if ui.button("Clear blur").clicked() {
                app.apply(EditAction::ClearBlur);
            }
            if ui.button("Clear marks").clicked() {
                app.apply(EditAction::ClearAnnotations);
            }
        });
        if ui.button("Reset all").clicked() {
            app.apply(EditAction::ResetAll);
        }
    });
}
