use crate::app::RetouchApp;

pub fn show(ctx: &egui::Context, app: &mut RetouchApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        if let Some(ref running) = app.ui_state.running {
            ui.add(egui::ProgressBar::new(0.0).text(format!("{running}...")).animate(true));
        } else {
            ui.add(egui::ProgressBar::new(0.0).text(""));
        }

        // Log area: fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        ui.horizontal(|ui| {
            match app.editor.session() {
                Some(session) => {
                    let view = session.view();
                    let display = session.display_size();
                    ui.label(format!(
                        "{}x{}",
                        view.viewport.width.round(),
                        view.viewport.height.round()
                    ));
                    ui.separator();
                    ui.label(format!("Zoom: {:.0}%", view.zoom * 100.0));
                    ui.separator();
                    ui.label(format!("Rotation: {}\u{b0}", view.rotation.degrees()));
                    ui.separator();
                    ui.label(format!(
                        "Display: {:.0}x{:.0}",
                        display.width, display.height
                    ));
                    ui.separator();
                    ui.label(format!(
                        "Marks: {}  Blur: {}",
                        view.annotations.len(),
                        view.blur_strokes.len()
                    ));
                }
                None => {
                    ui.label(format!("{:?}", app.editor.state()));
                }
            }
            if app.editor.queued() > 0 {
                ui.separator();
                ui.label(format!("{} queued", app.editor.queued()));
            }
        });

        ui.add_space(2.0);
    });
}
