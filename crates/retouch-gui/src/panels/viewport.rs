use retouch_core::action::EditAction;
use retouch_core::geometry::Point;

use crate::app::RetouchApp;
use crate::convert::{to_display_point, to_screen_rect};

const CROP_STROKE: egui::Color32 = egui::Color32::from_rgb(255, 210, 0);

pub fn show(ctx: &egui::Context, app: &mut RetouchApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        paint_background(ui, rect);

        app.refresh_texture(ctx, rect.size());

        let texture_id = app.viewport.texture.as_ref().map(|t| t.id());
        let display = app.editor.session().map(|s| s.display_size());

        match (texture_id, display) {
            (Some(texture_id), Some(display)) => {
                let img_rect = egui::Rect::from_center_size(
                    rect.center(),
                    egui::vec2(display.width as f32, display.height as f32),
                );
                let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

                handle_wheel(ui, &response, app);
                handle_pointer(&response, app, img_rect);

                draw_image(ui, texture_id, img_rect);
                draw_crop_overlay(ui, app, img_rect);
            }
            _ => show_placeholder(ui, app.ui_state.running.as_deref()),
        }
    });
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
}

fn handle_wheel(ui: &egui::Ui, response: &egui::Response, app: &mut RetouchApp) {
    if !response.hovered() {
        return;
    }
    let scroll = ui.input(|i| i.raw_scroll_delta.y);
    if scroll > 0.0 {
        app.apply(EditAction::ZoomIn);
    } else if scroll < 0.0 {
        app.apply(EditAction::ZoomOut);
    }
}

/// Forward primary-button gestures to the interaction controller.
///
/// Positions are relative to the painted image. Dragging off the image
/// counts as leaving the canvas and cancels the gesture.
fn handle_pointer(response: &egui::Response, app: &mut RetouchApp, img_rect: egui::Rect) {
    let pos = response.interact_pointer_pos();
    let local = |p: egui::Pos2| -> Point { to_display_point(p, img_rect) };

    if response.clicked_by(egui::PointerButton::Primary) {
        if let Some(p) = pos.filter(|p| img_rect.contains(*p)) {
            let p = local(p);
            let down = app.editor.pointer_down(p);
            app.handle_pointer(down);
            let up = app.editor.pointer_up(p);
            app.handle_pointer(up);
        }
        return;
    }

    if response.drag_started_by(egui::PointerButton::Primary) {
        if let Some(p) = pos.filter(|p| img_rect.contains(*p)) {
            let p = local(p);
            app.viewport.last_pointer = Some(p);
            let outcome = app.editor.pointer_down(p);
            app.handle_pointer(outcome);
        }
        return;
    }

    let down = app
        .editor
        .session()
        .is_some_and(|s| s.controller().is_pointer_down());
    if !down {
        return;
    }

    if response.drag_stopped_by(egui::PointerButton::Primary) {
        let p = pos.map(local).or(app.viewport.last_pointer);
        app.viewport.last_pointer = None;
        if let Some(p) = p {
            let outcome = app.editor.pointer_up(p);
            app.handle_pointer(outcome);
        }
    } else if response.dragged_by(egui::PointerButton::Primary) {
        match pos {
            Some(p) if img_rect.contains(p) => {
                let p = local(p);
                if app.viewport.last_pointer != Some(p) {
                    app.viewport.last_pointer = Some(p);
                    let outcome = app.editor.pointer_move(p);
                    app.handle_pointer(outcome);
                }
            }
            _ => {
                app.viewport.last_pointer = None;
                let outcome = app.editor.pointer_leave();
                app.handle_pointer(outcome);
            }
        }
    }
}

fn draw_image(ui: &egui::Ui, texture_id: egui::TextureId, img_rect: egui::Rect) {
    ui.painter().image(
        texture_id,
        img_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

/// Dim everything outside the live crop selection.
fn draw_crop_overlay(ui: &egui::Ui, app: &RetouchApp, img_rect: egui::Rect) {
    let Some(selection) = app
        .editor
        .session()
        .and_then(|s| s.controller().crop_selection())
    else {
        return;
    };
    let crop = to_screen_rect(&selection, img_rect).intersect(img_rect);
    let painter = ui.painter();
    let dim = egui::Color32::from_black_alpha(140);

    // Top, bottom, left, right bands.
    painter.rect_filled(
        egui::Rect::from_min_max(img_rect.min, egui::pos2(img_rect.max.x, crop.min.y)),
        0.0,
        dim,
    );
    painter.rect_filled(
        egui::Rect::from_min_max(egui::pos2(img_rect.min.x, crop.max.y), img_rect.max),
        0.0,
        dim,
    );
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(img_rect.min.x, crop.min.y),
            egui::pos2(crop.min.x, crop.max.y),
        ),
        0.0,
        dim,
    );
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(crop.max.x, crop.min.y),
            egui::pos2(img_rect.max.x, crop.max.y),
        ),
        0.0,
        dim,
    );
    painter.rect_stroke(
        crop,
        0.0,
        egui::Stroke::new(1.5, CROP_STROKE),
        egui::StrokeKind::Middle,
    );
}

fn show_placeholder(ui: &mut egui::Ui, running: Option<&str>) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new(running.unwrap_or("Open an image to begin"))
                .size(18.0)
                .color(egui::Color32::from_gray(100)),
        );
    });
}
