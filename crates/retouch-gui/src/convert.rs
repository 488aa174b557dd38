use image::RgbaImage;

/// Convert a rendered display surface to an egui ColorImage.
pub fn rgba_to_color_image(image: &RgbaImage) -> egui::ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw())
}

/// Display-space point of a screen position inside the painted image rect.
pub fn to_display_point(pos: egui::Pos2, img_rect: egui::Rect) -> retouch_core::geometry::Point {
    let local = pos - img_rect.min;
    retouch_core::geometry::Point::new(local.x as f64, local.y as f64)
}

/// Screen rect of a display-space rectangle.
pub fn to_screen_rect(rect: &retouch_core::geometry::Rect, img_rect: egui::Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        img_rect.min + egui::vec2(rect.x as f32, rect.y as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}
