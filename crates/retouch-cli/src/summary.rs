use std::path::PathBuf;

use console::Style;
use retouch_core::action::EditAction;
use retouch_core::config::EditorConfig;
use retouch_core::export::ExportFormat;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    op: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            op: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_apply_summary(files: &[PathBuf], actions: &[EditAction], config: &EditorConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Retouch"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(7)));
    println!();

    if let [file] = files {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Input"),
            s.path.apply_to(file.display())
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Inputs"),
            s.value.apply_to(format!("{} files", files.len()))
        );
    }
    let format = match config.export.format {
        ExportFormat::Jpeg => format!("JPEG q{}", config.export.quality),
        ExportFormat::Png => "PNG".to_string(),
    };
    println!("  {:<14}{}", s.label.apply_to("Export"), s.op.apply_to(format));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Working cap"),
        s.value.apply_to(format!("{} px", config.working_scale_cap))
    );
    println!();

    if actions.is_empty() {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Edits"),
            s.disabled.apply_to("none")
        );
    } else {
        println!("  {}", s.header.apply_to("Edits"));
        for (i, action) in actions.iter().enumerate() {
            println!(
                "    {}. {}",
                s.label.apply_to(i + 1),
                s.value.apply_to(describe(action))
            );
        }
    }
    println!();
}

fn describe(action: &EditAction) -> String {
    match action {
        EditAction::RotateClockwise => "rotate clockwise".into(),
        EditAction::RotateCounterClockwise => "rotate counter-clockwise".into(),
        EditAction::ZoomIn => "zoom in".into(),
        EditAction::ZoomOut => "zoom out".into(),
        EditAction::ZoomReset => "zoom reset".into(),
        EditAction::Pan { dx, dy } => format!("pan by ({dx:.0}, {dy:.0})"),
        EditAction::Crop {
            x,
            y,
            width,
            height,
        } => format!("crop {width:.0}x{height:.0} at ({x:.0}, {y:.0})"),
        EditAction::Blur { points, radius, .. } => match radius {
            Some(r) => format!("blur {} points, radius {r}", points.len()),
            None => format!("blur {} points", points.len()),
        },
        EditAction::Marker { x, y } => format!("marker at ({x:.0}, {y:.0})"),
        EditAction::Label { x, y, text } => format!("label \"{text}\" at ({x:.0}, {y:.0})"),
        EditAction::Arrow { from, to } => format!(
            "arrow ({:.0}, {:.0}) -> ({:.0}, {:.0})",
            from.x, from.y, to.x, to.y
        ),
        EditAction::ClearBlur => "clear blur".into(),
        EditAction::ClearAnnotations => "clear annotations".into(),
        EditAction::ResetAll => "reset all".into(),
        EditAction::Bake => "bake".into(),
        EditAction::Undo => "undo".into(),
        EditAction::Redo => "redo".into(),
    }
}
