use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use retouch_core::geometry::Size;
use retouch_core::render::RenderQuality;
use retouch_core::session::EditSession;
use retouch_core::source::ImageSource;

#[derive(Args)]
pub struct RenderArgs {
    /// Input image file
    pub file: PathBuf,

    /// Edit script (TOML) applied before rendering
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Editor config (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Width of the display area the preview is fitted into
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Height of the display area the preview is fitted into
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Use the fast resampling filter used during gestures
    #[arg(long)]
    pub fast: bool,

    /// Output PNG path (default: <stem>_preview.png next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Render the display-surface preview of an edited image.
pub fn run(args: &RenderArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let actions = super::load_script(args.script.as_ref())?;

    let source = ImageSource::open(&args.file, config.working_scale_cap)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let mut session = EditSession::new(source, config);
    session.set_layout(Size::new(args.width as f64, args.height as f64));
    for action in actions {
        session.apply(action)?;
    }

    let quality = if args.fast {
        RenderQuality::Fast
    } else {
        RenderQuality::High
    };
    let preview = session.render_display(quality);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| preview_path(&args.file));
    preview
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Preview {}x{} saved to {}",
        preview.width(),
        preview.height(),
        output.display()
    );
    Ok(())
}

fn preview_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = source.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_preview.png"))
}
