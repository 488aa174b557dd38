use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use image::ImageFormat;
use retouch_core::export::edit_file_name;
use retouch_core::source::ImageSource;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,

    /// Editor config (TOML) supplying the working size cap and export format
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let source = ImageSource::open(&args.file, config.working_scale_cap)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let (orig_w, orig_h) = source.original_size();
    let format = ImageFormat::from_path(&args.file)
        .map(|f| format!("{f:?}"))
        .unwrap_or_else(|_| "unknown".into());
    let size_kb = std::fs::metadata(&args.file)?.len() as f64 / 1024.0;

    println!("File:        {}", source.file_name());
    println!("Format:      {}", format);
    println!("Dimensions:  {}x{}", orig_w, orig_h);
    println!("Working:     {}x{}", source.width(), source.height());
    if (orig_w, orig_h) != (source.width(), source.height()) {
        println!("Scale cap:   {} px", config.working_scale_cap);
    }
    println!("File size:   {:.1} KB", size_kb);
    println!(
        "Export name: {}",
        edit_file_name(source.file_name(), config.export.format)
    );

    Ok(())
}
