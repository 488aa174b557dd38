use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use retouch_core::action::{ApplyOutcome, EditAction};
use retouch_core::boundary::{submit_with_export, FormSubmission, SubmitOutcome};
use retouch_core::editor::Editor;
use retouch_core::export::{ExportFormat, ExportedImage};
use tracing::warn;

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Jpeg => ExportFormat::Jpeg,
            FormatArg::Png => ExportFormat::Png,
        }
    }
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Input image files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Edit script (TOML list of [[action]] tables)
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Editor config (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Crop rectangle in image pixels: x,y,width,height (applied after the script)
    #[arg(long)]
    pub crop: Option<String>,

    /// Quarter turns clockwise, negative for counter-clockwise (applied after --crop)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub rotate: i32,

    /// Export format, overriding the config
    #[arg(short, long)]
    pub format: Option<FormatArg>,

    /// JPEG quality 1-100, overriding the config
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Tally of what happened to the actions of one file.
#[derive(Default)]
struct Tally {
    committed: usize,
    ignored: usize,
}

/// Where one input's result lands. Stands in for the host form: the edited
/// image is attached when the export works, the original goes out otherwise.
struct OutputForm<'a> {
    input: &'a Path,
    dir: Option<&'a Path>,
    written: Option<PathBuf>,
    dimensions: Option<(u32, u32)>,
}

impl<'a> OutputForm<'a> {
    fn new(input: &'a Path, dir: Option<&'a Path>) -> Self {
        Self {
            input,
            dir,
            written: None,
            dimensions: None,
        }
    }
}

impl FormSubmission for OutputForm<'_> {
    fn attach_file(&mut self, image: &ExportedImage) -> retouch_core::error::Result<()> {
        let path = output_path(self.input, self.dir, &image.file_name);
        image.write_to(&path)?;
        self.written = Some(path);
        self.dimensions = Some((image.width, image.height));
        Ok(())
    }

    fn submit(&mut self) -> retouch_core::error::Result<()> {
        if self.written.is_some() {
            return Ok(());
        }
        let name = self.input.file_name().unwrap_or_default();
        let path = output_path(self.input, self.dir, &name.to_string_lossy());
        if path != self.input {
            std::fs::copy(self.input, &path)?;
        }
        self.written = Some(path);
        Ok(())
    }
}

pub fn run(args: &ApplyArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(format) = args.format {
        config.export.format = format.into();
    }
    if let Some(quality) = args.quality {
        config.export.quality = quality;
    }
    config.validate()?;

    let mut actions = super::load_script(args.script.as_ref())?;
    if let Some(ref crop) = args.crop {
        actions.push(parse_crop(crop)?);
    }
    actions.extend(rotation_actions(args.rotate));
    if actions.is_empty() {
        warn!("No edits given; files are re-encoded as-is");
    }

    crate::summary::print_apply_summary(&args.files, &actions, &config);

    if let Some(ref dir) = args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let pb = ProgressBar::new(args.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Editing [{bar:40}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut results = Vec::with_capacity(args.files.len());
    for file in &args.files {
        pb.set_message(file.display().to_string());
        let mut editor = Editor::for_existing(config.clone());
        editor
            .load_existing(&file.to_string_lossy())
            .with_context(|| format!("Failed to load {}", file.display()))?;

        let mut tally = Tally::default();
        for action in &actions {
            match editor.apply(action.clone())? {
                ApplyOutcome::Committed => tally.committed += 1,
                _ => tally.ignored += 1,
            }
        }
        if tally.ignored > 0 {
            warn!(
                file = %file.display(),
                ignored = tally.ignored,
                "Some edits did not apply"
            );
        }

        let mut form = OutputForm::new(file, args.output_dir.as_deref());
        let outcome = submit_with_export(&editor, &mut form)
            .with_context(|| format!("Failed to write output for {}", file.display()))?;
        results.push((form.written, form.dimensions, outcome, tally));
        pb.inc(1);
    }
    pb.finish_with_message("done");

    for (path, dimensions, outcome, tally) in &results {
        let path = path
            .as_deref()
            .map_or_else(|| "?".to_string(), |p| p.display().to_string());
        match (outcome, dimensions) {
            (SubmitOutcome::Edited { .. }, Some((w, h))) => println!(
                "Saved {path} ({w}x{h}, {} applied, {} ignored)",
                tally.committed, tally.ignored
            ),
            (SubmitOutcome::Fallback { reason }, _) => {
                println!("Kept original {path} (export failed: {reason})")
            }
            _ => println!("Kept original {path}"),
        }
    }
    Ok(())
}

fn parse_crop(s: &str) -> Result<EditAction> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Invalid crop format, expected x,y,width,height")?;
    let [x, y, width, height] = parts[..] else {
        bail!("Crop needs exactly four values, got {}", parts.len());
    };
    Ok(EditAction::Crop {
        x,
        y,
        width,
        height,
    })
}

fn rotation_actions(quarter_turns: i32) -> Vec<EditAction> {
    let (action, count) = if quarter_turns >= 0 {
        (EditAction::RotateClockwise, quarter_turns.unsigned_abs() % 4)
    } else {
        (EditAction::RotateCounterClockwise, quarter_turns.unsigned_abs() % 4)
    };
    vec![action; count as usize]
}

fn output_path(input: &Path, dir: Option<&Path>, file_name: &str) -> PathBuf {
    let parent = dir.unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")));
    parent.join(file_name)
}
