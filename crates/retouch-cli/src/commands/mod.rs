pub mod apply;
pub mod config;
pub mod info;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use retouch_core::action::{EditAction, EditScript};
use retouch_core::config::EditorConfig;

/// Load `--config`, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

/// Load the actions of an edit script, or none when no script is given.
pub fn load_script(path: Option<&PathBuf>) -> Result<Vec<EditAction>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let script = EditScript::from_toml_str(&text)
        .with_context(|| format!("Invalid edit script {}", path.display()))?;
    Ok(script.actions)
}
