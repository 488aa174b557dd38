use std::path::PathBuf;
use std::sync::Arc;

use retouch_core::config::{EditorConfig, ExportConfig};
use retouch_core::error::RetouchError;
use retouch_core::render::Renderer;
use retouch_core::source::ImageSource;
use retouch_core::state::ViewState;

/// Commands sent from UI thread to worker thread.
pub enum WorkerCommand {
    /// Decode an image file into a working bitmap.
    Decode { path: PathBuf, scale_cap: u32 },

    /// Decode an image that already exists, given as a path or file:// URL.
    OpenExisting { location: String, scale_cap: u32 },

    /// Render the full-resolution result and write it to disk.
    Export {
        source: Arc<ImageSource>,
        view: ViewState,
        config: ExportConfig,
        renderer: Renderer,
        path: PathBuf,
    },
}

/// Results sent from worker thread back to UI thread.
pub enum WorkerResult {
    /// A decode has started; edits issued from now on are queued.
    Loading { path: PathBuf },
    Decoded {
        path: PathBuf,
        result: Result<ImageSource, RetouchError>,
    },
    Exported {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    ConfigImported {
        config: EditorConfig,
    },
    Error {
        message: String,
    },
    Log {
        message: String,
    },
}
