use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::action::{ApplyOutcome, EditAction};
use crate::config::EditorConfig;
use crate::controller::{Mode, PointerOutcome};
use crate::error::{Result, RetouchError};
use crate::export::ExportedImage;
use crate::geometry::Point;
use crate::session::EditSession;
use crate::source::ImageSource;

/// Lifecycle of the editor's image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Empty,
    Loading,
    Ready,
}

/// How the editor was opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flow {
    /// New image: the host opens the file picker right away.
    #[default]
    Create,
    /// Editing an image that already exists; no picker.
    EditExisting,
}

/// Owns the current session and guards it while a new image decodes.
///
/// Discrete edits issued during a load are queued and replayed, in order,
/// against the new image once it is ready.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    flow: Flow,
    session: Option<EditSession>,
    loading: bool,
    queue: VecDeque<EditAction>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            flow: Flow::Create,
            session: None,
            loading: false,
            queue: VecDeque::new(),
        }
    }

    pub fn for_existing(config: EditorConfig) -> Self {
        Self {
            flow: Flow::EditExisting,
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the config. The open session keeps its own until the next load.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    /// Whether the host should open the file picker on start-up.
    pub fn auto_open_picker(&self) -> bool {
        self.flow == Flow::Create && self.state() == EditorState::Empty
    }

    pub fn state(&self) -> EditorState {
        if self.loading {
            EditorState::Loading
        } else if self.session.is_some() {
            EditorState::Ready
        } else {
            EditorState::Empty
        }
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        if self.loading {
            return None;
        }
        self.session.as_mut()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Mark a decode as started.
    pub fn begin_load(&mut self) {
        if self.loading {
            debug!("Load restarted; queued edits kept");
        }
        self.loading = true;
    }

    /// Complete a decode started with [`Editor::begin_load`].
    ///
    /// On success the queued edits are replayed and their outcomes returned.
    /// On failure the previous session (if any) is kept and the queue is
    /// dropped.
    pub fn finish_load(&mut self, decoded: Result<ImageSource>) -> Result<Vec<ApplyOutcome>> {
        self.loading = false;
        let source = match decoded {
            Ok(source) => source,
            Err(e) => {
                let dropped = self.queue.len();
                self.queue.clear();
                warn!(error = %e, dropped, "Image load failed; keeping previous state");
                return Err(e);
            }
        };

        let mode = self.session.as_ref().map(|s| s.controller().mode());
        let mut session = EditSession::new(source, self.config.clone());
        if let Some(mode) = mode {
            session.set_mode(mode);
        }

        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(action) = self.queue.pop_front() {
            let outcome = session.apply(action).unwrap_or_else(|e| {
                warn!(error = %e, "Queued edit rejected");
                ApplyOutcome::Ignored
            });
            outcomes.push(outcome);
        }
        if !outcomes.is_empty() {
            info!(replayed = outcomes.len(), "Queued edits applied");
        }
        self.session = Some(session);
        Ok(outcomes)
    }

    /// Decode `bytes` and start a new session with them.
    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        mime: Option<&str>,
    ) -> Result<Vec<ApplyOutcome>> {
        self.begin_load();
        let decoded = ImageSource::decode(bytes, file_name, mime, self.config.working_scale_cap);
        self.finish_load(decoded)
    }

    /// Load an image that already exists (the edit flow).
    pub fn load_existing(&mut self, location: &str) -> Result<Vec<ApplyOutcome>> {
        self.begin_load();
        let decoded = ImageSource::open_existing(location, self.config.working_scale_cap);
        self.finish_load(decoded)
    }

    pub fn apply(&mut self, action: EditAction) -> Result<ApplyOutcome> {
        match self.state() {
            EditorState::Loading => {
                debug!(?action, "Edit queued until the image is ready");
                self.queue.push_back(action);
                Ok(ApplyOutcome::Queued)
            }
            EditorState::Empty => Err(RetouchError::Input("no image loaded".into())),
            EditorState::Ready => match self.session.as_mut() {
                Some(session) => session.apply(action),
                None => Err(RetouchError::NoImage),
            },
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if let Some(session) = self.session.as_mut() {
            session.set_mode(mode);
        }
    }

    pub fn pointer_down(&mut self, p: Point) -> PointerOutcome {
        self.session_mut()
            .map_or(PointerOutcome::Ignored, |s| s.pointer_down(p))
    }

    pub fn pointer_move(&mut self, p: Point) -> PointerOutcome {
        self.session_mut()
            .map_or(PointerOutcome::Ignored, |s| s.pointer_move(p))
    }

    pub fn pointer_up(&mut self, p: Point) -> PointerOutcome {
        self.session_mut()
            .map_or(PointerOutcome::Ignored, |s| s.pointer_up(p))
    }

    pub fn pointer_leave(&mut self) -> PointerOutcome {
        self.session_mut()
            .map_or(PointerOutcome::Ignored, |s| s.pointer_leave())
    }

    pub fn export(&self) -> Result<ExportedImage> {
        match (&self.session, self.loading) {
            (Some(session), false) => session.export(),
            _ => Err(RetouchError::NoImage),
        }
    }
}
