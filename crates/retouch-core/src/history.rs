use std::collections::VecDeque;
use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::source::ImageSource;
use crate::state::ViewState;

/// Immutable snapshot pushed after every committed edit.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub view: ViewState,
    /// Base image the view applies to; changes only on bake.
    pub source: Arc<ImageSource>,
    /// Display render cached at push time, for instant redisplay.
    pub preview: Option<Arc<RgbaImage>>,
}

impl HistoryEntry {
    pub fn new(view: ViewState, source: Arc<ImageSource>) -> Self {
        Self {
            view,
            source,
            preview: None,
        }
    }
}

/// Bounded undo stack with a forward (redo) stack.
///
/// The top entry always mirrors the current state, so undo needs at least
/// two entries.
#[derive(Debug)]
pub struct HistoryManager {
    max: usize,
    entries: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

impl HistoryManager {
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            max,
            entries: VecDeque::with_capacity(max),
            redo: Vec::new(),
        }
    }

    /// Append an entry, evicting the oldest past capacity. Clears redo.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max {
            self.entries.pop_front();
            debug!(max = self.max, "Oldest history entry evicted");
        }
        self.redo.clear();
    }

    /// Drop the top entry and return the one now on top.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if self.entries.len() < 2 {
            return None;
        }
        let popped = self.entries.pop_back()?;
        self.redo.push(popped);
        self.entries.back().cloned()
    }

    pub fn redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo.pop()?;
        self.entries.push_back(entry.clone());
        while self.entries.len() > self.max {
            self.entries.pop_front();
        }
        Some(entry)
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Cache a display render on the top entry.
    pub fn set_current_preview(&mut self, preview: Arc<RgbaImage>) {
        if let Some(entry) = self.entries.back_mut() {
            entry.preview = Some(preview);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.redo.clear();
    }
}
