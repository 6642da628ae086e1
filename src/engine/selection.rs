//! engine::selection
//!
//! Which reflog entry is highlighted, and the preview that follows it.

use crate::core::types::HistoryEntry;
use crate::engine::traits::{PreviewSlot, Previewer};

/// Placeholder shown in the preview pane when there is no history.
pub const NO_HISTORY_MESSAGE: &str = "No reflog history";

/// Highlighted row of the reflog panel.
///
/// `None` only when the ledger is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<usize>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index, if any.
    pub fn index(&self) -> Option<usize> {
        self.selected
    }

    /// Clamp into `[0, len - 1]`, keeping the current index when it is
    /// still valid.
    pub fn clamp(&mut self, len: usize) {
        self.selected = match len {
            0 => None,
            _ => Some(self.selected.unwrap_or(0).min(len - 1)),
        };
    }

    /// Jump to `index`, clamped to the available entries.
    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = Some(index);
        self.clamp(len);
    }

    /// Move one row towards older entries.
    pub fn select_next(&mut self, len: usize) {
        let next = self.selected.map_or(0, |i| i.saturating_add(1));
        self.select(next, len);
    }

    /// Move one row towards newer entries.
    pub fn select_prev(&mut self, len: usize) {
        let prev = self.selected.map_or(0, |i| i.saturating_sub(1));
        self.select(prev, len);
    }

    /// The highlighted entry.
    pub fn get<'a>(&self, entries: &'a [HistoryEntry]) -> Option<&'a HistoryEntry> {
        self.selected.and_then(|i| entries.get(i))
    }
}

/// Ask the previewer to show `entry`, or the placeholder when there is none.
///
/// Returns immediately; the previewer streams in the background.
pub fn on_select<P: Previewer + ?Sized>(entry: Option<&HistoryEntry>, previewer: &mut P) {
    match entry {
        Some(entry) => previewer.stream_show(&entry.id, PreviewSlot::Main),
        None => previewer.show_message(NO_HISTORY_MESSAGE, PreviewSlot::Main),
    }
}
