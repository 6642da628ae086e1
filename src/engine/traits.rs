//! engine::traits
//!
//! Seams between the undo engine and the outside world.
//!
//! The engine never talks to git2, a terminal, or a background task
//! directly. Instead it is generic over:
//!
//! - [`HistorySource`] / [`Backend`] - the repository: history fetch and the
//!   mutation primitives, each of which may fail independently
//! - [`Host`] - the front end: error surface and dependent-panel refresh
//! - [`Previewer`] - the asynchronous preview pane
//!
//! [`crate::engine::git_backend::GitBackend`] implements the repository side
//! for real; [`crate::engine::mock::MockBackend`] records calls for tests.

use crate::core::types::{HistoryEntry, Oid, ResetMode};
use crate::engine::ledger::UndoContext;
use crate::git::GitError;

/// Read access to repository history.
pub trait HistorySource {
    /// Fetch the full history, newest first.
    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, GitError>;
}

/// Repository mutation primitives used by undo and the history commands.
pub trait Backend: HistorySource {
    /// Check out a ref name or revision.
    fn checkout(&mut self, target: &str) -> Result<(), GitError>;

    /// Reset HEAD, index and working tree to `target`.
    fn hard_reset(&mut self, target: &Oid) -> Result<(), GitError> {
        self.reset(target, ResetMode::Hard)
    }

    /// Reset HEAD to `target` with the given mode.
    fn reset(&mut self, target: &Oid, mode: ResetMode) -> Result<(), GitError>;

    /// Stash local changes under `label`.
    fn stash_save(&mut self, label: &str) -> Result<(), GitError>;

    /// Pop the stash entry at `index`.
    fn stash_pop(&mut self, index: usize) -> Result<(), GitError>;

    /// Whether any tracked file has uncommitted modifications.
    fn any_tracked_file_dirty(&self) -> Result<bool, GitError>;
}

/// Front-end collaborator: where errors go and how panels are redrawn.
pub trait Host {
    /// Show a non-fatal error to the user.
    fn report_error(&mut self, message: &str);

    /// Re-read repository state into every panel that depends on it.
    ///
    /// `ctx` tells the ledger whether new history was caused by undo.
    fn refresh_side_panels(&mut self, source: &dyn HistorySource, ctx: &UndoContext);
}

/// Named destination for preview output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewSlot {
    /// The main content pane.
    Main,
    /// The secondary pane (split view).
    Secondary,
}

impl PreviewSlot {
    /// Display name of the slot.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewSlot::Main => "main",
            PreviewSlot::Secondary => "secondary",
        }
    }
}

/// Asynchronous preview pane.
///
/// Both calls return immediately. Starting anything in a slot supersedes
/// whatever was still streaming there.
pub trait Previewer {
    /// Stream the full diff of `id` into `slot`.
    fn stream_show(&mut self, id: &Oid, slot: PreviewSlot);

    /// Replace the content of `slot` with a fixed message.
    fn show_message(&mut self, message: &str, slot: PreviewSlot);
}
