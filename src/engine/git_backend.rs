//! engine::git_backend
//!
//! [`Backend`] implementation over the real repository.

use crate::core::types::{HistoryEntry, Oid, ResetMode};
use crate::engine::traits::{Backend, HistorySource};
use crate::git::{Git, GitError};

/// The ref whose reflog the undo flow walks.
pub const HISTORY_REF: &str = "HEAD";

/// Repository backend: HEAD reflog as history, git2 for mutations.
///
/// History is always read in full. A truncated reflog would hide growth
/// from the ledger.
#[derive(Debug)]
pub struct GitBackend {
    git: Git,
}

impl GitBackend {
    /// Wrap an open repository.
    pub fn new(git: Git) -> Self {
        Self { git }
    }

    /// The underlying repository.
    pub fn git(&self) -> &Git {
        &self.git
    }
}

impl HistorySource for GitBackend {
    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, GitError> {
        self.git.reflog(HISTORY_REF, None)
    }
}

impl Backend for GitBackend {
    fn checkout(&mut self, target: &str) -> Result<(), GitError> {
        tracing::info!(revision = target, "checkout");
        self.git.checkout(target)
    }

    fn reset(&mut self, target: &Oid, mode: ResetMode) -> Result<(), GitError> {
        tracing::info!(oid = %target, %mode, "reset");
        self.git.reset(target, mode)
    }

    fn stash_save(&mut self, label: &str) -> Result<(), GitError> {
        tracing::info!(label, "stash save");
        self.git.stash_save(label).map(|_| ())
    }

    fn stash_pop(&mut self, index: usize) -> Result<(), GitError> {
        tracing::info!(index, "stash pop");
        self.git.stash_pop(index)
    }

    fn any_tracked_file_dirty(&self) -> Result<bool, GitError> {
        self.git.has_tracked_changes()
    }
}
