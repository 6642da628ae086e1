//! engine::ledger
//!
//! The reflog ledger: the newest-first history the undo flow walks, plus the
//! undo cursor.
//!
//! # Cursor
//!
//! Entries `[0, cursor)` have already been consumed by undo; the next undo
//! scan starts at `entries[cursor]`. The cursor only moves on refresh:
//!
//! - history grew while an undo step was running: the new entries were
//!   written by the undo itself, so the cursor advances past them
//! - history grew because of anything else: the user did something new,
//!   so undo starts over from the top
//! - history did not grow: the cursor stays put (clamped to the length)
//!
//! # Undo Mode
//!
//! Whether growth counts as undo-caused is carried by an [`UndoContext`]
//! that is passed by reference into every operation that can trigger a
//! refresh. Entering undo mode hands out an [`UndoScope`] guard; dropping
//! the guard restores user mode, so no exit path can leave the flag set.
//!
//! # Example
//!
//! ```
//! use rewind::core::types::{HistoryEntry, Oid};
//! use rewind::engine::ledger::{Ledger, UndoContext};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let ctx = UndoContext::new();
//! let mut ledger = Ledger::new();
//! ledger.refresh(vec![HistoryEntry::new(oid.clone(), "commit: one")], &ctx);
//!
//! {
//!     let _scope = ctx.begin_undo();
//!     let grown = vec![
//!         HistoryEntry::new(oid.clone(), "reset: moving to HEAD~1"),
//!         HistoryEntry::new(oid, "commit: one"),
//!     ];
//!     ledger.refresh(grown, &ctx);
//! }
//!
//! assert_eq!(ledger.cursor(), 1);
//! assert!(!ctx.is_undoing());
//! ```

use std::cell::Cell;

use crate::core::types::HistoryEntry;

/// Who is responsible for history growth observed on the next refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoMode {
    /// Growth comes from ordinary user actions.
    #[default]
    User,
    /// Growth comes from a corrective step of the undo flow.
    Undo,
}

/// Undo mode shared by the session loop, the reset executor and refresh.
///
/// Single-threaded by construction (the interaction loop is the only
/// writer), so a `Cell` is enough.
#[derive(Debug, Default)]
pub struct UndoContext {
    mode: Cell<UndoMode>,
}

impl UndoContext {
    /// Create a context in user mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> UndoMode {
        self.mode.get()
    }

    /// Whether an undo-triggered step is in flight.
    pub fn is_undoing(&self) -> bool {
        self.mode() == UndoMode::Undo
    }

    /// Enter undo mode until the returned guard is dropped.
    ///
    /// Nested scopes are allowed; the outermost one restores the previous
    /// mode.
    #[must_use = "undo mode ends as soon as the scope is dropped"]
    pub fn begin_undo(&self) -> UndoScope<'_> {
        let previous = self.mode.replace(UndoMode::Undo);
        UndoScope {
            ctx: self,
            previous,
        }
    }
}

/// Guard that keeps an [`UndoContext`] in undo mode while alive.
#[derive(Debug)]
pub struct UndoScope<'a> {
    ctx: &'a UndoContext,
    previous: UndoMode,
}

impl Drop for UndoScope<'_> {
    fn drop(&mut self) {
        self.ctx.mode.set(self.previous);
    }
}

/// How a refresh moved the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorChange {
    /// History did not grow; cursor untouched (or clamped after shrinking).
    Unchanged,
    /// Undo-caused growth; cursor advanced by this many entries.
    Advanced(usize),
    /// User-caused growth; cursor back at the top.
    Reset,
}

/// Ordered history plus undo cursor.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no history.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the first entry not yet consumed by undo.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// The entry recorded just before `index`: the state that entry's
    /// mutation started from.
    pub fn preceding(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index + 1)
    }

    /// Unconsumed entries with their absolute indices, newest first.
    pub fn unconsumed(&self) -> impl Iterator<Item = (usize, &HistoryEntry)> {
        self.entries.iter().enumerate().skip(self.cursor)
    }

    /// Replace the history wholesale with a freshly fetched sequence.
    ///
    /// Growth is classified by `ctx`: undo-caused growth advances the cursor
    /// past the new entries, any other growth resets it to the top.
    pub fn refresh(&mut self, entries: Vec<HistoryEntry>, ctx: &UndoContext) -> CursorChange {
        let previous_length = self.entries.len();
        let mut change = CursorChange::Unchanged;

        if entries.len() > previous_length {
            let grown = entries.len() - previous_length;
            match ctx.mode() {
                UndoMode::Undo => {
                    self.cursor += grown;
                    change = CursorChange::Advanced(grown);
                }
                UndoMode::User => {
                    self.cursor = 0;
                    change = CursorChange::Reset;
                }
            }
        }

        self.entries = entries;

        // Only reachable when history shrank below the cursor (reflog expiry)
        if self.cursor > self.entries.len() {
            self.cursor = self.entries.len();
        }

        tracing::debug!(
            previous_length,
            length = self.entries.len(),
            cursor = self.cursor,
            ?change,
            "ledger refreshed"
        );

        change
    }
}
