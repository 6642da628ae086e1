//! engine
//!
//! Reflog ledger and undo planner.
//!
//! # Architecture
//!
//! History flows one way:
//!
//! ```text
//! Backend::fetch_history -> Ledger::refresh -> plan_undo -> step -> Backend mutation
//!         ^                                                               |
//!         +------------------------ refresh_side_panels <-----------------+
//! ```
//!
//! 1. **Ledger** ([`ledger`]): newest-first history plus the undo cursor;
//!    growth moves the cursor depending on who caused it
//! 2. **Rules** ([`rules`]): ordered matchers turning an entry into a step
//! 3. **Plan** ([`plan`]): pure scan from the cursor, first consuming rule wins
//! 4. **Reset** ([`reset`]): the guarded hard reset with autostash
//! 5. **Session** ([`session`]): selection, preview and prompts on top
//!
//! # Invariants
//!
//! - `0 <= cursor <= len(entries)` after every refresh
//! - Undo mode is only ever set through an [`ledger::UndoScope`], so it is
//!   cleared on every exit path
//! - Planning never performs I/O
//!
//! # Example
//!
//! ```
//! use rewind::engine::mock::{MockBackend, MockPreviewer};
//! use rewind::engine::rules::RuleSet;
//! use rewind::engine::session::{Session, UndoOutcome};
//!
//! let backend = MockBackend::with_history(&["checkout: moving from main to topic"]);
//! let mut session = Session::new(backend, MockPreviewer::new(), RuleSet::standard().unwrap(), "stash: ");
//! session.refresh();
//!
//! assert!(matches!(session.undo(), UndoOutcome::Applied(_)));
//! ```

pub mod git_backend;
pub mod ledger;
pub mod mock;
pub mod plan;
pub mod reset;
pub mod rules;
pub mod selection;
pub mod session;
pub mod traits;

// Re-exports for convenience
pub use git_backend::GitBackend;
pub use ledger::{CursorChange, Ledger, UndoContext, UndoMode, UndoScope};
pub use plan::{plan_undo, PlanError, UndoPlan};
pub use reset::{GuardedReset, PendingAutostash, ResetOutcome, ResetStage, ResetState};
pub use rules::{CheckoutMoveRule, ResetToPrecedingRule, RuleSet, UndoRule, UndoStep, Verdict};
pub use selection::Selection;
pub use session::{PendingConfirmation, Resolution, Session, UndoOutcome};
pub use traits::{Backend, HistorySource, Host, PreviewSlot, Previewer};

use std::path::PathBuf;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}
