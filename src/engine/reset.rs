//! engine::reset
//!
//! Guarded hard reset used by the undo flow.
//!
//! A hard reset destroys uncommitted changes to tracked files. When the
//! working tree is dirty, the reset is wrapped in stash save / stash pop,
//! after the user agrees to it.
//!
//! # State Machine
//!
//! ```text
//! Idle --clean--> Resetting --ok--> Idle
//!   |                 |
//!   +--dirty--> AwaitingConfirmation --confirm--> (stash) Resetting --ok--> PoppingStash --> Idle
//!                     |
//!                     +--decline--> Idle (no mutation)
//! ```
//!
//! Failures leave through `Idle` without reversing completed steps:
//!
//! - stash save fails: nothing else happens
//! - reset fails after stashing: the stash stays as a safety net
//! - pop fails after the reset: the reset stands, panels are refreshed
//!   first, then the error is reported; the stash entry stays for manual
//!   resolution
//!
//! # Confirmation
//!
//! Confirmation is two-phase. [`GuardedReset::begin`] returns
//! [`ResetOutcome::NeedsConfirmation`] holding a [`PendingAutostash`]; the
//! front end resolves it later with [`PendingAutostash::confirm`] or
//! [`PendingAutostash::decline`]. Undo mode is held only while mutations
//! actually run, so it is back to user mode whenever control returns to
//! the caller.
//!
//! This is only used by the undo flow; the plain reset menu does not stash.

use crate::core::types::Oid;
use crate::engine::ledger::UndoContext;
use crate::engine::traits::{Backend, Host};

/// Title of the autostash prompt.
pub const AUTOSTASH_TITLE: &str = "Auto-stash";

/// Body of the autostash prompt.
pub const AUTOSTASH_PROMPT: &str =
    "You must stash and pop your changes to bring them across. Do this automatically? (enter/esc)";

/// Where the executor currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    Idle,
    AwaitingConfirmation,
    Resetting {
        /// Whether a stash was saved and must be popped afterwards
        autostash: bool,
    },
    PoppingStash,
}

/// Sub-step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStage {
    Status,
    StashSave,
    Reset,
    StashPop,
}

/// How a guarded reset ended (or paused).
#[derive(Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Clean tree: reset done.
    Reset,
    /// Dirty tree: stash, reset and pop all done.
    ResetWithAutostash,
    /// Dirty tree: waiting for the user.
    NeedsConfirmation(PendingAutostash),
    /// The user said no; nothing was touched.
    Declined,
    /// A sub-step failed and was reported; earlier steps stand.
    Failed {
        /// The step that failed
        stage: ResetStage,
    },
}

/// A hard reset to `target` that protects local changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedReset {
    target: Oid,
    stash_label: String,
}

impl GuardedReset {
    /// Prepare a reset; the stash (if any) is labelled `<prefix><target>`.
    pub fn new(target: Oid, stash_prefix: &str) -> Self {
        let stash_label = format!("{}{}", stash_prefix, target);
        Self {
            target,
            stash_label,
        }
    }

    /// Commit the reset goes to.
    pub fn target(&self) -> &Oid {
        &self.target
    }

    /// Label used if changes need stashing.
    pub fn stash_label(&self) -> &str {
        &self.stash_label
    }

    /// Start the reset. Runs to completion on a clean tree; pauses for
    /// confirmation on a dirty one.
    pub fn begin<B, H>(self, backend: &mut B, host: &mut H, ctx: &UndoContext) -> ResetOutcome
    where
        B: Backend,
        H: Host + ?Sized,
    {
        let _scope = ctx.begin_undo();

        let dirty = match backend.any_tracked_file_dirty() {
            Ok(dirty) => dirty,
            Err(e) => {
                host.report_error(&e.to_string());
                return ResetOutcome::Failed {
                    stage: ResetStage::Status,
                };
            }
        };

        if dirty {
            transition(ResetState::Idle, ResetState::AwaitingConfirmation);
            return ResetOutcome::NeedsConfirmation(PendingAutostash { reset: self });
        }

        transition(ResetState::Idle, ResetState::Resetting { autostash: false });
        drive(
            ResetState::Resetting { autostash: false },
            &self.target,
            backend,
            host,
            ctx,
        )
    }
}

/// A guarded reset paused in `AwaitingConfirmation`.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingAutostash {
    reset: GuardedReset,
}

impl PendingAutostash {
    /// Commit the reset goes to.
    pub fn target(&self) -> &Oid {
        self.reset.target()
    }

    /// Prompt title.
    pub fn title(&self) -> &'static str {
        AUTOSTASH_TITLE
    }

    /// Prompt body.
    pub fn prompt(&self) -> &'static str {
        AUTOSTASH_PROMPT
    }

    /// The user accepted: stash, reset, pop.
    pub fn confirm<B, H>(self, backend: &mut B, host: &mut H, ctx: &UndoContext) -> ResetOutcome
    where
        B: Backend,
        H: Host + ?Sized,
    {
        let _scope = ctx.begin_undo();

        if let Err(e) = backend.stash_save(&self.reset.stash_label) {
            host.report_error(&e.to_string());
            transition(ResetState::AwaitingConfirmation, ResetState::Idle);
            return ResetOutcome::Failed {
                stage: ResetStage::StashSave,
            };
        }

        transition(
            ResetState::AwaitingConfirmation,
            ResetState::Resetting { autostash: true },
        );
        drive(
            ResetState::Resetting { autostash: true },
            &self.reset.target,
            backend,
            host,
            ctx,
        )
    }

    /// The user declined: nothing happens.
    pub fn decline(self) -> ResetOutcome {
        transition(ResetState::AwaitingConfirmation, ResetState::Idle);
        ResetOutcome::Declined
    }
}

/// Run the mutating states until the machine is back at `Idle`.
fn drive<B, H>(
    mut state: ResetState,
    target: &Oid,
    backend: &mut B,
    host: &mut H,
    ctx: &UndoContext,
) -> ResetOutcome
where
    B: Backend,
    H: Host + ?Sized,
{
    loop {
        match state {
            ResetState::Resetting { autostash } => {
                if let Err(e) = backend.hard_reset(target) {
                    host.report_error(&e.to_string());
                    transition(state, ResetState::Idle);
                    return ResetOutcome::Failed {
                        stage: ResetStage::Reset,
                    };
                }
                if !autostash {
                    host.refresh_side_panels(&*backend, ctx);
                    transition(state, ResetState::Idle);
                    return ResetOutcome::Reset;
                }
                transition(state, ResetState::PoppingStash);
                state = ResetState::PoppingStash;
            }
            ResetState::PoppingStash => {
                let popped = backend.stash_pop(0);
                host.refresh_side_panels(&*backend, ctx);
                transition(state, ResetState::Idle);
                return match popped {
                    Ok(()) => ResetOutcome::ResetWithAutostash,
                    Err(e) => {
                        host.report_error(&e.to_string());
                        ResetOutcome::Failed {
                            stage: ResetStage::StashPop,
                        }
                    }
                };
            }
            ResetState::Idle | ResetState::AwaitingConfirmation => {
                // Non-mutating states are never driven
                return ResetOutcome::Declined;
            }
        }
    }
}

fn transition(from: ResetState, to: ResetState) {
    tracing::debug!(?from, ?to, "guarded reset");
}
