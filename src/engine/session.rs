//! engine::session
//!
//! The reflog dashboard: ledger, selection, preview and pending prompt,
//! driven one input at a time.
//!
//! # Architecture
//!
//! [`Session`] owns the repository backend and the [`Panels`] that display
//! it. [`Panels`] is the [`Host`] the undo machinery talks to, so refreshing
//! after a mutation re-reads history, clamps the selection and re-previews
//! the highlighted entry in one place.
//!
//! Prompts are two-phase. An operation that needs the user's agreement
//! stores a [`PendingConfirmation`] and returns; [`Session::confirm`] or
//! [`Session::decline`] resolves it later. Other input is still accepted
//! meanwhile, and raising a new prompt replaces an unanswered one.

use crate::core::types::{HistoryEntry, Oid, ResetMode};
use crate::engine::ledger::{Ledger, UndoContext};
use crate::engine::plan::{plan_undo, UndoPlan};
use crate::engine::reset::{GuardedReset, PendingAutostash, ResetOutcome};
use crate::engine::rules::{RuleSet, UndoStep};
use crate::engine::selection::{on_select, Selection};
use crate::engine::traits::{Backend, HistorySource, Host, Previewer};

/// Title of the checkout prompt.
pub const CHECKOUT_TITLE: &str = "Checkout commit";

/// Body of the checkout prompt.
pub const CHECKOUT_PROMPT: &str = "Are you sure you want to checkout this commit?";

/// Everything that is redrawn from repository state.
#[derive(Debug)]
pub struct Panels<P> {
    ledger: Ledger,
    selection: Selection,
    previewer: P,
    errors: Vec<String>,
}

impl<P: Previewer> Panels<P> {
    fn new(previewer: P) -> Self {
        Self {
            ledger: Ledger::new(),
            selection: Selection::new(),
            previewer,
            errors: Vec::new(),
        }
    }

    fn preview_selected(&mut self) {
        on_select(self.selection.get(self.ledger.entries()), &mut self.previewer);
    }
}

impl<P: Previewer> Host for Panels<P> {
    fn report_error(&mut self, message: &str) {
        tracing::warn!(message, "reported error");
        self.errors.push(message.to_string());
    }

    fn refresh_side_panels(&mut self, source: &dyn HistorySource, ctx: &UndoContext) {
        match source.fetch_history() {
            Ok(entries) => {
                self.ledger.refresh(entries, ctx);
                self.selection.clamp(self.ledger.len());
                self.preview_selected();
            }
            Err(e) => self.report_error(&e.to_string()),
        }
    }
}

/// A question waiting for the user.
#[derive(Debug, PartialEq, Eq)]
pub enum PendingConfirmation {
    /// Stash local changes around an undo reset.
    Autostash(PendingAutostash),
    /// Check out the commit that was selected when the prompt was raised.
    CheckoutCommit(Oid),
}

impl PendingConfirmation {
    /// Prompt title.
    pub fn title(&self) -> &'static str {
        match self {
            PendingConfirmation::Autostash(pending) => pending.title(),
            PendingConfirmation::CheckoutCommit(_) => CHECKOUT_TITLE,
        }
    }

    /// Prompt body.
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingConfirmation::Autostash(pending) => pending.prompt(),
            PendingConfirmation::CheckoutCommit(_) => CHECKOUT_PROMPT,
        }
    }
}

/// Result of [`Session::undo`].
#[derive(Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    /// No rule consumed anything in the remaining history.
    NothingToUndo,
    /// The step ran to completion.
    Applied(UndoPlan),
    /// The step is waiting on [`Session::confirm`] or [`Session::decline`].
    AwaitingConfirmation(UndoPlan),
    /// Planning or the step failed; the error was reported.
    Failed,
}

/// Result of answering a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// There was no prompt to answer.
    NothingPending,
    /// The confirmed operation completed.
    Done,
    /// The user said no; nothing changed.
    Declined,
    /// The confirmed operation failed; the error was reported.
    Failed,
}

/// Interactive reflog session.
#[derive(Debug)]
pub struct Session<B, P> {
    backend: B,
    panels: Panels<P>,
    undo: UndoContext,
    rules: RuleSet,
    pending: Option<PendingConfirmation>,
    stash_prefix: String,
}

impl<B: Backend, P: Previewer> Session<B, P> {
    /// Create a session. Call [`Session::refresh`] to load history.
    pub fn new(backend: B, previewer: P, rules: RuleSet, stash_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            panels: Panels::new(previewer),
            undo: UndoContext::new(),
            rules,
            pending: None,
            stash_prefix: stash_prefix.into(),
        }
    }

    /// Re-read history. A fetch failure is reported and leaves the ledger
    /// as it was.
    ///
    /// New entries mean HEAD moved since an autostash prompt was raised, so
    /// an unanswered one is withdrawn rather than left to reset to a stale
    /// target.
    pub fn refresh(&mut self) {
        let before = self.panels.ledger.len();
        self.panels.refresh_side_panels(&self.backend, &self.undo);
        if self.panels.ledger.len() > before {
            self.withdraw_autostash();
        }
    }

    /// Highlight entry `index` (clamped) and preview it.
    pub fn select(&mut self, index: usize) {
        self.panels.selection.select(index, self.panels.ledger.len());
        self.panels.preview_selected();
    }

    /// Highlight the next older entry.
    pub fn select_next(&mut self) {
        self.panels.selection.select_next(self.panels.ledger.len());
        self.panels.preview_selected();
    }

    /// Highlight the next newer entry.
    pub fn select_prev(&mut self) {
        self.panels.selection.select_prev(self.panels.ledger.len());
        self.panels.preview_selected();
    }

    /// Plan and execute one undo step.
    pub fn undo(&mut self) -> UndoOutcome {
        let plan = match plan_undo(&self.panels.ledger, &self.rules) {
            Ok(Some(plan)) => plan,
            Ok(None) => return UndoOutcome::NothingToUndo,
            Err(e) => {
                self.panels.report_error(&e.to_string());
                return UndoOutcome::Failed;
            }
        };

        match plan.step.clone() {
            UndoStep::Checkout { target } => {
                let _scope = self.undo.begin_undo();
                match self.backend.checkout(&target) {
                    Ok(()) => {
                        self.panels.refresh_side_panels(&self.backend, &self.undo);
                        UndoOutcome::Applied(plan)
                    }
                    Err(e) => {
                        self.panels.report_error(&e.to_string());
                        UndoOutcome::Failed
                    }
                }
            }
            UndoStep::ResetTo { target } => {
                let reset = GuardedReset::new(target, &self.stash_prefix);
                match reset.begin(&mut self.backend, &mut self.panels, &self.undo) {
                    ResetOutcome::NeedsConfirmation(pending) => {
                        self.raise(PendingConfirmation::Autostash(pending));
                        UndoOutcome::AwaitingConfirmation(plan)
                    }
                    ResetOutcome::Reset | ResetOutcome::ResetWithAutostash => {
                        UndoOutcome::Applied(plan)
                    }
                    ResetOutcome::Declined | ResetOutcome::Failed { .. } => UndoOutcome::Failed,
                }
            }
        }
    }

    /// Ask to check out the selected entry. The selection jumps back to
    /// the newest entry. Returns `false` when nothing is selected.
    pub fn checkout_selected(&mut self) -> bool {
        let Some(entry) = self.selected_entry() else {
            return false;
        };
        let id = entry.id.clone();
        self.raise(PendingConfirmation::CheckoutCommit(id));
        self.select(0);
        true
    }

    /// Reset to the selected entry with `mode`. No autostash. Returns
    /// `false` when nothing is selected or the reset failed.
    pub fn reset_selected(&mut self, mode: ResetMode) -> bool {
        let Some(entry) = self.selected_entry() else {
            return false;
        };
        let id = entry.id.clone();
        match self.backend.reset(&id, mode) {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(e) => {
                self.panels.report_error(&e.to_string());
                false
            }
        }
    }

    /// Accept the pending prompt.
    pub fn confirm(&mut self) -> Resolution {
        let Some(pending) = self.pending.take() else {
            return Resolution::NothingPending;
        };

        match pending {
            PendingConfirmation::Autostash(pending) => {
                match pending.confirm(&mut self.backend, &mut self.panels, &self.undo) {
                    ResetOutcome::Reset | ResetOutcome::ResetWithAutostash => Resolution::Done,
                    ResetOutcome::NeedsConfirmation(again) => {
                        self.raise(PendingConfirmation::Autostash(again));
                        Resolution::NothingPending
                    }
                    ResetOutcome::Declined => Resolution::Declined,
                    ResetOutcome::Failed { .. } => Resolution::Failed,
                }
            }
            PendingConfirmation::CheckoutCommit(id) => match self.backend.checkout(id.as_str()) {
                Ok(()) => {
                    self.refresh();
                    Resolution::Done
                }
                Err(e) => {
                    self.panels.report_error(&e.to_string());
                    Resolution::Failed
                }
            },
        }
    }

    /// Dismiss the pending prompt without doing anything.
    pub fn decline(&mut self) -> Resolution {
        match self.pending.take() {
            Some(PendingConfirmation::Autostash(pending)) => {
                pending.decline();
                Resolution::Declined
            }
            Some(PendingConfirmation::CheckoutCommit(_)) => Resolution::Declined,
            None => Resolution::NothingPending,
        }
    }

    /// Drain errors reported since the last call.
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.panels.errors)
    }

    /// The history ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.panels.ledger
    }

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.panels.selection
    }

    /// The highlighted entry.
    pub fn selected_entry(&self) -> Option<&HistoryEntry> {
        self.panels.selection.get(self.panels.ledger.entries())
    }

    /// The unanswered prompt, if any.
    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    /// Undo mode shared with the ledger.
    pub fn undo_context(&self) -> &UndoContext {
        &self.undo
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn previewer(&self) -> &P {
        &self.panels.previewer
    }

    pub fn previewer_mut(&mut self) -> &mut P {
        &mut self.panels.previewer
    }

    fn withdraw_autostash(&mut self) {
        if !matches!(self.pending, Some(PendingConfirmation::Autostash(_))) {
            return;
        }
        if let Some(PendingConfirmation::Autostash(stale)) = self.pending.take() {
            tracing::debug!(oid = %stale.target(), "history moved, autostash prompt withdrawn");
            stale.decline();
        }
    }

    fn raise(&mut self, confirmation: PendingConfirmation) {
        if let Some(previous) = self.pending.replace(confirmation) {
            tracing::debug!(title = previous.title(), "unanswered prompt replaced");
        }
    }
}
