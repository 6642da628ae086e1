//! undo command - Undo the most recent recognised reflog action
//!
//! Runs one undo step from the top of the reflog:
//! - `checkout: moving from X ...` checks `X` out again
//! - `commit...` / `rebase -i (start)` hard resets to the previous entry
//!
//! A dirty working tree needs confirmation before the reset stashes and
//! re-applies local changes. Without a terminal the confirmation cannot be
//! given and the undo is declined.

use super::Workspace;
use crate::core::types::Oid;
use crate::engine::ledger::{Ledger, UndoContext};
use crate::engine::plan::plan_undo;
use crate::engine::rules::RuleSet;
use crate::engine::session::{Resolution, Session, UndoOutcome};
use crate::engine::traits::{HistorySource, PreviewSlot, Previewer};
use crate::engine::{Context, GitBackend};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{self, PromptError};
use anyhow::{bail, Context as _, Result};

/// Previewer for one-shot commands that have nowhere to show a preview.
#[derive(Debug, Default)]
struct NoPreview;

impl Previewer for NoPreview {
    fn stream_show(&mut self, _id: &Oid, _slot: PreviewSlot) {}

    fn show_message(&mut self, _message: &str, _slot: PreviewSlot) {}
}

/// Undo one step.
pub fn undo(ctx: &Context, dry_run: bool) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let interactive = ws.interactive(ctx);
    let rules = RuleSet::standard().context("Failed to compile undo rules")?;
    let backend = GitBackend::new(ws.git);

    if dry_run {
        let mut ledger = Ledger::new();
        ledger.refresh(backend.fetch_history()?, &UndoContext::new());
        match plan_undo(&ledger, &rules)? {
            Some(plan) => output::print(
                format!("Would undo '{}': {}", plan.entry.message, plan.step),
                verbosity,
            ),
            None => output::print("Nothing to undo", verbosity),
        }
        return Ok(());
    }

    let mut session = Session::new(backend, NoPreview, rules, ws.config.stash_prefix());
    session.refresh();
    fail_on_errors(&mut session)?;

    match session.undo() {
        UndoOutcome::NothingToUndo => output::print("Nothing to undo", verbosity),
        UndoOutcome::Applied(plan) => output::success(
            format!("Undid '{}': {}", plan.entry.message, plan.step),
            verbosity,
        ),
        UndoOutcome::AwaitingConfirmation(plan) => {
            let (title, prompt) = match session.pending() {
                Some(pending) => (pending.title(), pending.prompt()),
                None => bail!("undo lost its confirmation prompt"),
            };
            let accepted = match prompts::confirm(title, prompt, interactive) {
                Ok(answer) => answer,
                Err(PromptError::NotInteractive) => {
                    session.decline();
                    bail!("local changes must be stashed to undo; rerun interactively");
                }
                Err(e) => {
                    session.decline();
                    return Err(e.into());
                }
            };
            if !accepted {
                session.decline();
                output::print("Undo cancelled", verbosity);
                return Ok(());
            }
            if session.confirm() == Resolution::Done {
                output::success(
                    format!("Undid '{}': {}", plan.entry.message, plan.step),
                    verbosity,
                );
            }
        }
        UndoOutcome::Failed => {}
    }

    fail_on_errors(&mut session)
}

fn fail_on_errors(session: &mut Session<GitBackend, NoPreview>) -> Result<()> {
    let errors = session.take_errors();
    let Some(last) = errors.last() else {
        return Ok(());
    };
    for message in &errors[..errors.len() - 1] {
        output::error(message);
    }
    bail!("{}", last)
}
