//! engine::plan
//!
//! Deterministic undo planning.
//!
//! # Algorithm
//!
//! Starting at the ledger cursor and walking towards older entries, each
//! candidate is evaluated against the rules in priority order:
//!
//! - `NoMatch` tries the next rule
//! - `Weak` abandons the candidate and moves on to the next older entry
//! - `Consumed` stops the scan: that step is the plan
//! - `MissingPreceding` fails the plan; a reset target is never guessed
//!
//! Running out of candidates is not an error, just nothing to undo.
//!
//! # Invariants
//!
//! - Planner does not perform I/O
//! - Planner does not mutate any state
//! - At most one step per plan

use thiserror::Error;

use crate::core::types::HistoryEntry;
use crate::engine::ledger::Ledger;
use crate::engine::rules::{RuleSet, UndoStep, Verdict};

/// Errors from planning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The entry to undo is the oldest one, so the state before it is unknown.
    #[error("cannot undo '{message}': no earlier history entry to return to")]
    NoPrecedingState {
        /// Index of the entry in the ledger
        index: usize,
        /// The entry's reflog message
        message: String,
    },
}

/// One corrective step and the entry it reverses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoPlan {
    /// Ledger index of the entry being undone
    pub index: usize,
    /// The entry being undone
    pub entry: HistoryEntry,
    /// Name of the rule that produced the step
    pub rule: &'static str,
    /// What to do
    pub step: UndoStep,
}

/// Find the step that reverses the most recent unconsumed history entry.
///
/// Returns `Ok(None)` when no rule consumes anything in the remaining history.
pub fn plan_undo(ledger: &Ledger, rules: &RuleSet) -> Result<Option<UndoPlan>, PlanError> {
    for (index, entry) in ledger.unconsumed() {
        let preceding = ledger.preceding(index);

        for rule in rules.iter() {
            match rule.evaluate(entry, preceding) {
                Verdict::NoMatch => continue,
                Verdict::Weak => {
                    tracing::debug!(index, rule = rule.name(), message = %entry.message, "weak match, skipping entry");
                    break;
                }
                Verdict::MissingPreceding => {
                    return Err(PlanError::NoPrecedingState {
                        index,
                        message: entry.message.clone(),
                    });
                }
                Verdict::Consumed(step) => {
                    tracing::debug!(index, rule = rule.name(), %step, "undo planned");
                    return Ok(Some(UndoPlan {
                        index,
                        entry: entry.clone(),
                        rule: rule.name(),
                        step,
                    }));
                }
            }
        }
    }

    tracing::debug!(cursor = ledger.cursor(), "nothing to undo");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Oid;
    use crate::engine::ledger::UndoContext;

    fn entry(n: usize, message: &str) -> HistoryEntry {
        HistoryEntry::new(Oid::new(format!("{:040x}", n + 1)).unwrap(), message)
    }

    fn ledger(messages: &[&str]) -> Ledger {
        let mut ledger = Ledger::new();
        let entries = messages
            .iter()
            .enumerate()
            .map(|(n, m)| entry(n, m))
            .collect();
        ledger.refresh(entries, &UndoContext::new());
        ledger
    }

    fn rules() -> RuleSet {
        RuleSet::standard().unwrap()
    }

    #[test]
    fn empty_history_plans_nothing() {
        assert_eq!(plan_undo(&Ledger::new(), &rules()), Ok(None));
    }

    #[test]
    fn newest_checkout_wins() {
        let ledger = ledger(&["checkout: moving from A to B", "commit: x"]);
        let plan = plan_undo(&ledger, &rules()).unwrap().unwrap();
        assert_eq!(plan.index, 0);
        assert_eq!(plan.rule, "checkout-move");
        assert_eq!(
            plan.step,
            UndoStep::Checkout {
                target: "A".into()
            }
        );
    }

    #[test]
    fn commit_resets_to_preceding_entry() {
        let ledger = ledger(&["commit: x", "checkout: moving from A to B"]);
        let plan = plan_undo(&ledger, &rules()).unwrap().unwrap();
        assert_eq!(
            plan.step,
            UndoStep::ResetTo {
                target: ledger.entries()[1].id.clone()
            }
        );
    }

    #[test]
    fn weak_match_falls_through_to_older_entry() {
        let ledger = ledger(&["checkout: moving from", "checkout: moving from C to D"]);
        let plan = plan_undo(&ledger, &rules()).unwrap().unwrap();
        assert_eq!(plan.index, 1);
        assert_eq!(
            plan.step,
            UndoStep::Checkout {
                target: "C".into()
            }
        );
    }

    #[test]
    fn unrecognised_entries_are_skipped() {
        let ledger = ledger(&[
            "reset: moving to HEAD~1",
            "pull: Fast-forward",
            "commit: y",
            "commit: x",
        ]);
        let plan = plan_undo(&ledger, &rules()).unwrap().unwrap();
        assert_eq!(plan.index, 2);
    }

    #[test]
    fn rebase_resets_to_tip_before_start() {
        let ledger = ledger(&[
            "rebase (pick): c",
            "rebase (reword): b-reworded",
            "rebase: fast-forward",
            "rebase (start): checkout HEAD~2",
            "commit: c",
            "commit: b",
        ]);
        let plan = plan_undo(&ledger, &rules()).unwrap().unwrap();
        assert_eq!(plan.index, 3);
        assert_eq!(
            plan.step,
            UndoStep::ResetTo {
                target: ledger.entries()[4].id.clone()
            }
        );
    }

    #[test]
    fn nothing_recognised_is_noop() {
        let ledger = ledger(&["reset: moving to HEAD~1", "merge topic: Fast-forward"]);
        assert_eq!(plan_undo(&ledger, &rules()), Ok(None));
    }

    #[test]
    fn scan_starts_at_cursor() {
        let mut ledger = ledger(&["commit: b", "commit: a"]);
        let ctx = UndoContext::new();
        {
            let _scope = ctx.begin_undo();
            let mut grown = vec![entry(7, "reset: moving to a")];
            grown.extend(ledger.entries().iter().cloned());
            ledger.refresh(grown, &ctx);
        }
        assert_eq!(ledger.cursor(), 1);

        let plan = plan_undo(&ledger, &rules()).unwrap().unwrap();
        // Absolute index: preceding entry is ledger[2], not relative to the cursor
        assert_eq!(plan.index, 1);
        assert_eq!(
            plan.step,
            UndoStep::ResetTo {
                target: ledger.entries()[2].id.clone()
            }
        );
    }

    #[test]
    fn cursor_at_end_is_noop() {
        let ctx = UndoContext::new();
        let mut ledger = Ledger::new();
        {
            let _scope = ctx.begin_undo();
            ledger.refresh(vec![entry(0, "commit: b"), entry(1, "commit: a")], &ctx);
        }
        assert_eq!(ledger.cursor(), ledger.len());
        assert_eq!(plan_undo(&ledger, &rules()), Ok(None));
    }

    #[test]
    fn oldest_remaining_commit_fails() {
        let mut ledger = ledger(&["commit: a"]);
        let ctx = UndoContext::new();
        {
            let _scope = ctx.begin_undo();
            let mut grown = vec![entry(5, "reset: moving to a")];
            grown.extend(ledger.entries().iter().cloned());
            ledger.refresh(grown, &ctx);
        }
        assert_eq!(ledger.cursor(), 1);
        // Remaining entry is the initial commit with nothing before it
        assert!(matches!(
            plan_undo(&ledger, &rules()),
            Err(PlanError::NoPrecedingState { index: 1, .. })
        ));
    }

    #[test]
    fn oldest_commit_fails_explicitly() {
        let ledger = ledger(&["commit (initial): first"]);
        assert_eq!(
            plan_undo(&ledger, &rules()),
            Err(PlanError::NoPrecedingState {
                index: 0,
                message: "commit (initial): first".into()
            })
        );
    }
}
