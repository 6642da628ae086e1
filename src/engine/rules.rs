//! engine::rules
//!
//! Ordered rules that recognise a reflog message and name the step that
//! reverses it.
//!
//! # Rule Order
//!
//! Rules are evaluated in a fixed priority order and the first rule that
//! produces a step wins:
//!
//! 1. [`CheckoutMoveRule`] - `checkout: moving from <ref> ...` is undone by
//!    checking `<ref>` out again
//! 2. [`ResetToPrecedingRule`] - `commit...` and `rebase [-i] (start)` are
//!    undone by a guarded hard reset to the state before the entry
//!
//! Matching lives entirely behind [`UndoRule`], so a rule may use a regular
//! expression, a structured parse, or anything else without the scanning
//! algorithm in [`crate::engine::plan`] knowing about it.

use regex::Regex;

use crate::core::types::{HistoryEntry, Oid};

/// A corrective action reversing one history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoStep {
    /// Check out a ref name or revision.
    Checkout {
        /// What to check out
        target: String,
    },
    /// Hard reset (with autostash when the tree is dirty) to a commit.
    ResetTo {
        /// Commit to reset to
        target: Oid,
    },
}

impl std::fmt::Display for UndoStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndoStep::Checkout { target } => write!(f, "checkout {}", target),
            UndoStep::ResetTo { target } => write!(f, "hard reset to {}", target.short(7)),
        }
    }
}

/// Result of evaluating one rule against one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The rule does not recognise the message.
    NoMatch,
    /// The pattern matched but carried nothing usable (e.g. no ref name).
    /// Such an entry cannot be trusted and is skipped.
    Weak,
    /// The rule consumes the entry with this step.
    Consumed(UndoStep),
    /// The rule recognises the entry but the state it would restore is
    /// unknown (oldest entry in history).
    MissingPreceding,
}

/// A single pattern/action pair.
pub trait UndoRule: std::fmt::Debug {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Evaluate against `entry`; `preceding` is the entry recorded right
    /// before it, absent for the oldest entry.
    fn evaluate(&self, entry: &HistoryEntry, preceding: Option<&HistoryEntry>) -> Verdict;
}

/// Undo a checkout by checking out the ref it moved away from.
#[derive(Debug)]
pub struct CheckoutMoveRule {
    pattern: Regex,
}

impl CheckoutMoveRule {
    /// Pattern for checkout entries; the source ref capture is optional so
    /// that a bare `checkout: moving from` is recognised as a weak match.
    pub const PATTERN: &'static str = r"^checkout: moving from(?: (\S+))?";

    /// Compile the rule.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(Self::PATTERN)?,
        })
    }
}

impl UndoRule for CheckoutMoveRule {
    fn name(&self) -> &'static str {
        "checkout-move"
    }

    fn evaluate(&self, entry: &HistoryEntry, _preceding: Option<&HistoryEntry>) -> Verdict {
        let Some(caps) = self.pattern.captures(&entry.message) else {
            return Verdict::NoMatch;
        };
        match caps.get(1) {
            Some(source) => Verdict::Consumed(UndoStep::Checkout {
                target: source.as_str().to_string(),
            }),
            None => Verdict::Weak,
        }
    }
}

/// Undo a commit or the start of a rebase by resetting to the state
/// recorded just before it.
///
/// Current git writes `rebase (start): ...` for plain and interactive
/// rebases alike; older versions wrote `rebase -i (start): ...`.
#[derive(Debug)]
pub struct ResetToPrecedingRule {
    pattern: Regex,
}

impl ResetToPrecedingRule {
    /// Pattern for commit-like entries.
    pub const PATTERN: &'static str = r"^commit|^rebase( -i)? \(start\)";

    /// Compile the rule.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(Self::PATTERN)?,
        })
    }
}

impl UndoRule for ResetToPrecedingRule {
    fn name(&self) -> &'static str {
        "reset-to-preceding"
    }

    fn evaluate(&self, entry: &HistoryEntry, preceding: Option<&HistoryEntry>) -> Verdict {
        if !self.pattern.is_match(&entry.message) {
            return Verdict::NoMatch;
        }
        match preceding {
            Some(before) => Verdict::Consumed(UndoStep::ResetTo {
                target: before.id.clone(),
            }),
            None => Verdict::MissingPreceding,
        }
    }
}

/// The ordered rule list.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Box<dyn UndoRule>>,
}

impl RuleSet {
    /// Build from an explicit list, highest priority first.
    pub fn new(rules: Vec<Box<dyn UndoRule>>) -> Self {
        Self { rules }
    }

    /// The built-in rules in priority order.
    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            Box::new(CheckoutMoveRule::new()?),
            Box::new(ResetToPrecedingRule::new()?),
        ]))
    }

    /// Rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn UndoRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, message: &str) -> HistoryEntry {
        HistoryEntry::new(Oid::new(format!("{:040x}", n + 1)).unwrap(), message)
    }

    mod checkout_move {
        use super::*;

        #[test]
        fn captures_source_ref() {
            let rule = CheckoutMoveRule::new().unwrap();
            let verdict = rule.evaluate(&entry(0, "checkout: moving from main to feature"), None);
            assert_eq!(
                verdict,
                Verdict::Consumed(UndoStep::Checkout {
                    target: "main".into()
                })
            );
        }

        #[test]
        fn captures_detached_sha() {
            let rule = CheckoutMoveRule::new().unwrap();
            let verdict = rule.evaluate(&entry(0, "checkout: moving from 1a2b3c4 to main"), None);
            assert_eq!(
                verdict,
                Verdict::Consumed(UndoStep::Checkout {
                    target: "1a2b3c4".into()
                })
            );
        }

        #[test]
        fn missing_source_is_weak() {
            let rule = CheckoutMoveRule::new().unwrap();
            assert_eq!(
                rule.evaluate(&entry(0, "checkout: moving from"), None),
                Verdict::Weak
            );
            assert_eq!(
                rule.evaluate(&entry(0, "checkout: moving from  to main"), None),
                Verdict::Weak
            );
        }

        #[test]
        fn other_messages_do_not_match() {
            let rule = CheckoutMoveRule::new().unwrap();
            assert_eq!(
                rule.evaluate(&entry(0, "commit: checkout: moving from a"), None),
                Verdict::NoMatch
            );
        }
    }

    mod reset_to_preceding {
        use super::*;

        #[test]
        fn commit_targets_preceding_entry() {
            let rule = ResetToPrecedingRule::new().unwrap();
            let before = entry(1, "checkout: moving from a to b");
            let verdict = rule.evaluate(&entry(0, "commit: add parser"), Some(&before));
            assert_eq!(
                verdict,
                Verdict::Consumed(UndoStep::ResetTo {
                    target: before.id.clone()
                })
            );
        }

        #[test]
        fn commit_variants_match() {
            let rule = ResetToPrecedingRule::new().unwrap();
            let before = entry(1, "commit: base");
            for message in [
                "commit (amend): fix",
                "commit (initial): first",
                "commit (merge): Merge branch 'x'",
                "rebase -i (start): checkout main",
                "rebase (start): checkout main",
                "rebase (start): checkout HEAD~2",
            ] {
                assert!(
                    matches!(
                        rule.evaluate(&entry(0, message), Some(&before)),
                        Verdict::Consumed(_)
                    ),
                    "{message} should match"
                );
            }
        }

        #[test]
        fn rebase_finish_does_not_match() {
            let rule = ResetToPrecedingRule::new().unwrap();
            assert_eq!(
                rule.evaluate(&entry(0, "rebase -i (finish): returning to refs/heads/main"), None),
                Verdict::NoMatch
            );
        }

        #[test]
        fn rebase_steps_do_not_match() {
            let rule = ResetToPrecedingRule::new().unwrap();
            for message in [
                "rebase (pick): c",
                "rebase (reword): b",
                "rebase: fast-forward",
                "rebase (finish): returning to refs/heads/main",
            ] {
                assert_eq!(rule.evaluate(&entry(0, message), None), Verdict::NoMatch);
            }
        }

        #[test]
        fn oldest_entry_has_no_target() {
            let rule = ResetToPrecedingRule::new().unwrap();
            assert_eq!(
                rule.evaluate(&entry(0, "commit (initial): first"), None),
                Verdict::MissingPreceding
            );
        }
    }

    #[test]
    fn standard_set_is_checkout_first() {
        let rules = RuleSet::standard().unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["checkout-move", "reset-to-preceding"]);
    }

    #[test]
    fn step_display() {
        let step = UndoStep::Checkout {
            target: "main".into(),
        };
        assert_eq!(step.to_string(), "checkout main");
    }
}
