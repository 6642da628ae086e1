//! Integration tests for undo against real repositories.
//!
//! A [`Session`] drives [`GitBackend`] on a tempfile repository built with
//! the git CLI, so reflog messages are exactly what git writes.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use rewind::core::types::{Oid, ResetMode};
use rewind::engine::mock::MockPreviewer;
use rewind::engine::rules::RuleSet;
use rewind::engine::session::{PendingConfirmation, Resolution, Session, UndoOutcome};
use rewind::engine::GitBackend;
use rewind::git::Git;

const PREFIX: &str = "Auto-stashing changes for ";

// =============================================================================
// Test Fixtures
// =============================================================================

struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit on main.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        std::fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// HEAD commit, read through the git CLI.
    fn head(&self) -> Oid {
        Oid::new(git_stdout(self.path(), &["rev-parse", "HEAD"]).unwrap()).unwrap()
    }

    /// Current branch, or `None` when HEAD is detached.
    fn branch(&self) -> Option<String> {
        git_stdout(self.path(), &["symbolic-ref", "--quiet", "--short", "HEAD"])
    }

    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    fn commit_file(&self, path: &str, content: &str, message: &str) -> Oid {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
        self.head()
    }

    fn session(&self) -> Session<GitBackend, MockPreviewer> {
        let mut session = Session::new(
            GitBackend::new(self.git()),
            MockPreviewer::new(),
            RuleSet::standard().unwrap(),
            PREFIX,
        );
        session.refresh();
        assert!(session.take_errors().is_empty());
        session
    }

    fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).unwrap()
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    run_git_env(dir, args, &[]);
}

/// Run a git command with extra environment, e.g. a scripted editor.
fn run_git_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) {
    let output = Command::new("git")
        .args(args)
        .envs(env.iter().copied())
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Run a git command and return its trimmed stdout, or `None` on failure.
fn git_stdout(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

// =============================================================================
// Undo
// =============================================================================

#[test]
fn undo_commit_resets_to_previous_state() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("a.txt", "a\n", "add a");

    let mut session = repo.session();
    let outcome = session.undo();

    assert!(matches!(outcome, UndoOutcome::Applied(ref plan) if plan.entry.message == "commit: add a"));
    assert_eq!(repo.head(), first);
    assert!(!repo.path().join("a.txt").exists());
    assert_eq!(session.ledger().cursor(), 1);
    assert!(session.take_errors().is_empty());
}

#[test]
fn undo_checkout_returns_to_previous_branch() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-b", "topic"]);

    let mut session = repo.session();
    let outcome = session.undo();

    assert!(matches!(outcome, UndoOutcome::Applied(_)));
    assert_eq!(repo.branch(), Some("main".to_string()));
    assert!(session.ledger().entries()[0]
        .message
        .starts_with("checkout: moving from topic to main"));
    assert_eq!(session.ledger().cursor(), 1);
}

#[test]
fn undo_interactive_rebase_restores_original_tip() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-b", "side"]);
    repo.commit_file("side.txt", "s\n", "side work");
    run_git(repo.path(), &["checkout", "main"]);
    repo.commit_file("a.txt", "a\n", "add a");
    let tip = repo.commit_file("b.txt", "b\n", "add b");

    run_git_env(
        repo.path(),
        &["rebase", "-i", "side"],
        &[("GIT_SEQUENCE_EDITOR", "true"), ("GIT_EDITOR", "true")],
    );
    assert_ne!(repo.head(), tip);
    assert!(repo.path().join("side.txt").exists());

    let mut session = repo.session();
    let outcome = session.undo();

    assert!(matches!(
        outcome,
        UndoOutcome::Applied(ref plan) if plan.entry.message.contains("(start)")
    ));
    // Back on the pre-rebase tip, not the commit before it
    assert_eq!(repo.head(), tip);
    assert!(repo.path().join("b.txt").exists());
    assert!(!repo.path().join("side.txt").exists());
    assert!(session.take_errors().is_empty());
}

#[test]
fn initial_commit_cannot_be_undone() {
    let repo = TestRepo::new();
    let mut session = repo.session();

    assert_eq!(session.undo(), UndoOutcome::Failed);
    assert_eq!(session.take_errors().len(), 1);
    assert_eq!(session.ledger().len(), 1);
}

#[test]
fn user_action_after_undo_restarts_from_top() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "a\n", "add a");

    let mut session = repo.session();
    session.undo();
    assert_eq!(session.ledger().cursor(), 1);

    repo.commit_file("b.txt", "b\n", "add b");
    session.refresh();
    assert_eq!(session.ledger().cursor(), 0);
}

// =============================================================================
// Autostash
// =============================================================================

#[test]
fn dirty_undo_waits_for_confirmation() {
    let repo = TestRepo::new();
    let second = repo.commit_file("a.txt", "a\n", "add a");
    std::fs::write(repo.path().join("README.md"), "# Local edit\n").unwrap();

    let mut session = repo.session();
    let outcome = session.undo();

    assert!(matches!(outcome, UndoOutcome::AwaitingConfirmation(_)));
    assert!(matches!(
        session.pending(),
        Some(PendingConfirmation::Autostash(_))
    ));
    // Nothing moved yet
    assert_eq!(repo.head(), second);
    assert_eq!(repo.read("README.md"), "# Local edit\n");
}

#[test]
fn confirmed_autostash_carries_changes_across() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("a.txt", "a\n", "add a");
    std::fs::write(repo.path().join("README.md"), "# Local edit\n").unwrap();

    let mut session = repo.session();
    session.undo();
    assert_eq!(session.confirm(), Resolution::Done);

    let mut git = repo.git();
    assert_eq!(repo.head(), first);
    assert_eq!(repo.read("README.md"), "# Local edit\n");
    assert!(git.stash_messages().unwrap().is_empty());
    assert!(session.take_errors().is_empty());
    assert!(!session.undo_context().is_undoing());
}

#[test]
fn declined_autostash_changes_nothing() {
    let repo = TestRepo::new();
    let second = repo.commit_file("a.txt", "a\n", "add a");
    std::fs::write(repo.path().join("README.md"), "# Local edit\n").unwrap();

    let mut session = repo.session();
    session.undo();
    assert_eq!(session.decline(), Resolution::Declined);

    assert_eq!(repo.head(), second);
    assert_eq!(repo.read("README.md"), "# Local edit\n");
    assert_eq!(session.ledger().len(), 2);
}

#[test]
fn conflicting_pop_keeps_reset_and_stash() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("README.md", "# Committed\n", "edit readme");
    std::fs::write(repo.path().join("README.md"), "# Local edit\n").unwrap();

    let mut session = repo.session();
    session.undo();
    assert_eq!(session.confirm(), Resolution::Failed);

    let mut git = repo.git();
    // The reset stands and the stash is left for manual resolution
    assert_eq!(repo.head(), first);
    assert_eq!(git.stash_messages().unwrap().len(), 1);
    assert_eq!(session.take_errors().len(), 1);
    assert!(session.ledger().entries()[0].message.starts_with("reset: moving to "));
}

// =============================================================================
// User commands
// =============================================================================

#[test]
fn checkout_selected_after_confirmation() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("a.txt", "a\n", "add a");

    let mut session = repo.session();
    session.select(1);
    assert!(session.checkout_selected());
    assert_eq!(session.confirm(), Resolution::Done);

    assert_eq!(repo.head(), first);
    assert_eq!(repo.branch(), None);
    assert_eq!(session.ledger().cursor(), 0);
}

#[test]
fn mixed_reset_keeps_working_tree() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "a\n", "add a");

    let mut session = repo.session();
    session.select(1);
    assert!(session.reset_selected(ResetMode::Mixed));

    assert!(repo.path().join("a.txt").exists());
    assert_eq!(repo.git().worktree_status(true).unwrap().untracked, 1);
}
