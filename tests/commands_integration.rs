//! Integration tests for the `rw` binary.
//!
//! These tests run the built binary against real git repositories and
//! check its output and exit status.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Fixtures
// =============================================================================

struct TestRepo {
    dir: TempDir,
    home: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit on main.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        run_git(dir.path(), &["init", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        std::fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        Self { dir, home }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn commit_file(&self, path: &str, content: &str, message: &str) {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    /// The binary, isolated from the user's config.
    fn rw(&self) -> Command {
        let mut cmd = Command::cargo_bin("rw").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path())
            .env_remove("REWIND_CONFIG")
            .env_remove("REWIND_LOG");
        cmd
    }

    fn write_repo_config(&self, contents: &str) {
        let dir = self.path().join(".git/rewind");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), contents).unwrap();
    }

    fn head(&self) -> String {
        let output = StdCommand::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
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

// =============================================================================
// Basics
// =============================================================================

#[test]
fn help_lists_commands() {
    Command::cargo_bin("rw")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("log"))
        .stdout(predicate::str::contains("undo"))
        .stdout(predicate::str::contains("session"));
}

#[test]
fn outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("rw")
        .unwrap()
        .current_dir(dir.path())
        .arg("log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open repository"));
}

// =============================================================================
// log
// =============================================================================

#[test]
fn log_prints_reflog() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "a\n", "add a");

    repo.rw()
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("commit: add a"))
        .stdout(predicate::str::contains("commit (initial): Initial commit"));
}

#[test]
fn log_json_is_parseable() {
    let repo = TestRepo::new();
    let output = repo.rw().args(["log", "--json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["index"], 0);
    assert_eq!(rows[0]["id"], repo.head());
}

#[test]
fn log_limit_from_repo_config() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "a\n", "add a");
    repo.commit_file("b.txt", "b\n", "add b");
    repo.write_repo_config("history_limit = 1\n");

    repo.rw()
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("add b"))
        .stdout(predicate::str::contains("add a").not());
}

#[test]
fn invalid_config_is_reported() {
    let repo = TestRepo::new();
    repo.write_repo_config("no_such_key = true\n");

    repo.rw()
        .arg("log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

// =============================================================================
// undo
// =============================================================================

#[test]
fn undo_dry_run_changes_nothing() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "a\n", "add a");
    let before = repo.head();

    repo.rw()
        .args(["undo", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would undo 'commit: add a'"));

    assert_eq!(repo.head(), before);
}

#[test]
fn undo_resets_commit() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("a.txt", "a\n", "add a");

    repo.rw()
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Undid 'commit: add a'"));

    assert_eq!(repo.head(), first);
}

#[test]
fn undo_with_local_changes_needs_terminal() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "a\n", "add a");
    std::fs::write(repo.path().join("README.md"), "# Local edit\n").unwrap();
    let before = repo.head();

    repo.rw()
        .args(["--no-interactive", "undo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rerun interactively"));

    assert_eq!(repo.head(), before);
}

#[test]
fn undo_initial_commit_fails() {
    let repo = TestRepo::new();
    repo.rw()
        .arg("undo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no earlier history entry"));
}

// =============================================================================
// session
// =============================================================================

#[test]
fn session_reads_commands_from_stdin() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("a.txt", "a\n", "add a");

    repo.rw()
        .arg("session")
        .write_stdin("list\nz\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("commit: add a"))
        .stdout(predicate::str::contains("Undid 'commit: add a'"));

    assert_eq!(repo.head(), first);
}

#[test]
fn session_show_prints_patch() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "hello\n", "add a");

    repo.rw()
        .write_stdin("show\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("+hello"));
}

#[test]
fn session_warns_on_unknown_input() {
    let repo = TestRepo::new();
    repo.rw()
        .arg("session")
        .write_stdin("frobnicate\nq\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown command 'frobnicate'"));
}
