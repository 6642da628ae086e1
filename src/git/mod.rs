//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and
//! writes flow through this interface. No other module imports `git2`.
//! We use the `git2` crate exclusively (no shelling out to the git CLI).
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Reflog reading (the history the undo flow walks)
//! - Checkout, reset, stash save and stash pop
//! - Working tree status
//! - Commit rendering for previews

mod interface;

pub use interface::{Git, GitError, RepoInfo, WorktreeStatus};
