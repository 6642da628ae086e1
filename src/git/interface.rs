//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! rewind. Every read of the reflog and every mutation the undo flow performs
//! (checkout, reset, stash save/pop) goes through [`Git`], which normalizes
//! libgit2 errors into typed failure categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref or revision does not exist
//! - [`GitError::Conflict`]: Checkout or stash pop would overwrite changes
//! - [`GitError::NothingToStash`]: Stash save found no local changes
//!
//! # Example
//!
//! ```ignore
//! use rewind::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for entry in git.reflog("HEAD", Some(10))? {
//!     println!("{} {}", entry.id.short(7), entry.message);
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::types::{HistoryEntry, Oid, ResetMode, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref or revision does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// The operation would overwrite local changes or hit a merge conflict.
    #[error("conflict: {message}")]
    Conflict {
        /// Description from libgit2
        message: String,
    },

    /// Stash save found nothing to stash.
    #[error("no local changes to stash")]
    NothingToStash,

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" || context.contains("ref") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Conflict
            | git2::ErrorCode::MergeConflict
            | git2::ErrorCode::Uncommitted => GitError::Conflict {
                message: format!("{}: {}", context, err.message()),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            other => GitError::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Index-side status bits.
const STAGED: git2::Status = git2::Status::INDEX_NEW
    .union(git2::Status::INDEX_MODIFIED)
    .union(git2::Status::INDEX_DELETED)
    .union(git2::Status::INDEX_RENAMED)
    .union(git2::Status::INDEX_TYPECHANGE);

/// Work-tree status bits for tracked files.
const UNSTAGED: git2::Status = git2::Status::WT_MODIFIED
    .union(git2::Status::WT_DELETED)
    .union(git2::Status::WT_RENAMED)
    .union(git2::Status::WT_TYPECHANGE);

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory
    pub git_dir: PathBuf,
    /// Path to working directory
    pub work_dir: PathBuf,
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files (if requested)
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if the worktree is completely clean (untracked files aside).
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }

    /// Whether any tracked file carries changes a hard reset would destroy.
    pub fn has_tracked_changes(&self) -> bool {
        !self.is_clean()
    }
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2` directly.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get repository information (git_dir and work_dir paths).
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        let git_dir = self.repo.path().to_path_buf();
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(RepoInfo { git_dir, work_dir })
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Read the reflog of `refname`, newest entry first.
    ///
    /// A ref without a reflog (fresh repository) yields an empty list.
    pub fn reflog(&self, refname: &str, limit: Option<usize>) -> Result<Vec<HistoryEntry>, GitError> {
        let reflog = self
            .repo
            .reflog(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;

        let take = limit.unwrap_or(usize::MAX);
        let mut entries = Vec::with_capacity(reflog.len().min(take));
        for entry in reflog.iter().take(take) {
            let id = Oid::new(entry.id_new().to_string())?;
            let message = entry.message().unwrap_or("").to_string();
            let when = DateTime::<Utc>::from_timestamp(entry.committer().when().seconds(), 0)
                .unwrap_or(DateTime::UNIX_EPOCH);
            entries.push(HistoryEntry::at(id, message, when));
        }

        Ok(entries)
    }

    // =========================================================================
    // Working Tree Status
    // =========================================================================

    /// Count staged, unstaged and (optionally) untracked paths.
    pub fn worktree_status(&self, include_untracked: bool) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(include_untracked).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        Ok(statuses
            .iter()
            .map(|entry| entry.status())
            .fold(WorktreeStatus::default(), |mut acc, status| {
                acc.has_conflicts |= status.is_conflicted();
                acc.staged += usize::from(status.intersects(STAGED));
                acc.unstaged += usize::from(status.intersects(UNSTAGED));
                acc.untracked += usize::from(status.is_wt_new());
                acc
            }))
    }

    /// Whether at least one tracked file has uncommitted modifications.
    pub fn has_tracked_changes(&self) -> Result<bool, GitError> {
        Ok(self.worktree_status(false)?.has_tracked_changes())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Check out a branch name or any revision.
    ///
    /// Local branch names attach HEAD to the branch; anything else detaches
    /// HEAD at the resolved commit. libgit2 records the usual
    /// `checkout: moving from <old> to <new>` reflog entry.
    ///
    /// Uses a safe checkout: local modifications that would be overwritten
    /// make the checkout fail with [`GitError::Conflict`].
    pub fn checkout(&self, target: &str) -> Result<(), GitError> {
        let (object, reference) = self
            .repo
            .revparse_ext(target)
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound => GitError::RefNotFound {
                    refname: target.to_string(),
                },
                _ => GitError::from_git2(e, target),
            })?;

        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, target))?;

        let mut opts = git2::build::CheckoutBuilder::new();
        opts.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, target))?;

        let branch_ref = reference
            .as_ref()
            .filter(|r| r.is_branch())
            .and_then(|r| r.name());

        let moved = match branch_ref {
            Some(name) => self.repo.set_head(name),
            None => self.repo.set_head_detached(commit.id()),
        };
        moved.map_err(|e| GitError::from_git2(e, target))
    }

    /// Reset HEAD to `target` with the given mode.
    pub fn reset(&self, target: &Oid, mode: ResetMode) -> Result<(), GitError> {
        let git_oid = git2::Oid::from_str(target.as_str())
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;
        let object = self
            .repo
            .find_object(git_oid, None)
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        let kind = match mode {
            ResetMode::Soft => git2::ResetType::Soft,
            ResetMode::Mixed => git2::ResetType::Mixed,
            ResetMode::Hard => git2::ResetType::Hard,
        };

        self.repo
            .reset(&object, kind, None)
            .map_err(|e| GitError::from_git2(e, target.as_str()))
    }

    /// Save local changes to a new stash entry with the given label.
    pub fn stash_save(&mut self, label: &str) -> Result<Oid, GitError> {
        let signature = self.repo.signature().map_err(|e| GitError::Internal {
            message: format!("no committer identity: {}", e.message()),
        })?;

        let oid = self
            .repo
            .stash_save(&signature, label, Some(git2::StashFlags::DEFAULT))
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound => GitError::NothingToStash,
                _ => GitError::from_git2(e, "stash"),
            })?;

        Oid::new(oid.to_string()).map_err(|e| e.into())
    }

    /// Apply the stash entry at `index` and drop it on success.
    ///
    /// On conflict the entry stays in the stash list.
    pub fn stash_pop(&mut self, index: usize) -> Result<(), GitError> {
        let mut opts = git2::StashApplyOptions::new();
        self.repo
            .stash_pop(index, Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, &format!("stash@{{{}}}", index)))
    }

    /// Messages of all stash entries, newest first.
    pub fn stash_messages(&mut self) -> Result<Vec<String>, GitError> {
        let mut messages = Vec::new();
        self.repo.stash_foreach(|_, message, _| {
            messages.push(message.to_string());
            true
        })?;
        Ok(messages)
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// Render a commit like `git show`: header, message, and patch against
    /// the first parent.
    pub fn show(&self, oid: &Oid, context_lines: u32) -> Result<Vec<String>, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let commit = self
            .repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let mut lines = Vec::new();
        let author = commit.author();
        let when = DateTime::<Utc>::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(DateTime::UNIX_EPOCH);
        lines.push(format!("commit {}", commit.id()));
        lines.push(format!(
            "Author: {} <{}>",
            author.name().unwrap_or(""),
            author.email().unwrap_or("")
        ));
        lines.push(format!("Date:   {}", when.to_rfc2822()));
        lines.push(String::new());
        for line in commit.message().unwrap_or("").lines() {
            lines.push(format!("    {}", line));
        }
        lines.push(String::new());

        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let mut opts = git2::DiffOptions::new();
        opts.context_lines(context_lines);
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            let content = String::from_utf8_lossy(line.content());
            let content = content.trim_end_matches('\n');
            match line.origin() {
                '+' | '-' | ' ' => lines.push(format!("{}{}", line.origin(), content)),
                _ => lines.push(content.to_string()),
            }
            true
        })?;

        Ok(lines)
    }
}
