//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! rewind has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$REWIND_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/rewind/config.toml`
//! 3. `~/.rewind/config.toml`
//!
//! # Repo Config Location
//!
//! `<git_dir>/rewind/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use rewind::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! println!("stash prefix: {}", config.stash_prefix());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default stash label prefix; the target commit id is appended.
pub const DEFAULT_STASH_PREFIX: &str = "Auto-stashing changes for ";

/// Default number of diff context lines in previews.
pub const DEFAULT_CONTEXT_LINES: u32 = 3;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules: repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads repo-specific config from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (repo, repo_path) = match git_dir {
            Some(dir) => Self::load_repo(dir)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        tracing::debug!(?global_path, ?repo_path, "configuration loaded");

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $REWIND_CONFIG
        if let Ok(path) = std::env::var("REWIND_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/rewind/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("rewind/config.toml");
            if path.exists() {
                let config = read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.rewind/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".rewind/config.toml");
            if path.exists() {
                let config = read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    /// Load repository configuration from the git directory.
    fn load_repo(git_dir: &Path) -> Result<(Option<RepoConfig>, Option<PathBuf>), ConfigError> {
        let path = Self::repo_config_path(git_dir);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = read_toml(&path)?;
        Ok((Some(config), Some(path)))
    }

    /// Get the canonical path for repo config.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("rewind/config.toml")
    }

    /// Path of the global file that was loaded, if any.
    pub fn global_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path of the repo file that was loaded, if any.
    pub fn repo_path(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Maximum number of reflog entries to load.
    ///
    /// `None` means the whole reflog.
    pub fn history_limit(&self) -> Option<usize> {
        self.repo
            .as_ref()
            .and_then(|r| r.history_limit)
            .or_else(|| self.global.history.as_ref().and_then(|h| h.limit))
    }

    /// Label prefix for stashes created by the undo flow.
    pub fn stash_prefix(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.stash_prefix.as_deref())
            .or_else(|| {
                self.global
                    .undo
                    .as_ref()
                    .and_then(|u| u.stash_prefix.as_deref())
            })
            .unwrap_or(DEFAULT_STASH_PREFIX)
    }

    /// Diff context lines in previews.
    pub fn context_lines(&self) -> u32 {
        self.global
            .preview
            .as_ref()
            .and_then(|p| p.context_lines)
            .unwrap_or(DEFAULT_CONTEXT_LINES)
    }
}

/// Read and parse a TOML config file.
fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
