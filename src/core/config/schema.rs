//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$REWIND_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/rewind/config.toml`
//! 3. `~/.rewind/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/rewind/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad file fails
//! loudly at startup instead of halfway through an undo.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// interactive = true
///
/// [history]
/// limit = 500
///
/// [undo]
/// stash_prefix = "Auto-stashing changes for "
///
/// [preview]
/// context_lines = 3
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default interactive mode
    pub interactive: Option<bool>,

    /// History loading defaults
    pub history: Option<HistoryDefaults>,

    /// Undo defaults
    pub undo: Option<UndoDefaults>,

    /// Preview pane defaults
    pub preview: Option<PreviewDefaults>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(history) = &self.history {
            validate_limit(history.limit)?;
        }
        if let Some(undo) = &self.undo {
            validate_stash_prefix(undo.stash_prefix.as_deref())?;
        }
        if let Some(preview) = &self.preview {
            if preview.context_lines.is_some_and(|n| n > 100) {
                return Err(ConfigError::InvalidValue(
                    "preview.context_lines must be at most 100".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// history_limit = 200
/// stash_prefix = "rewind autostash "
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Maximum number of reflog entries to load
    pub history_limit: Option<usize>,

    /// Label prefix for stashes created by undo
    pub stash_prefix: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_limit(self.history_limit)?;
        validate_stash_prefix(self.stash_prefix.as_deref())
    }
}

/// History loading defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryDefaults {
    /// Maximum number of reflog entries to load (unlimited when unset)
    pub limit: Option<usize>,
}

/// Undo defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UndoDefaults {
    /// Label prefix for stashes created by undo
    pub stash_prefix: Option<String>,
}

/// Preview pane defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewDefaults {
    /// Context lines around each diff hunk
    pub context_lines: Option<u32>,
}

fn validate_limit(limit: Option<usize>) -> Result<(), ConfigError> {
    if limit == Some(0) {
        return Err(ConfigError::InvalidValue(
            "history limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_stash_prefix(prefix: Option<&str>) -> Result<(), ConfigError> {
    if prefix.is_some_and(|p| p.trim().is_empty()) {
        return Err(ConfigError::InvalidValue(
            "stash_prefix cannot be empty".to_string(),
        ));
    }
    Ok(())
}
