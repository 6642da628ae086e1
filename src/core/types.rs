//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`HistoryEntry`] - One reflog record (a single repository mutation)
//! - [`ResetMode`] - Soft, mixed, or hard reset
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use rewind::core::types::{HistoryEntry, Oid};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let entry = HistoryEntry::new(oid.clone(), "commit: add parser");
//! assert_eq!(entry.id, oid);
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid reset mode: {0}")]
    InvalidResetMode(String),
}

/// A Git object identifier (SHA-1 or SHA-256 hex string).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use rewind::core::types::Oid;
///
/// // Create from hex string (normalized to lowercase)
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Stand-in id for counter `n`, zero-padded to 40 hex digits.
    ///
    /// A `u64` never needs more than 16 digits, so the result is always a
    /// valid SHA-1 shaped id.
    pub(crate) fn from_counter(n: u64) -> Self {
        Self(format!("{:040x}", n))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded mutation of the repository, as read from the HEAD reflog.
///
/// `id` is the commit HEAD pointed at *after* the mutation. The message is
/// free-form text written by whichever tool moved HEAD, e.g.
/// `checkout: moving from main to feature` or `commit: add parser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Commit HEAD pointed at after this mutation
    pub id: Oid,
    /// Reflog message
    pub message: String,
    /// When the mutation was recorded
    pub when: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn new(id: Oid, message: impl Into<String>) -> Self {
        Self::at(id, message, Utc::now())
    }

    /// Create an entry with an explicit timestamp.
    pub fn at(id: Oid, message: impl Into<String>, when: DateTime<Utc>) -> Self {
        Self {
            id,
            message: message.into(),
            when,
        }
    }
}

/// How far a reset reaches into the index and working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    /// Move HEAD only
    Soft,
    /// Move HEAD and reset the index
    Mixed,
    /// Move HEAD, reset the index and the working tree
    Hard,
}

impl ResetMode {
    /// All modes in menu order.
    pub const ALL: [ResetMode; 3] = [ResetMode::Soft, ResetMode::Mixed, ResetMode::Hard];

    /// The keyword used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetMode::Soft => "soft",
            ResetMode::Mixed => "mixed",
            ResetMode::Hard => "hard",
        }
    }
}

impl FromStr for ResetMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(ResetMode::Soft),
            "mixed" => Ok(ResetMode::Mixed),
            "hard" => Ok(ResetMode::Hard),
            other => Err(TypeError::InvalidResetMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
