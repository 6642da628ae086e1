//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use inquire::{Confirm, InquireError};
use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<InquireError> for PromptError {
    fn from(err: InquireError) -> Self {
        match err {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                PromptError::Cancelled
            }
            InquireError::NotTTY => PromptError::NotInteractive,
            other => PromptError::IoError(other.to_string()),
        }
    }
}

/// Prompt for confirmation (yes/no).
///
/// Returns `Ok(true)` if the user confirms, `Ok(false)` if they decline.
/// Escape counts as declining. Returns `Err(PromptError::NotInteractive)`
/// if not in interactive mode.
pub fn confirm(title: &str, message: &str, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let answer = Confirm::new(message)
        .with_default(false)
        .with_help_message(title)
        .prompt();
    match answer {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
