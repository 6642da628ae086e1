//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository and loads configuration
//! 2. Drives the engine
//! 3. Formats and displays output
//!
//! Handlers do NOT perform repository mutations directly.
//!
//! # Async Preview
//!
//! The session previews commits on tokio tasks. Its handler owns the
//! runtime and blocks on it only when output must be complete.

mod log_cmd;
mod session;
mod undo;

pub use log_cmd::log;
pub use session::{session, InputError, SessionInput};
pub use undo::undo;

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::engine::Context;
use crate::git::{Git, RepoInfo};
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Option<Command>, ctx: &Context) -> Result<()> {
    match command.unwrap_or(Command::Session) {
        Command::Log { limit, json } => log_cmd::log(ctx, limit, json),
        Command::Undo { dry_run } => undo::undo(ctx, dry_run),
        Command::Session => session::session(ctx),
    }
}

/// An open repository with its configuration.
pub(crate) struct Workspace {
    pub git: Git,
    pub info: RepoInfo,
    pub config: Config,
}

impl Workspace {
    /// Open the repository containing `ctx.cwd` (or the current directory).
    pub fn open(ctx: &Context) -> Result<Self> {
        let cwd = match &ctx.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let git = Git::open(&cwd).context("Failed to open repository")?;
        let info = git.info()?;
        let config = Config::load(Some(&info.git_dir)).context("Failed to load configuration")?;
        Ok(Self { git, info, config })
    }

    /// Prompts are shown only when both the flags and the config allow it.
    pub fn interactive(&self, ctx: &Context) -> bool {
        ctx.interactive && self.config.interactive()
    }
}
