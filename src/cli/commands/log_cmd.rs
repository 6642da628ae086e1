//! log command - Print the HEAD reflog
//!
//! Newest entry first, one row per entry. `--json` emits an array of
//! `{index, id, message, when}` objects instead.

use super::Workspace;
use crate::engine::git_backend::HISTORY_REF;
use crate::engine::selection::NO_HISTORY_MESSAGE;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};
use anyhow::{Context as _, Result};

/// Print the reflog.
///
/// `limit` overrides the configured `history.limit`.
pub fn log(ctx: &Context, limit: Option<usize>, json: bool) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let limit = limit.or(ws.config.history_limit());
    let entries = ws
        .git
        .reflog(HISTORY_REF, limit)
        .context("Failed to read reflog")?;

    if json {
        println!("{}", output::reflog_json(&entries)?);
        return Ok(());
    }

    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    if entries.is_empty() {
        output::print(NO_HISTORY_MESSAGE, verbosity);
        return Ok(());
    }
    println!("{}", output::format_reflog(&entries, None, None));
    Ok(())
}
