//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use serde::Serialize;

use crate::core::types::HistoryEntry;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Markers for one reflog row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowMarks {
    /// The row is highlighted.
    pub selected: bool,
    /// The row is where the next undo scan starts.
    pub cursor: bool,
}

/// Format one reflog row: `> 3  1a2b3c4  2 minutes ago  checkout: moving ...`.
///
/// The first column is `>` for the selected row and `*` for the undo cursor.
pub fn format_entry(index: usize, entry: &HistoryEntry, marks: RowMarks) -> String {
    let marker = match (marks.selected, marks.cursor) {
        (true, _) => '>',
        (false, true) => '*',
        (false, false) => ' ',
    };
    format!(
        "{} {:>3}  {}  {:<14}  {}",
        marker,
        index,
        entry.id.short(7),
        format_age(entry),
        entry.message
    )
}

/// Format the whole reflog, newest first.
pub fn format_reflog(
    entries: &[HistoryEntry],
    selected: Option<usize>,
    cursor: Option<usize>,
) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marks = RowMarks {
                selected: selected == Some(i),
                cursor: cursor == Some(i),
            };
            format_entry(i, entry, marks)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_age(entry: &HistoryEntry) -> String {
    let secs = (chrono::Utc::now() - entry.when).num_seconds().max(0);
    match secs {
        0..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

#[derive(Serialize)]
struct JsonRow<'a> {
    index: usize,
    #[serde(flatten)]
    entry: &'a HistoryEntry,
}

/// Render entries as a pretty JSON array.
pub fn reflog_json(entries: &[HistoryEntry]) -> serde_json::Result<String> {
    let rows: Vec<_> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| JsonRow { index, entry })
        .collect();
    serde_json::to_string_pretty(&rows)
}
