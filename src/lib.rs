//! rewind - reflog browser and undo for Git repositories
//!
//! rewind reads the HEAD reflog, shows it as a navigable list with a commit
//! preview, and undoes the most recent recognised action: a checkout is
//! undone by checking out the previous ref, a commit by a guarded hard reset
//! to the state before it.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Ledger, undo rules, planner, guarded reset and session
//! - [`core`] - Domain types and configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Output, prompts and background preview
//!
//! # Correctness Invariants
//!
//! 1. The undo cursor never exceeds the number of history entries
//! 2. History growth caused by undo moves the cursor back; growth caused by
//!    the user resets it
//! 3. Undo mode is cleared on every exit path
//! 4. A hard reset never discards local changes without confirmation

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
