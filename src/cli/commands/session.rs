//! session command - Line-driven reflog dashboard
//!
//! Reads one command per line from stdin:
//!
//! ```text
//! list                 show the reflog with selection (>) and undo cursor (*)
//! j / k                select the next older / newer entry
//! select N             select entry N
//! show                 print the preview of the selected entry
//! undo | z             undo the most recent recognised action
//! checkout             check out the selected entry (asks first)
//! reset MODE           reset to the selected entry (soft, mixed or hard)
//! y | <enter>          accept the pending prompt
//! n | esc              dismiss the pending prompt
//! refresh              re-read the reflog
//! help                 this text
//! quit | q             leave
//! ```

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use super::Workspace;
use crate::core::types::{ResetMode, TypeError};
use crate::engine::rules::RuleSet;
use crate::engine::session::{Resolution, Session, UndoOutcome};
use crate::engine::traits::PreviewSlot;
use crate::engine::{Context, GitBackend};
use crate::ui::output::{self, Verbosity};
use crate::ui::preview::{git_loader, PreviewContent, TaskPreviewer};
use anyhow::{Context as _, Result};
use thiserror::Error;

const HELP: &str = "\
commands:
  list               show the reflog
  j / k              select next older / newer entry
  select N           select entry N
  show               show the selected entry
  undo | z           undo the most recent action
  checkout           check out the selected entry
  reset MODE         reset to the selected entry (soft|mixed|hard)
  y / n              answer the pending prompt
  refresh            re-read the reflog
  quit               leave";

/// One parsed line of session input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    List,
    Next,
    Prev,
    Select(usize),
    Show,
    Undo,
    Checkout,
    Reset(ResetMode),
    Accept,
    Dismiss,
    Refresh,
    Help,
    Quit,
}

/// Errors from parsing session input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("not an entry index: {0}")]
    BadIndex(String),

    #[error(transparent)]
    BadMode(#[from] TypeError),
}

impl FromStr for SessionInput {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(SessionInput::Accept);
        };
        let arg = words.next();

        match head.to_ascii_lowercase().as_str() {
            "list" | "ls" => Ok(SessionInput::List),
            "j" | "down" => Ok(SessionInput::Next),
            "k" | "up" => Ok(SessionInput::Prev),
            "select" | "s" => {
                let raw = arg.ok_or(InputError::MissingArgument("select"))?;
                raw.parse()
                    .map(SessionInput::Select)
                    .map_err(|_| InputError::BadIndex(raw.to_string()))
            }
            "show" => Ok(SessionInput::Show),
            "undo" | "z" => Ok(SessionInput::Undo),
            "checkout" | "space" => Ok(SessionInput::Checkout),
            "reset" | "g" => {
                let raw = arg.ok_or(InputError::MissingArgument("reset"))?;
                Ok(SessionInput::Reset(raw.parse()?))
            }
            "y" | "yes" | "enter" => Ok(SessionInput::Accept),
            "n" | "no" | "esc" => Ok(SessionInput::Dismiss),
            "refresh" | "r" => Ok(SessionInput::Refresh),
            "help" | "?" => Ok(SessionInput::Help),
            "quit" | "q" | "exit" => Ok(SessionInput::Quit),
            other => Err(InputError::Unknown(other.to_string())),
        }
    }
}

type Dashboard = Session<GitBackend, TaskPreviewer>;

/// Run the dashboard until `quit` or end of input.
pub fn session(ctx: &Context) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start preview runtime")?;

    let loader = git_loader(ws.info.work_dir.clone(), ws.config.context_lines());
    let previewer = TaskPreviewer::new(runtime.handle().clone(), loader);
    let rules = RuleSet::standard().context("Failed to compile undo rules")?;
    let mut session = Session::new(
        GitBackend::new(ws.git),
        previewer,
        rules,
        ws.config.stash_prefix(),
    );

    session.refresh();
    print_list(&session);
    report_errors(&mut session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        prompt_line(&session)?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;

        let input = match line.parse::<SessionInput>() {
            Ok(input) => input,
            Err(e) => {
                output::warn(e, verbosity);
                continue;
            }
        };
        if input == SessionInput::Quit {
            break;
        }
        step(&mut session, input, &runtime, verbosity);
        report_errors(&mut session);
    }

    Ok(())
}

fn step(
    session: &mut Dashboard,
    input: SessionInput,
    runtime: &tokio::runtime::Runtime,
    verbosity: Verbosity,
) {
    match input {
        SessionInput::List => print_list(session),
        SessionInput::Next => session.select_next(),
        SessionInput::Prev => session.select_prev(),
        SessionInput::Select(index) => session.select(index),
        SessionInput::Show => {
            runtime.block_on(session.previewer_mut().flush());
            print_preview(session);
        }
        SessionInput::Undo => match session.undo() {
            UndoOutcome::NothingToUndo => output::print("Nothing to undo", verbosity),
            UndoOutcome::Applied(plan) => output::success(
                format!("Undid '{}': {}", plan.entry.message, plan.step),
                verbosity,
            ),
            UndoOutcome::AwaitingConfirmation(_) | UndoOutcome::Failed => {}
        },
        SessionInput::Checkout => {
            if !session.checkout_selected() {
                output::print("Nothing selected", verbosity);
            }
        }
        SessionInput::Reset(mode) => {
            if session.reset_selected(mode) {
                output::success(format!("Reset ({})", mode), verbosity);
            }
        }
        SessionInput::Accept => match session.confirm() {
            Resolution::Done => output::success("Done", verbosity),
            Resolution::NothingPending
            | Resolution::Declined
            | Resolution::Failed => {}
        },
        SessionInput::Dismiss => {
            if session.decline() == Resolution::Declined {
                output::print("Cancelled", verbosity);
            }
        }
        SessionInput::Refresh => {
            session.refresh();
            print_list(session);
        }
        SessionInput::Help => println!("{}", HELP),
        SessionInput::Quit => {}
    }
}

fn print_list(session: &Dashboard) {
    let ledger = session.ledger();
    if ledger.is_empty() {
        println!("{}", crate::engine::selection::NO_HISTORY_MESSAGE);
        return;
    }
    let cursor = Some(ledger.cursor()).filter(|&c| c > 0);
    println!(
        "{}",
        output::format_reflog(ledger.entries(), session.selection().index(), cursor)
    );
}

fn print_preview(session: &Dashboard) {
    match session.previewer().content(PreviewSlot::Main) {
        Some(PreviewContent::Lines(lines)) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Some(PreviewContent::Message(message)) => println!("{}", message),
        Some(PreviewContent::Failed(message)) => output::error(message),
        Some(PreviewContent::Loading(oid)) => println!("loading {}...", oid.short(7)),
        None => {}
    }
}

fn prompt_line(session: &Dashboard) -> Result<()> {
    let mut stdout = io::stdout();
    match session.pending() {
        Some(pending) => write!(stdout, "{}: {} [y/n] ", pending.title(), pending.prompt())?,
        None => write!(stdout, "rw> ")?,
    }
    stdout.flush()?;
    Ok(())
}

fn report_errors(session: &mut Dashboard) {
    for message in session.take_errors() {
        output::error(message);
    }
}
