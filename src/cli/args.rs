//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// rewind - browse the reflog and undo the last thing you did
#[derive(Parser, Debug)]
#[command(name = "rw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if rw was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Defaults to `session`
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the HEAD reflog, newest first
    #[command(name = "log")]
    Log {
        /// Show at most this many entries
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Undo the most recent recognised reflog action
    #[command(
        name = "undo",
        long_about = "Undo the most recent recognised reflog action.\n\n\
            Checkouts are undone by checking out the ref you moved away from. \
            Commits and the start of an interactive rebase are undone by a hard \
            reset to the state before them; local changes are stashed and \
            re-applied after you confirm.",
        after_help = "\
EXAMPLES:
    # See what would be undone
    rw undo --dry-run

    # Undo it
    rw undo"
    )]
    Undo {
        /// Show the planned step without running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Interactive reflog dashboard (default)
    #[command(name = "session")]
    Session,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["rw"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn log_flags() {
        let cli = Cli::try_parse_from(["rw", "log", "-n", "5", "--json"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Log {
                limit: Some(5),
                json: true
            })
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rw", "undo", "--dry-run", "--debug", "--cwd", "/tmp"])
            .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.command, Some(Command::Undo { dry_run: true }));
    }

    #[test]
    fn quiet_disables_prompts() {
        let cli = Cli::try_parse_from(["rw", "-q", "session"]).unwrap();
        assert!(!cli.interactive());
    }

    #[test]
    fn interactive_flags_conflict() {
        assert!(Cli::try_parse_from(["rw", "--interactive", "--no-interactive"]).is_err());
    }

    #[test]
    fn explicit_interactive_wins() {
        let cli = Cli::try_parse_from(["rw", "--interactive", "-q"]).unwrap();
        assert!(cli.interactive());
    }
}
