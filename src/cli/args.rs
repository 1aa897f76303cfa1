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
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tcad - Turn natural-language CAD instructions into replayable operations
#[derive(Parser, Debug)]
#[command(name = "tcad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if tcad was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize an instruction and print the canonical batch (dry run)
    #[command(
        name = "parse",
        long_about = "Normalize an instruction and print the canonical batch.\n\n\
            The instruction is split into segments and each segment is resolved \
            into one canonical operation. Nothing is executed and nothing is logged.",
        after_help = "\
EXAMPLES:
    # Deterministic parsing only
    tcad parse \"create base plate 120x80x6 mm and add 4 holes diameter 6mm\"

    # Try the assisted stage first (needs USE_LLM and OPENAI_API_KEY)
    tcad parse --ai \"make a 20mm diameter cylinder 50mm tall\""
    )]
    Parse {
        /// The instruction text
        text: String,

        /// Try the assisted stage before the rule-based one
        #[arg(long)]
        ai: bool,
    },

    /// Normalize and execute an instruction against a fresh document
    #[command(
        name = "run",
        long_about = "Normalize an instruction and execute every operation in order.\n\n\
            Operations run against a fresh in-memory document. Each attempt is \
            recorded in a new replay session unless --no-replay is given. The \
            command fails if any operation failed, after printing the full report."
    )]
    Run {
        /// The instruction text
        text: String,

        /// Try the assisted stage before the rule-based one
        #[arg(long)]
        ai: bool,

        /// Do not record this run in the replay log
        #[arg(long)]
        no_replay: bool,
    },

    /// Read instructions from stdin and execute them against one document
    #[command(
        name = "shell",
        after_help = "\
META COMMANDS:
    :begin    Start a new replay session
    :pause    Stop recording without ending the session
    :resume   Resume recording
    :end      End the session and print its summary
    :status   Show the session state
    :quit     Leave the shell"
    )]
    Shell {
        /// Try the assisted stage before the rule-based one
        #[arg(long)]
        ai: bool,
    },

    /// Inspect or re-execute replay logs
    Replay {
        #[command(subcommand)]
        action: ReplayAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Replay subcommands.
#[derive(Subcommand, Debug)]
pub enum ReplayAction {
    /// List loaded entries and skipped lines of a log
    Show {
        /// Path to a session log
        file: PathBuf,
    },
    /// List session logs, newest first
    List {
        /// Directory to list instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Re-execute a log against a fresh document
    Run {
        /// Path to a session log
        file: PathBuf,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the redacted configuration summary
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tcad", "parse", "make a box", "--debug", "-q"]).unwrap();
        assert!(cli.debug);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Parse { ai: false, .. }));
    }

    #[test]
    fn run_flags() {
        let cli = Cli::try_parse_from(["tcad", "run", "--ai", "--no-replay", "x"]).unwrap();
        match cli.command {
            Command::Run {
                text,
                ai,
                no_replay,
            } => {
                assert_eq!(text, "x");
                assert!(ai);
                assert!(no_replay);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
