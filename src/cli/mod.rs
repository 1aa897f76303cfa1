//! cli
//!
//! Command-line interface layer for textcad.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and initialize logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Async work (the assisted parsing stage) is driven
//! with `Runtime::block_on` on the main thread; the resolved batch is then
//! handed to the synchronous [`crate::engine::Executor`].

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::logging;

/// Per-invocation context shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory; the project config is looked up under it
    pub cwd: PathBuf,
    pub debug: bool,
    pub quiet: bool,
    pub config: Config,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let cwd = match cli.cwd.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config = Config::load(Some(&cwd))
        .context("Failed to load configuration")?
        .config;

    logging::init(cli.debug, cli.quiet, config.log_level());

    let ctx = Context {
        cwd,
        debug: cli.debug,
        quiet: cli.quiet,
        config,
    };

    commands::dispatch(cli.command, &ctx)
}
