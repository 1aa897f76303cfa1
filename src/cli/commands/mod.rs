//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds what it needs from the [`Context`] (normalizer, replay manager)
//! 2. Resolves instructions, awaiting the assisted stage with `block_on`
//! 3. Executes through the engine and formats the output
//!
//! Machine-readable output goes to stdout; progress and diagnostics go to
//! stderr and are suppressed by `--quiet`.

mod config_cmd;
mod parse;
mod replay_cmd;
mod run;
mod shell;

pub use config_cmd::show as config_show;
pub use parse::parse;
pub use replay_cmd::{list as replay_list, run as replay_run, show as replay_show};
pub use run::run;
pub use shell::shell;

use anyhow::{Context as _, Result};

use super::args::{Command, ConfigAction, ReplayAction};
use super::Context;
use crate::parse::assist::Assistant;
use crate::parse::openai::{OpenAiAssistant, OpenAiConfig};
use crate::parse::Normalizer;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Parse { text, ai } => parse::parse(ctx, &text, ai),
        Command::Run {
            text,
            ai,
            no_replay,
        } => run::run(ctx, &text, ai, no_replay),
        Command::Shell { ai } => shell::shell(ctx, ai),
        Command::Replay { action } => match action {
            ReplayAction::Show { file } => replay_cmd::show(ctx, &file),
            ReplayAction::List { dir } => replay_cmd::list(ctx, dir.as_deref()),
            ReplayAction::Run { file } => replay_cmd::run(ctx, &file),
        },
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
        },
    }
}

/// The normalizer for this invocation.
///
/// The OpenAI client is only built when `--ai` was given and a key exists;
/// the normalizer still re-checks the gates on every call.
pub(crate) fn normalizer(ctx: &Context, use_ai: bool) -> Normalizer {
    let assistant: Option<Box<dyn Assistant>> = if use_ai {
        OpenAiConfig::from_config(&ctx.config)
            .map(|c| Box::new(OpenAiAssistant::new(c)) as Box<dyn Assistant>)
    } else {
        None
    };
    Normalizer::new(Box::new(ctx.config.clone()), assistant)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

/// Pretty JSON to stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
