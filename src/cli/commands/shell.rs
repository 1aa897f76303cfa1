//! shell command - Line-by-line instructions against one document
//!
//! Every non-empty line that does not start with `:` is normalized and
//! executed against the same in-memory document, so later instructions can
//! build on earlier ones. Lines starting with `:` drive the replay session.

use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};

use super::{normalizer, runtime};
use crate::cli::Context;
use crate::engine::exec::{BatchReport, Executor};
use crate::handlers::builtin::reference_registry;
use crate::handlers::memory::MemoryDocument;
use crate::parse::Normalizer;
use crate::replay::{SessionManager, SessionStatus};

/// Session-control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meta {
    Begin,
    Pause,
    Resume,
    End,
    Status,
    Quit,
}

/// `None` for a plain instruction, `Some(Err)` for an unknown `:` command.
fn parse_meta(line: &str) -> Option<Result<Meta, String>> {
    let name = line.strip_prefix(':')?.trim();
    Some(match name {
        "begin" => Ok(Meta::Begin),
        "pause" => Ok(Meta::Pause),
        "resume" => Ok(Meta::Resume),
        "end" => Ok(Meta::End),
        "status" => Ok(Meta::Status),
        "quit" | "q" | "exit" => Ok(Meta::Quit),
        other => Err(format!("unknown command ':{}'", other)),
    })
}

/// Run the interactive shell on stdin/stdout.
pub fn shell(ctx: &Context, use_ai: bool) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let replay = SessionManager::from_config(&ctx.config);
    let normalizer = normalizer(ctx, use_ai);
    run_loop(
        &normalizer,
        &replay,
        use_ai,
        !ctx.quiet,
        stdin.lock(),
        stdout.lock(),
    )
}

fn run_loop<R: BufRead, W: Write>(
    normalizer: &Normalizer,
    replay: &SessionManager,
    use_ai: bool,
    prompt: bool,
    input: R,
    mut out: W,
) -> Result<()> {
    let rt = runtime()?;
    let registry = reference_registry();
    let executor = Executor::new(&registry).with_replay(replay);
    let mut document = MemoryDocument::new();

    if prompt {
        eprint!("tcad> ");
    }
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();

        if !line.is_empty() {
            match parse_meta(line) {
                Some(Ok(Meta::Quit)) => break,
                Some(Ok(meta)) => handle_meta(meta, replay, &mut out)?,
                Some(Err(message)) => writeln!(out, "error: {}", message)?,
                None => {
                    let batch = rt.block_on(normalizer.resolve_batch(line, use_ai));
                    let report = executor.execute_batch(&mut document, &batch);
                    write_report(&report, &mut out)?;
                }
            }
        }

        if prompt {
            eprint!("tcad> ");
        }
    }

    if let Some(summary) = replay.end_session().context("Failed to close replay session")? {
        writeln!(
            out,
            "session {} ended: {} entries in {}",
            summary.session_id,
            summary.entries,
            summary.log_path.display()
        )?;
    }
    Ok(())
}

fn handle_meta<W: Write>(meta: Meta, replay: &SessionManager, out: &mut W) -> Result<()> {
    match meta {
        Meta::Begin => match replay.begin_session() {
            Ok(id) => writeln!(out, "session {} started", id)?,
            Err(e) => writeln!(out, "error: {}", e)?,
        },
        Meta::Pause => match replay.pause() {
            Ok(()) => writeln!(out, "session paused")?,
            Err(e) => writeln!(out, "error: {}", e)?,
        },
        Meta::Resume => match replay.resume() {
            Ok(()) => writeln!(out, "session resumed")?,
            Err(e) => writeln!(out, "error: {}", e)?,
        },
        Meta::End => match replay.end_session() {
            Ok(Some(summary)) => writeln!(
                out,
                "session {} ended: {} entries in {}",
                summary.session_id,
                summary.entries,
                summary.log_path.display()
            )?,
            Ok(None) => writeln!(out, "error: no replay session is active")?,
            Err(e) => writeln!(out, "error: {}", e)?,
        },
        Meta::Status => match replay.status() {
            SessionStatus::Disabled => writeln!(out, "replay disabled")?,
            SessionStatus::Idle => writeln!(out, "no active session")?,
            SessionStatus::Active {
                session_id,
                entries,
                ..
            } => writeln!(out, "session {} active: {} entries", session_id, entries)?,
            SessionStatus::Paused {
                session_id,
                entries,
                ..
            } => writeln!(out, "session {} paused: {} entries", session_id, entries)?,
        },
        Meta::Quit => {}
    }
    Ok(())
}

fn write_report<W: Write>(report: &BatchReport, out: &mut W) -> Result<()> {
    for entry in &report.entries {
        let result = &entry.result;
        match (&result.feature_id, &result.error) {
            (Some(id), _) if result.success => {
                writeln!(out, "[ok] {} {}", id, entry.description)?
            }
            (_, Some(error)) => writeln!(out, "[fail] {} ({})", entry.description, error)?,
            _ => writeln!(out, "[fail] {}", entry.description)?,
        }
        for warning in &result.warnings {
            writeln!(out, "  warning: {}", warning)?;
        }
    }
    Ok(())
}
