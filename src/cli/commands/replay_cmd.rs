//! replay command - Inspect and re-execute session logs

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::engine::exec::Executor;
use crate::handlers::builtin::reference_registry;
use crate::handlers::memory::MemoryDocument;
use crate::parse::plan::describe;
use crate::replay::{list_sessions, load_log, replayer, LoadedLog};

fn load(ctx: &Context, file: &Path) -> Result<LoadedLog> {
    let log = load_log(file).with_context(|| format!("Failed to open {}", file.display()))?;
    if !ctx.quiet {
        for skipped in &log.skipped {
            eprintln!("skipped line {}: {}", skipped.line_no, skipped.reason);
        }
    }
    Ok(log)
}

/// Print every loaded entry, one per line.
pub fn show(ctx: &Context, file: &Path) -> Result<()> {
    let log = load(ctx, file)?;
    for entry in &log.entries {
        let status = if entry.result.success { "ok" } else { "fail" };
        println!(
            "{}\t{}/{}\t{}\t{}\t{}",
            entry.sequence,
            entry.operation_index + 1,
            entry.operation_count,
            entry.source,
            status,
            describe(&entry.operation)
        );
    }
    if !ctx.quiet {
        eprintln!(
            "{} entries, {} skipped lines",
            log.entries.len(),
            log.skipped.len()
        );
    }
    Ok(())
}

/// List session logs, newest first.
pub fn list(ctx: &Context, dir: Option<&Path>) -> Result<()> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => ctx.config.replay_dir(),
    };
    let sessions = list_sessions(&dir)
        .with_context(|| format!("Failed to list sessions in {}", dir.display()))?;

    if sessions.is_empty() && !ctx.quiet {
        eprintln!("No session logs in {}", dir.display());
    }
    for session in sessions {
        println!(
            "{}\t{}\t{}",
            session.session_id,
            session.size_bytes,
            session.path.display()
        );
    }
    Ok(())
}

/// Re-execute a log against a fresh document.
///
/// Fails when any replayed result disagrees with the recorded one.
pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    let log = load(ctx, file)?;
    let registry = reference_registry();
    let executor = Executor::new(&registry);
    let mut document = MemoryDocument::new();

    let report = replayer::replay(&executor, &mut document, &log.entries);
    for entry in &report.entries {
        println!(
            "{}\trecorded={}\treplayed={}\t{}",
            entry.sequence,
            entry.recorded.success,
            entry.replayed.success,
            if entry.matches() { "match" } else { "MISMATCH" }
        );
    }

    if !report.is_faithful() {
        bail!(
            "{} of {} replayed entries differ from the log",
            report.mismatches(),
            report.entries.len()
        );
    }
    Ok(())
}
