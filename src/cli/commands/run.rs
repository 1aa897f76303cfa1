//! run command - Normalize and execute one instruction

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::{normalizer, print_json, runtime};
use crate::cli::Context;
use crate::core::types::{Source, SCHEMA_VERSION};
use crate::engine::exec::{Executor, ReportEntry};
use crate::handlers::builtin::reference_registry;
use crate::handlers::memory::MemoryDocument;
use crate::replay::{SessionManager, SessionSummary};

#[derive(Serialize)]
struct RunOutput<'a> {
    schema_version: &'static str,
    source: Source,
    success: bool,
    results: &'a [ReportEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<SessionSummary>,
}

/// Execute `text` against a fresh in-memory document.
///
/// Fails after printing the report if any operation failed.
pub fn run(ctx: &Context, text: &str, use_ai: bool, no_replay: bool) -> Result<()> {
    let normalizer = normalizer(ctx, use_ai);
    let batch = runtime()?.block_on(normalizer.resolve_batch(text, use_ai));

    let replay = if no_replay {
        SessionManager::disabled()
    } else {
        SessionManager::from_config(&ctx.config)
    };
    let registry = reference_registry();
    let executor = Executor::new(&registry).with_replay(&replay);
    let mut document = MemoryDocument::new();

    let report = executor.execute_batch(&mut document, &batch);
    let session = replay
        .end_session()
        .context("Failed to close replay session")?;

    if let (Some(summary), false) = (&session, ctx.quiet) {
        eprintln!(
            "Recorded {} entries in {}",
            summary.entries,
            summary.log_path.display()
        );
    }

    print_json(&RunOutput {
        schema_version: SCHEMA_VERSION,
        source: batch.source(),
        success: report.all_succeeded(),
        results: &report.entries,
        session,
    })?;

    if !report.all_succeeded() {
        bail!(
            "{} of {} operations failed",
            report.len() - report.succeeded(),
            report.len()
        );
    }
    Ok(())
}
