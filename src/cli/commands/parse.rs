//! parse command - Normalize an instruction without executing it

use anyhow::Result;

use super::{normalizer, print_json, runtime};
use crate::cli::Context;

/// Print the canonical batch result for `text`.
pub fn parse(ctx: &Context, text: &str, use_ai: bool) -> Result<()> {
    let normalizer = normalizer(ctx, use_ai);
    let batch = runtime()?.block_on(normalizer.resolve_batch(text, use_ai));
    print_json(&batch.to_result())
}
