//! config command - Show the effective configuration

use anyhow::Result;

use super::print_json;
use crate::cli::Context;

/// Print the redacted configuration summary.
pub fn show(ctx: &Context) -> Result<()> {
    print_json(&ctx.config.info())
}
