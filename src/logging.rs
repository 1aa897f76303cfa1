//! logging
//!
//! One-time `tracing` subscriber setup for the binary.
//!
//! # Level precedence
//!
//! 1. `RUST_LOG`, when set and parseable
//! 2. `--debug` forces `debug`
//! 3. `--quiet` lowers to `error`
//! 4. The configured level (`log.level`, then `LOG_LEVEL`)
//! 5. `info`
//!
//! Output always goes to stderr so stdout stays machine-readable.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

const DEFAULT_LEVEL: &str = "info";

/// The filter directive to use when `RUST_LOG` is absent.
pub fn level_directive(debug: bool, quiet: bool, configured: Option<&str>) -> String {
    if debug {
        return "debug".to_string();
    }
    if quiet {
        return "error".to_string();
    }
    configured
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(debug: bool, quiet: bool, configured: Option<&str>) {
    let fallback = level_directive(debug, quiet, configured);
    INIT_ONCE.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback));
        // Another subscriber may already be installed (tests); keep it.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_everything() {
        assert_eq!(level_directive(true, true, Some("warn")), "debug");
    }

    #[test]
    fn quiet_beats_config() {
        assert_eq!(level_directive(false, true, Some("trace")), "error");
    }

    #[test]
    fn configured_level_is_normalized() {
        assert_eq!(level_directive(false, false, Some(" WARN ")), "warn");
        assert_eq!(level_directive(false, false, Some("")), "info");
        assert_eq!(level_directive(false, false, None), "info");
    }

    #[test]
    fn init_is_idempotent() {
        init(false, true, None);
        init(true, false, None);
    }
}
