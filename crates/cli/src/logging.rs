//! Logging setup.
//!
//! Logs go to stderr, which is also where blocking diagnostics go, so the
//! default level is `warn`. Set `EDIT_GUARD_LOG=debug` to trace discovery
//! and matching.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "EDIT_GUARD_LOG";

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init();
}
