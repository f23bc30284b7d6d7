//! Jade command-line driver.
//!
//! Thin commands over `jade_parse` and `jade_signature` for inspecting the
//! incremental parse tree from a terminal. Every command writes to a
//! caller-supplied writer so the same code serves the `jade` binary and
//! the tests.

pub mod commands;
mod error;
mod options;

use std::sync::Once;

pub use error::CliError;
pub use options::Options;

static TRACING_INIT: Once = Once::new();

/// Environment variable holding the log filter, e.g. `JADE_LOG=jade_parse=debug`.
pub const LOG_ENV: &str = "JADE_LOG";

/// Install the global subscriber.
///
/// Call this once at startup. Safe to call multiple times. Logs go to
/// stderr as an indented span tree; the filter defaults to `warn`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        let layer = tracing_tree::HierarchicalLayer::new(2)
            .with_targets(true)
            .with_writer(std::io::stderr);
        // Another subscriber may already be installed by an embedding tool.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}
