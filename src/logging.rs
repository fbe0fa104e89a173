//! Log output for the command-line tools.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Installs a stdout logger filtered by `RUST_LOG`, defaulting to `info`.
///
/// Calling it more than once is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stdout)
        .with_ansi(io::stdout().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}
