//! Logging setup for the `wallet` binary.

use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Install a stderr subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when `verbose` is set. Calling this twice is a no-op.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let stderr_log = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let _ = tracing_subscriber::registry()
        .with(stderr_log.with_filter(filter))
        .try_init();
}
