//! Log output for the adjustment run: `LEVEL message` on stderr.

use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init(timestamps: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    // A subscriber may already be installed (library use, tests).
    let _ = if timestamps {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };
}
