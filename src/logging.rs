//! Tracing subscriber setup.
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber. `RUST_LOG` wins over the default level.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false),
        )
        .init();
}
