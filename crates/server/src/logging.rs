//! Logging setup
//!
//! Process logs go through `tracing`. `RUST_LOG` takes precedence; otherwise
//! the level is `info`, or `debug` when requested on the command line.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Fails if one is already installed.
pub fn init(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;

    Ok(())
}
