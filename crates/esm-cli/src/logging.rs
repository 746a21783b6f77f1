//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CliError, Result};

/// Install a stderr subscriber.
///
/// `RUST_LOG` selects the level, defaulting to `warn`. `--verbose` forces
/// `debug`.
pub fn init(verbose: bool) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact();

    let filter_layer = if verbose {
        EnvFilter::try_new("debug")
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))
    }
    .map_err(|e| CliError::user(format!("Invalid log filter: {e}")))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;

    tracing::debug!("Verbose mode enabled");
    Ok(())
}
