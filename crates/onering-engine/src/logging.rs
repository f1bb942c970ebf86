//! Logging setup for hosts embedding the engine

use onering_core::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used. Fails if a global
/// subscriber is already installed.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| Error::Configuration(format!("invalid log level {:?}: {}", level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Configuration(format!("logging already initialised: {}", e)))
}
