//! Logging setup for the CLI.
//!
//! Installs one global tracing subscriber writing to stderr, so stdout stays
//! clean for `--json` payloads and dry-run command lines. The filter comes
//! from `SEGPREP_LOG`, then `RUST_LOG`, then the verbosity flag.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

pub const LOG_ENV: &str = "SEGPREP_LOG";

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Install the subscriber. Subsequent calls are no-ops.
pub fn init(verbose: bool) -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let subscriber = Registry::default()
        .with(build_env_filter(verbose))
        .with(layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = INSTALLED.set(());
    Ok(())
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}
