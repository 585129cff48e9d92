#![forbid(unsafe_code)]

//! Structured logging hooks.
//!
//! With the `tracing` feature the usual macros are re-exported here so call
//! sites can write `plock_core::debug!`. The `tracing-json` feature adds
//! [`init_json_logging`] for hosts that want newline-delimited JSON output.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, info_span, trace, warn};

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "PLOCK_LOG";

/// Failure to install the JSON subscriber.
#[cfg(feature = "tracing-json")]
#[derive(Debug, thiserror::Error)]
pub enum LoggingInitError {
    #[error("invalid {LOG_ENV} filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("global subscriber already installed: {0}")]
    Install(String),
}

/// Install a global JSON subscriber.
///
/// The filter comes from [`LOG_ENV`] when set, otherwise `default_filter`.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber is
/// already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging(default_filter: &str) -> Result<(), LoggingInitError> {
    let filter = env_filter(std::env::var(LOG_ENV).ok(), default_filter)?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| LoggingInitError::Install(err.to_string()))
}

/// Parse `directives`, falling back to `default_filter` when unset.
#[cfg(feature = "tracing-json")]
fn env_filter(
    directives: Option<String>,
    default_filter: &str,
) -> Result<tracing_subscriber::EnvFilter, LoggingInitError> {
    let directives = directives.unwrap_or_else(|| default_filter.to_owned());
    Ok(tracing_subscriber::EnvFilter::try_new(directives)?)
}
