//! Tracing subscriber setup for `mergecat`.
//!
//! Events go to stderr so they never mix with the merged document on stdout.

use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "MERGECAT_LOG";

/// Filter applied when [`LOG_ENV`] is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from [`LOG_ENV`], falling back to [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Returns [`CliError::Logging`] when the variable holds invalid directives.
pub fn env_filter() -> Result<EnvFilter, CliError> {
    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives).map_err(|err| CliError::Logging(err.to_string()))
        }
        _ => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns [`CliError::Logging`] when the filter is invalid or a subscriber
/// is already installed.
pub fn init() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
