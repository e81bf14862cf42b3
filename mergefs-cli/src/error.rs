//! Error types for `mergecat`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mergefs::MergeError;
use thiserror::Error;

/// Errors surfaced by the `mergecat` pipeline.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be gathered or deserialised.
    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {0}")]
    MissingConfig(Utf8PathBuf),

    /// A backend directory could not be opened.
    #[error("cannot open {scheme} root {path}: {source}")]
    Root {
        /// Scheme the directory would have served; empty for relative paths.
        scheme: &'static str,
        /// Directory that failed to open.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The merge itself failed.
    #[error(transparent)]
    Merge(#[from] Arc<MergeError>),

    /// The merged document could not be written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Destination that failed.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Logging could not be initialised.
    #[error("invalid log filter: {0}")]
    Logging(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
