//! Primary error enum for merge filesystem operations.

use thiserror::Error;

/// Errors that can occur while opening or reading a merged document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MergeError {
    /// The request named fewer than two sources.
    #[error("need at least 2 datasources to merge, got {count}")]
    TooFewSources {
        /// Number of parts found in the request path.
        count: usize,
    },

    /// A request part could not be interpreted as an address.
    #[error("invalid datasource address '{input}': {reason}")]
    InvalidAddress {
        /// The offending part, verbatim.
        input: String,
        /// Why the part was rejected.
        reason: String,
    },

    /// No backend is registered for the address scheme.
    #[error("no filesystem registered for scheme {scheme:?}")]
    NoFilesystem {
        /// Scheme that failed to resolve.
        scheme: String,
    },

    /// A backend failed to open or read a source.
    #[error("datasource '{address}': {source}")]
    Source {
        /// Address of the source, as written.
        address: String,
        /// Error reported by the backend.
        #[source]
        source: std::io::Error,
    },

    /// No decoder is available for the content type.
    #[error("data of type {content_type:?} not yet supported")]
    UnsupportedType {
        /// Content type that was requested.
        content_type: String,
    },

    /// A decoder rejected the source bytes.
    #[error("failed to decode {content_type} data: {source}")]
    Decode {
        /// Content type the data was decoded as.
        content_type: String,
        /// Underlying codec error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A source decoded to something other than a mapping.
    #[error("can only merge maps, found {kind}")]
    NotAMap {
        /// Kind of the rejected document.
        kind: &'static str,
    },

    /// The merge was asked to fold an empty list.
    #[error("no documents to merge")]
    EmptyMerge,

    /// The merge file was read after being closed.
    #[error("merge file '{name}' is closed")]
    Closed {
        /// Request path the file was opened with.
        name: String,
    },
}
