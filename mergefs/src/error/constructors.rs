//! Constructors and classification helpers for `MergeError`.

use std::io;
use std::sync::Arc;

use super::MergeError;

impl MergeError {
    /// Wrap a backend failure for the source at `address`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mergefs::MergeError;
    /// use std::io;
    ///
    /// let err = MergeError::source("a.json", io::Error::from(io::ErrorKind::NotFound));
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn source(address: impl Into<String>, source: io::Error) -> Self {
        Self::Source {
            address: address.into(),
            source,
        }
    }

    /// Construct an [`MergeError::InvalidAddress`] for `input`.
    #[must_use]
    pub fn invalid_address(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Construct a codec failure for `content_type`.
    #[must_use]
    pub fn decode(
        content_type: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            content_type: content_type.into(),
            source: source.into(),
        }
    }

    /// Construct an [`MergeError::UnsupportedType`] wrapped in an [`Arc`].
    #[must_use]
    pub fn unsupported_arc(content_type: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::UnsupportedType {
            content_type: content_type.into(),
        })
    }

    /// Returns `true` when the error means a source does not exist.
    ///
    /// Callers use this to tell a missing resource apart from a bad request or
    /// a misconfigured filesystem.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Source { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// The [`io::ErrorKind`] that best describes this error.
    ///
    /// Backend failures keep their original kind. Decode and merge failures
    /// map to [`io::ErrorKind::InvalidData`]; malformed requests map to
    /// [`io::ErrorKind::InvalidInput`].
    #[must_use]
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::Source { source, .. } => source.kind(),
            Self::TooFewSources { .. } | Self::InvalidAddress { .. } => {
                io::ErrorKind::InvalidInput
            }
            Self::NoFilesystem { .. } => io::ErrorKind::Unsupported,
            Self::Closed { .. } => io::ErrorKind::Other,
            Self::UnsupportedType { .. }
            | Self::Decode { .. }
            | Self::NotAMap { .. }
            | Self::EmptyMerge => io::ErrorKind::InvalidData,
        }
    }
}
