//! Conversions between `MergeError` and external error types.

use std::io;
use std::sync::Arc;

use super::{MergeError, MergeResult};

impl From<serde_json::Error> for MergeError {
    fn from(e: serde_json::Error) -> Self {
        Self::decode("application/json", e)
    }
}

impl From<MergeError> for io::Error {
    fn from(e: MergeError) -> Self {
        Self::new(e.io_kind(), e)
    }
}

/// Wrap a shared error as an [`io::Error`], preserving its kind.
///
/// The shared error stays reachable through [`io::Error::get_ref`], so
/// callers can downcast back to [`MergeError`].
pub(crate) fn shared_io_error(e: &Arc<MergeError>) -> io::Error {
    io::Error::new(e.io_kind(), Arc::clone(e))
}

/// Extension for lifting any `Result<T, E>` with `E: Into<MergeError>` into a
/// [`MergeResult`].
pub trait MergeResultExt<T> {
    /// Convert the error into an `Arc<MergeError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion.
    fn into_merge(self) -> MergeResult<T>;
}

impl<T, E> MergeResultExt<T> for Result<T, E>
where
    E: Into<MergeError>,
{
    fn into_merge(self) -> MergeResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}
