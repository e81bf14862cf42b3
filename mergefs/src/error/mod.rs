//! Error types produced by the merge filesystem.

mod constructors;
mod conversions;
mod types;

pub use conversions::MergeResultExt;
pub(crate) use conversions::shared_io_error;
pub use types::MergeError;

/// Result alias used throughout the crate.
///
/// Errors are shared so a failed merge file can report the same failure on
/// every subsequent read.
pub type MergeResult<T> = Result<T, std::sync::Arc<MergeError>>;
