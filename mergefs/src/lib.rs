//! A virtual filesystem whose files are deep merges of other documents.
//!
//! Opening `"override.json|base.yaml"` on a [`MergeFs`] opens both sources
//! through the [`SchemeMux`], and the returned [`MergeFile`] yields a single
//! YAML document in which keys from earlier sources win. Each part of the
//! request may be a registered [`Alias`], an absolute address such as
//! `file:///etc/app.toml`, or a path relative to the default backend.
//!
//! The pieces are usable on their own: [`decode::decode`] turns JSON, YAML or
//! TOML bytes into a [`Document`], [`merge::merge`] folds documents by
//! priority, and [`encode::encode`] writes canonical block YAML.

pub mod address;
pub mod alias;
pub mod backend;
pub mod decode;
pub mod document;
pub mod encode;
mod error;
pub mod file;
pub mod fs;
pub mod merge;

pub use address::Address;
pub use alias::{Alias, AliasRegistry};
pub use backend::{Backend, DirBackend, MemoryBackend, SchemeMux, SourceReader};
pub use document::{Document, Mapping, Scalar};
pub use error::{MergeError, MergeResult, MergeResultExt};
pub use file::{MergeFile, SubFile};
pub use fs::MergeFs;

/// Re-exports used by the [`doc!`] macro.
#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
