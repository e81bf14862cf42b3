//! In-memory backend.
//!
//! Used for embedding fixed documents and for tests. Paths are normalised by
//! dropping leading `/` and `./` segments.

use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::Arc;

use super::{Backend, SourceReader};
use crate::Address;

/// Backend serving byte buffers from a path-keyed map.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    files: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` at `path`, replacing any previous contents.
    pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        self.files
            .insert(normalise(path).to_owned(), Arc::from(data.into()));
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    /// Returns `true` when `path` is stored.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(normalise(path))
    }
}

fn normalise(path: &str) -> &str {
    let mut trimmed = path.trim_start_matches('/');
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest.trim_start_matches('/');
    }
    trimmed
}

impl Backend for MemoryBackend {
    fn open(&self, address: &Address) -> io::Result<SourceReader> {
        let data = self.files.get(normalise(address.path())).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such file", address.path()),
            )
        })?;
        Ok(Box::new(Cursor::new(Arc::clone(data))))
    }
}
