//! Local directory backend built on `cap-std`.
//!
//! Paths are resolved beneath a root directory. Absolute address paths have
//! their leading `/` removed, so a backend rooted at `/` serves `file:///`
//! addresses. `cap-std` refuses paths that escape the root.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

use super::{Backend, SourceReader};
use crate::Address;

/// Backend reading files beneath a directory.
#[derive(Debug)]
pub struct DirBackend {
    root: Utf8PathBuf,
    dir: Dir,
}

impl DirBackend {
    /// Open `root` as the backend's base directory.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the directory cannot be opened.
    pub fn open_ambient(root: impl AsRef<Utf8Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// The directory this backend reads from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl Backend for DirBackend {
    fn open(&self, address: &Address) -> io::Result<SourceReader> {
        let relative = address.path().trim_start_matches('/');
        if relative.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{address}: no file named"),
            ));
        }
        tracing::trace!(root = %self.root, path = relative, "opening local source");
        let file = self.dir.open(relative)?;
        Ok(Box::new(file))
    }
}
