//! Backend filesystems and the scheme multiplexer that routes to them.
//!
//! A [`Backend`] opens the resource named by an [`Address`] and hands back a
//! byte stream. [`SchemeMux`] owns one backend per scheme plus an optional
//! default backend for relative addresses.

mod dir;
mod memory;

pub use dir::DirBackend;
pub use memory::MemoryBackend;

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use crate::Address;

/// Byte stream returned by a backend. Dropping it releases the resource.
pub type SourceReader = Box<dyn Read + Send>;

/// A filesystem serving one address scheme.
///
/// Implementations must report missing resources with
/// [`io::ErrorKind::NotFound`] so callers can tell them apart from other
/// failures.
pub trait Backend: Send + Sync {
    /// Open the resource at `address` for reading.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the resource cannot be opened.
    fn open(&self, address: &Address) -> io::Result<SourceReader>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn open(&self, address: &Address) -> io::Result<SourceReader> {
        (**self).open(address)
    }
}

/// Routes addresses to backends by scheme.
///
/// Schemes are matched case-insensitively. Relative addresses use the default
/// backend when one is configured.
#[derive(Clone, Default)]
pub struct SchemeMux {
    backends: BTreeMap<String, Arc<dyn Backend>>,
    default: Option<Arc<dyn Backend>>,
}

impl fmt::Debug for SchemeMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeMux")
            .field("schemes", &self.backends.keys().collect::<Vec<_>>())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

impl SchemeMux {
    /// Create a multiplexer with no backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `backend` for `scheme`, replacing any previous registration.
    pub fn register(&mut self, scheme: &str, backend: impl Backend + 'static) {
        self.register_arc(scheme, Arc::new(backend));
    }

    /// Register a backend already wrapped in an [`Arc`].
    pub fn register_arc(&mut self, scheme: &str, backend: Arc<dyn Backend>) {
        let scheme = scheme.to_ascii_lowercase();
        if scheme.is_empty() {
            self.default = Some(backend);
        } else {
            self.backends.insert(scheme, backend);
        }
    }

    /// Use `backend` for relative addresses.
    #[must_use]
    pub fn with_default(mut self, backend: impl Backend + 'static) -> Self {
        self.default = Some(Arc::new(backend));
        self
    }

    /// Find the backend for `scheme`; the empty scheme yields the default.
    #[must_use]
    pub fn resolve(&self, scheme: &str) -> Option<&Arc<dyn Backend>> {
        if scheme.is_empty() {
            return self.default.as_ref();
        }
        self.backends.get(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes in sorted order, excluding the default.
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }
}
