//! Instrumented backends for asserting how sources are opened and released.
//!
//! # Examples
//!
//! ```
//! use mergefs::{Address, Backend, MemoryBackend};
//! use mergefs_test_helpers::backends::OpenOnceBackend;
//!
//! let backend = OpenOnceBackend::new(MemoryBackend::new().with_file("a.json", "{}"));
//! let address = Address::parse("a.json")?;
//! assert!(backend.open(&address).is_ok());
//! assert!(backend.open(&address).is_err());
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeSet;
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mergefs::{Address, Backend, SourceReader};
use parking_lot::Mutex;

/// Backend that refuses to open the same path twice.
///
/// Opening a path a second time fails with [`io::ErrorKind::AlreadyExists`],
/// so a merge that opens each source exactly once succeeds and one that
/// re-opens a source fails loudly.
#[derive(Debug)]
pub struct OpenOnceBackend<B> {
    inner: B,
    opened: Mutex<BTreeSet<String>>,
}

impl<B> OpenOnceBackend<B> {
    /// Wrap `inner`.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            opened: Mutex::new(BTreeSet::new()),
        }
    }

    /// Paths opened so far, in sorted order.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().iter().cloned().collect()
    }
}

impl<B: Backend> Backend for OpenOnceBackend<B> {
    fn open(&self, address: &Address) -> io::Result<SourceReader> {
        let path = address.path().to_owned();
        if !self.opened.lock().insert(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} was already opened", address.path()),
            ));
        }
        self.inner.open(address)
    }
}

/// Shared counters updated by a [`TrackingBackend`].
#[derive(Debug, Default)]
pub struct SourceStats {
    opens: AtomicUsize,
    reads: AtomicUsize,
    releases: AtomicUsize,
}

impl SourceStats {
    /// Number of successful opens.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of read calls made on opened readers.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of opened readers that have been dropped.
    #[must_use]
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Readers opened but not yet dropped.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.opens().saturating_sub(self.releases())
    }
}

/// Backend that counts opens, reads and reader drops.
#[derive(Debug)]
pub struct TrackingBackend<B> {
    inner: B,
    stats: Arc<SourceStats>,
}

impl<B> TrackingBackend<B> {
    /// Wrap `inner` with fresh counters.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            stats: Arc::default(),
        }
    }

    /// Handle onto the counters; stays valid after the backend is moved into
    /// a [`mergefs::SchemeMux`].
    #[must_use]
    pub fn stats(&self) -> Arc<SourceStats> {
        Arc::clone(&self.stats)
    }
}

impl<B: Backend> Backend for TrackingBackend<B> {
    fn open(&self, address: &Address) -> io::Result<SourceReader> {
        let inner = self.inner.open(address)?;
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedReader {
            inner,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct TrackedReader {
    inner: SourceReader,
    stats: Arc<SourceStats>,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}
