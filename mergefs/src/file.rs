//! Lazily materialised merge file.
//!
//! A [`MergeFile`] holds the opened sources of one merge request. Nothing is
//! read until the first read call; that call reads every source exactly once,
//! decodes, merges and encodes the result, and caches the bytes. Later reads
//! stream from the cache. A failure is cached the same way and reported on
//! every subsequent read.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use crate::backend::SourceReader;
use crate::decode::{decode, mime};
use crate::error::shared_io_error;
use crate::{MergeError, MergeResult, encode::encode, merge::merge};

/// An opened source awaiting materialisation.
pub struct SubFile {
    address: String,
    reader: SourceReader,
    content_type: Option<String>,
}

impl SubFile {
    /// Wrap `reader`, remembering its address for error reports and the
    /// content type it should be decoded as.
    #[must_use]
    pub fn new(address: impl Into<String>, reader: SourceReader, content_type: Option<String>) -> Self {
        Self {
            address: address.into(),
            reader,
            content_type,
        }
    }

    /// Address the source was opened from.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Content type the source will be decoded as, if one was resolved.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

impl fmt::Debug for SubFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubFile")
            .field("address", &self.address)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

enum State {
    Pending(Vec<SubFile>),
    Ready { buffer: Vec<u8>, cursor: usize },
    Failed(Arc<MergeError>),
    Closed,
}

/// Read-once handle onto a merged document.
pub struct MergeFile {
    name: String,
    state: State,
}

impl MergeFile {
    /// Create a file over `sources`, highest priority first.
    ///
    /// The sources are not touched until the file is first read.
    #[must_use]
    pub fn new(name: impl Into<String>, sources: Vec<SubFile>) -> Self {
        Self {
            name: name.into(),
            state: State::Pending(sources),
        }
    }

    /// The request path this file was opened with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content type of the merged output.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        mime::YAML
    }

    /// Returns `true` once the merge has run, successfully or not.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        matches!(self.state, State::Ready { .. } | State::Failed(_))
    }

    /// Materialise the merge if needed and return the full output.
    ///
    /// The read cursor is not moved.
    ///
    /// # Errors
    ///
    /// Returns the materialisation failure, or [`MergeError::Closed`] after
    /// [`Self::close`].
    pub fn contents(&mut self) -> MergeResult<&[u8]> {
        self.materialize();
        match &self.state {
            State::Ready { buffer, .. } => Ok(buffer.as_slice()),
            State::Failed(err) => Err(Arc::clone(err)),
            State::Pending(_) | State::Closed => Err(self.closed()),
        }
    }

    /// Size in bytes of the merged output.
    ///
    /// # Errors
    ///
    /// Same as [`Self::contents`].
    pub fn size(&mut self) -> MergeResult<u64> {
        self.contents()
            .map(|bytes| u64::try_from(bytes.len()).unwrap_or(u64::MAX))
    }

    /// Release every source and the cached output.
    ///
    /// Closing more than once is harmless.
    pub fn close(&mut self) {
        if let State::Pending(sources) = &self.state {
            tracing::debug!(name = %self.name, sources = sources.len(), "closing unread merge file");
        }
        self.state = State::Closed;
    }

    fn closed(&self) -> Arc<MergeError> {
        Arc::new(MergeError::Closed {
            name: self.name.clone(),
        })
    }

    fn materialize(&mut self) {
        if !matches!(self.state, State::Pending(_)) {
            return;
        }
        let State::Pending(sources) = std::mem::replace(&mut self.state, State::Closed) else {
            return;
        };
        let count = sources.len();
        self.state = match build(sources) {
            Ok(buffer) => {
                tracing::debug!(name = %self.name, sources = count, bytes = buffer.len(), "materialized merge file");
                State::Ready { buffer, cursor: 0 }
            }
            Err(err) => {
                tracing::warn!(name = %self.name, error = %err, "merge failed");
                State::Failed(err)
            }
        };
    }
}

/// Read, decode, merge and encode `sources`.
///
/// Sources are consumed in priority order so the first failure reported is
/// the highest-priority one. Each reader is dropped as soon as it has been
/// read; on an early return the remaining readers drop with the iterator.
fn build(sources: Vec<SubFile>) -> MergeResult<Vec<u8>> {
    let mut documents = Vec::with_capacity(sources.len());
    for SubFile {
        address,
        mut reader,
        content_type,
    } in sources
    {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| MergeError::source(address.as_str(), e))?;
        drop(reader);
        let content_type = content_type.unwrap_or_default();
        let document = decode(&data, &content_type)?;
        tracing::trace!(%address, %content_type, kind = document.kind(), "decoded source");
        documents.push(document);
    }
    let merged = merge(documents)?;
    Ok(encode(&merged))
}

impl Read for MergeFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.materialize();
        match &mut self.state {
            State::Ready { buffer, cursor } => {
                let mut remaining = buffer.get(*cursor..).unwrap_or_default();
                let n = remaining.read(buf)?;
                *cursor += n;
                Ok(n)
            }
            State::Failed(err) => Err(shared_io_error(err)),
            State::Pending(_) | State::Closed => Err(io::Error::from(MergeError::Closed {
                name: self.name.clone(),
            })),
        }
    }
}

impl fmt::Debug for MergeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Pending(_) => "pending",
            State::Ready { .. } => "ready",
            State::Failed(_) => "failed",
            State::Closed => "closed",
        };
        f.debug_struct("MergeFile")
            .field("name", &self.name)
            .field("state", &state)
            .finish()
    }
}
