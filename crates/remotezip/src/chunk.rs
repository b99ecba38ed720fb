//! Chunk cache in front of a slow source
//!
//! Zip parsing issues many small reads clustered around the central
//! directory and each member's local header. Serving them from whole
//! chunks turns hundreds of round trips into a handful.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::lru::ChunkLru;
use crate::source::RangeSource;

/// Default chunk size (256 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Default number of retained chunks (16 MiB at the default chunk size)
pub const DEFAULT_CHUNK_COUNT: usize = 64;

/// Chunked, LRU-bounded cache over a [`RangeSource`]
pub struct ChunkCache<S> {
    inner: S,
    chunk_size: u64,
    chunks: Mutex<ChunkLru>,
}

impl<S: RangeSource> ChunkCache<S> {
    /// Wrap `inner`, retaining at most `chunk_count` chunks of `chunk_size` bytes
    pub fn new(inner: S, chunk_size: usize, chunk_count: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1) as u64,
            chunks: Mutex::new(ChunkLru::new(chunk_count)),
        }
    }

    /// Number of chunks currently held
    pub fn cached_chunks(&self) -> usize {
        self.chunks.lock().len()
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn chunk(&self, number: u64) -> Result<Arc<[u8]>> {
        if let Some(data) = self.chunks.lock().get(number) {
            return Ok(data);
        }

        // Fetch without holding the lock; a racing reader may fetch the
        // same chunk, and the later insert simply replaces the earlier one.
        let start = number * self.chunk_size;
        let want = self.chunk_size.min(self.inner.len() - start) as usize;
        let mut data = vec![0u8; want];

        let mut filled = 0;
        while filled < want {
            let n = self.inner.read_at(&mut data[filled..], start + filled as u64)?;
            if n == 0 {
                return Err(Error::ShortRead {
                    offset: start,
                    expected: want,
                    got: filled,
                });
            }
            filled += n;
        }
        trace!(chunk = number, bytes = want, "fetched chunk");

        let data: Arc<[u8]> = Arc::from(data);
        if let Some(evicted) = self.chunks.lock().insert(number, Arc::clone(&data)) {
            debug!(chunk = evicted, "dropped cached chunk");
        }
        Ok(data)
    }
}

impl<S: RangeSource> RangeSource for ChunkCache<S> {
    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let len = self.inner.len();
        let mut copied = 0;
        let mut pos = offset;

        while copied < buf.len() && pos < len {
            let number = pos / self.chunk_size;
            let within = (pos - number * self.chunk_size) as usize;
            let data = self.chunk(number)?;

            let n = (buf.len() - copied).min(data.len() - within);
            buf[copied..copied + n].copy_from_slice(&data[within..within + n]);
            copied += n;
            pos += n as u64;
        }

        Ok(copied)
    }
}
