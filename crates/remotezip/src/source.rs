//! Positioned byte sources
//!
//! A [`RangeSource`] is the `ReadAt` half of a file: it knows its length
//! and can copy any byte range into a caller buffer without shared cursor
//! state, so one source can serve several readers.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_LENGTH, RANGE};
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Random-access byte source
pub trait RangeSource: Send + Sync {
    /// Total length in bytes
    fn len(&self) -> u64;

    /// Copy bytes starting at `offset` into `buf`
    ///
    /// Returns the number of bytes copied. Fewer than `buf.len()` bytes
    /// are only returned at the end of the source; `offset >= len()`
    /// returns 0.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Check if the source is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: RangeSource + ?Sized> RangeSource for Box<S> {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        (**self).read_at(buf, offset)
    }
}

impl<S: RangeSource + ?Sized> RangeSource for Arc<S> {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        (**self).read_at(buf, offset)
    }
}

impl RangeSource for Bytes {
    fn len(&self) -> u64 {
        Bytes::len(self) as u64
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= RangeSource::len(self) {
            return Ok(0);
        }
        let tail = &self[offset as usize..];
        let n = buf.len().min(tail.len());
        buf[..n].copy_from_slice(&tail[..n]);
        Ok(n)
    }
}

/// Remote resource read through HTTP range requests
pub struct HttpSource {
    client: Client,
    url: String,
    len: u64,
}

impl HttpSource {
    /// Probe `url` with a HEAD request and prepare for ranged reads
    ///
    /// # Returns
    /// * `Result<HttpSource>` - Source sized from the Content-Length header
    pub fn open(url: &str) -> Result<Self> {
        Self::with_client(Client::new(), url)
    }

    /// Like [`HttpSource::open`], with a preconfigured client
    pub fn with_client(client: Client, url: &str) -> Result<Self> {
        debug!(url, "probing remote archive");

        let resp = client.head(url).send()?;
        if !resp.status().is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        // HEAD bodies are empty, so read the header rather than the body hint
        let len = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| Error::UnknownLength(url.to_string()))?;

        if len == 0 {
            return Err(Error::EmptyResource(url.to_string()));
        }
        info!(url, len, "head complete");

        Ok(Self {
            client,
            url: url.to_string(),
            len,
        })
    }

    /// URL this source reads from
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RangeSource for HttpSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if buf.is_empty() || offset >= self.len {
            return Ok(0);
        }
        let want = (buf.len() as u64).min(self.len - offset);

        let resp = self
            .client
            .get(&self.url)
            .header(RANGE, range_header(offset, want))
            .send()?;

        match resp.status() {
            StatusCode::PARTIAL_CONTENT => {}
            status if status.is_success() => {
                return Err(Error::RangeUnsupported(self.url.clone()));
            }
            status => {
                return Err(Error::Status {
                    url: self.url.clone(),
                    status: status.as_u16(),
                });
            }
        }

        let body = resp.bytes()?;
        let n = body.len().min(want as usize);
        buf[..n].copy_from_slice(&body[..n]);
        Ok(n)
    }
}

/// Inclusive byte range header value for `len` bytes at `offset`
fn range_header(offset: u64, len: u64) -> String {
    format!("bytes={}-{}", offset, offset + len - 1)
}

/// Local file source
pub struct FileSource {
    file: Mutex<File>,
    len: u64,
}

impl FileSource {
    /// Open a local file for positioned reads
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();

        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl RangeSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= self.len {
            return Ok(0);
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            let n = file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}
