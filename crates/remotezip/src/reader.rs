//! `Read + Seek` adapter over a [`RangeSource`]

use std::io::{self, Read, Seek, SeekFrom};

use crate::source::RangeSource;

/// Cursor over a range source
pub struct RangeReader<S> {
    source: S,
    pos: u64,
}

impl<S: RangeSource> RangeReader<S> {
    /// Create a reader positioned at the start of `source`
    pub fn new(source: S) -> Self {
        Self { source, pos: 0 }
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// The underlying source
    pub fn get_ref(&self) -> &S {
        &self.source
    }
}

impl<S: RangeSource> Read for RangeReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.source.read_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<S: RangeSource> Seek for RangeReader<S> {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let target = match from {
            SeekFrom::Start(off) => Some(off),
            SeekFrom::End(delta) => self.source.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };

        match target {
            Some(pos) => {
                self.pos = pos;
                Ok(pos)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
