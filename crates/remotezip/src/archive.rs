//! Zip archive facade
//!
//! Opening an archive reads only the end-of-central-directory record and
//! the central directory; member data is fetched lazily, one member per
//! [`RemoteArchive::read`] call.

use std::io::Read;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::chunk::{ChunkCache, DEFAULT_CHUNK_COUNT, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::reader::RangeReader;
use crate::source::{FileSource, HttpSource, RangeSource};

/// Maximum uncompressed member size (256 MB)
const MAX_MEMBER_SIZE: u64 = 256 * 1024 * 1024;

type Reader = RangeReader<ChunkCache<Box<dyn RangeSource>>>;

/// Tuning for the chunk cache in front of the archive source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Bytes per cached chunk
    pub chunk_size: usize,
    /// Maximum number of cached chunks
    pub chunk_count: usize,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_count: DEFAULT_CHUNK_COUNT,
        }
    }
}

/// One file member of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Path of the member inside the archive
    pub name: String,
    /// Position in the zip central directory
    pub zip_index: usize,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// Zip archive backed by a random-access source
pub struct RemoteArchive {
    location: String,
    members: Vec<Member>,
    zip: Mutex<ZipArchive<Reader>>,
}

impl RemoteArchive {
    /// Open an archive from an http(s) URL or a local path
    ///
    /// # Arguments
    /// * `location` - URL or filesystem path
    /// * `options` - Chunk cache tuning
    ///
    /// # Returns
    /// * `Result<RemoteArchive>` - Archive with its member list loaded
    pub fn open(location: &str, options: ArchiveOptions) -> Result<Self> {
        let source: Box<dyn RangeSource> = if is_url(location) {
            Box::new(HttpSource::open(location)?)
        } else {
            Box::new(FileSource::open(location)?)
        };
        Self::from_source(location, source, options)
    }

    /// Open an archive over an arbitrary source
    pub fn from_source(
        location: &str,
        source: Box<dyn RangeSource>,
        options: ArchiveOptions,
    ) -> Result<Self> {
        let size = source.len();
        let cache = ChunkCache::new(source, options.chunk_size, options.chunk_count);
        let mut zip = ZipArchive::new(RangeReader::new(cache))?;

        let mut members = Vec::with_capacity(zip.len());
        for zip_index in 0..zip.len() {
            let file = zip.by_index_raw(zip_index)?;
            if file.is_dir() {
                continue;
            }
            members.push(Member {
                name: file.name().to_string(),
                zip_index,
                size: file.size(),
            });
        }

        if members.is_empty() {
            return Err(Error::NoMembers);
        }
        info!(location, size, members = members.len(), "opened archive");

        Ok(Self {
            location: location.to_string(),
            members,
            zip: Mutex::new(zip),
        })
    }

    /// Where the archive was opened from
    pub fn location(&self) -> &str {
        &self.location
    }

    /// File members in central directory order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Number of file members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the archive has no file members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Read and decompress one member
    ///
    /// Blocks on the underlying source; call it from a blocking worker.
    ///
    /// # Arguments
    /// * `zip_index` - Central directory index from [`Member::zip_index`]
    ///
    /// # Returns
    /// * `Result<Bytes>` - Uncompressed member data
    pub fn read(&self, zip_index: usize) -> Result<Bytes> {
        self.read_capped(zip_index, MAX_MEMBER_SIZE)
    }

    fn read_capped(&self, zip_index: usize, max_size: u64) -> Result<Bytes> {
        let mut zip = self.zip.lock();
        if zip_index >= zip.len() {
            return Err(Error::MemberNotFound(zip_index));
        }

        let mut file = zip.by_index(zip_index)?;
        if file.is_dir() {
            return Err(Error::MemberNotFound(zip_index));
        }
        if file.size() > max_size {
            return Err(Error::MemberTooLarge {
                name: file.name().to_string(),
                size: file.size(),
            });
        }

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        debug!(name = file.name(), bytes = data.len(), "read member");

        Ok(Bytes::from(data))
    }
}

fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.add_directory("pages/", options).unwrap();
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn open_in_memory(files: &[(&str, &[u8])]) -> Result<RemoteArchive> {
        let source = Box::new(Bytes::from(build_zip(files)));
        RemoteArchive::from_source("memory", source, ArchiveOptions::default())
    }

    #[test]
    fn test_lists_file_members() {
        let archive = open_in_memory(&[
            ("pages/b2.png", &b"bbb"[..]),
            ("pages/a10.png", &b"aaaaaaaaaa"[..]),
        ])
        .unwrap();

        let names: Vec<_> = archive.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["pages/b2.png", "pages/a10.png"]);
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.members()[1].size, 10);
        assert_eq!(archive.location(), "memory");
    }

    #[test]
    fn test_read_member() {
        let archive = open_in_memory(&[("one.txt", &b"first"[..]), ("two.txt", &b"second"[..])]).unwrap();

        let second = &archive.members()[1];
        let data = archive.read(second.zip_index).unwrap();
        assert_eq!(&data[..], b"second");

        // Reads can be repeated and interleaved
        let first = &archive.members()[0];
        assert_eq!(&archive.read(first.zip_index).unwrap()[..], b"first");
        assert_eq!(&archive.read(second.zip_index).unwrap()[..], b"second");
    }

    #[test]
    fn test_read_unknown_member() {
        let archive = open_in_memory(&[("one.txt", &b"first"[..])]).unwrap();

        assert!(matches!(archive.read(99), Err(Error::MemberNotFound(99))));
        // Index 0 is the directory entry
        assert!(matches!(archive.read(0), Err(Error::MemberNotFound(0))));
    }

    #[test]
    fn test_no_members() {
        let result = open_in_memory(&[]);
        assert!(matches!(result, Err(Error::NoMembers)));
    }

    #[test]
    fn test_not_a_zip() {
        let source = Box::new(Bytes::from_static(b"definitely not a zip file"));
        let result = RemoteArchive::from_source("junk", source, ArchiveOptions::default());
        assert!(matches!(result, Err(Error::Zip(_))));
    }

    #[test]
    fn test_open_local_path_with_small_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.zip");
        let payload = vec![b'x'; 10_000];
        std::fs::write(&path, build_zip(&[("big.bin", payload.as_slice())])).unwrap();

        let options = ArchiveOptions {
            chunk_size: 512,
            chunk_count: 4,
        };
        let archive = RemoteArchive::open(path.to_str().unwrap(), options).unwrap();

        let member = &archive.members()[0];
        assert_eq!(&archive.read(member.zip_index).unwrap()[..], &payload[..]);
    }

    #[test]
    fn test_member_over_size_cap() {
        let archive = open_in_memory(&[("page.png", &b"0123456789"[..])]).unwrap();
        let zip_index = archive.members()[0].zip_index;

        let result = archive.read_capped(zip_index, 9);
        assert!(matches!(
            result,
            Err(Error::MemberTooLarge { ref name, size: 10 }) if name == "page.png"
        ));
        assert_eq!(archive.read_capped(zip_index, 10).unwrap().len(), 10);
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("http://example.com/a.zip"));
        assert!(is_url("HTTPS://example.com/a.zip"));
        assert!(!is_url("/tmp/a.zip"));
        assert!(!is_url("ookami.zip"));
    }
}
