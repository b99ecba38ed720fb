//! # remotezip
//!
//! Random-access zip archives that live somewhere else.
//!
//! ## Architecture
//! - **RangeSource**: positioned reads over HTTP ranges, local files or memory
//! - **ChunkCache**: fixed-size chunks with LRU retention in front of a source
//! - **RangeReader**: `Read + Seek` cursor so the `zip` crate can parse it
//! - **RemoteArchive**: member listing and single-member reads

#![warn(missing_docs)]

mod archive;
mod chunk;
mod error;
mod lru;
mod reader;
mod source;

pub use archive::{ArchiveOptions, Member, RemoteArchive};
pub use chunk::ChunkCache;
pub use error::{Error, Result};
pub use reader::RangeReader;
pub use source::{FileSource, HttpSource, RangeSource};
