//! Error types for remotezip

use std::fmt;
use std::io;

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for archive access
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),

    /// HTTP transport error
    Http(reqwest::Error),

    /// Server answered with a non-success status
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Server did not report a Content-Length
    UnknownLength(String),

    /// Resource is zero bytes long
    EmptyResource(String),

    /// Server ignored the Range header
    RangeUnsupported(String),

    /// Source returned fewer bytes than it claims to hold
    ShortRead {
        /// Offset of the read
        offset: u64,
        /// Bytes requested
        expected: usize,
        /// Bytes received
        got: usize,
    },

    /// Malformed or unsupported zip data
    Zip(zip::result::ZipError),

    /// Archive holds no file members
    NoMembers,

    /// No member at this zip index
    MemberNotFound(usize),

    /// Member exceeds the decompression limit
    MemberTooLarge {
        /// Member name
        name: String,
        /// Uncompressed size
        size: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Status { url, status } => {
                write!(f, "couldn't fetch {}, got response code {}", url, status)
            }
            Error::UnknownLength(url) => write!(f, "{} has unknown content-length", url),
            Error::EmptyResource(url) => write!(f, "{} has zero content-length", url),
            Error::RangeUnsupported(url) => write!(f, "{} does not support range requests", url),
            Error::ShortRead {
                offset,
                expected,
                got,
            } => write!(
                f,
                "short read at offset {}: wanted {} bytes, got {}",
                offset, expected, got
            ),
            Error::Zip(e) => write!(f, "Couldn't open zip file: {}", e),
            Error::NoMembers => write!(f, "No files in zip"),
            Error::MemberNotFound(index) => write!(f, "No zip member at index {}", index),
            Error::MemberTooLarge { name, size } => {
                write!(f, "{} is too large: {} bytes (max 256 MB)", name, size)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::Zip(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            other => io::Error::other(other),
        }
    }
}
