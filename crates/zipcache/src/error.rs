//! Error types for zipcache

use std::fmt;
use std::sync::Arc;

/// Result type alias for zipcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache and navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A viewer needs at least one entry
    EmptySequence,

    /// Requested index is not part of the sequence
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Sequence length
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptySequence => write!(f, "No entries to show"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range (sequence has {} entries)", index, len)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Failure to produce one entry's image
///
/// Cheap to clone: a failed load is cached and replayed to every waiter,
/// so the underlying error is shared rather than copied.
#[derive(Clone)]
pub struct LoadError(Arc<dyn std::error::Error + Send + Sync>);

impl LoadError {
    /// Wrap any error
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Error from a plain message
    pub fn msg(message: impl Into<String>) -> Self {
        Self(Arc::new(Message(message.into())))
    }

    /// Check whether two handles share the same underlying error
    pub fn ptr_eq(&self, other: &LoadError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<Error> for LoadError {
    fn from(err: Error) -> Self {
        LoadError::new(err)
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_load_error_display_passes_through() {
        let err = LoadError::new(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated entry"));
        assert_eq!(err.to_string(), "truncated entry");

        let err = LoadError::msg("bad png");
        assert_eq!(err.to_string(), "bad png");
    }

    #[test]
    fn test_load_error_clones_share() {
        let err = LoadError::from(Error::IndexOutOfRange { index: 9, len: 3 });
        let copy = err.clone();

        assert!(err.ptr_eq(&copy));
        assert!(!err.ptr_eq(&LoadError::msg("other")));
        assert_eq!(
            copy.to_string(),
            "Index 9 out of range (sequence has 3 entries)"
        );
    }
}
