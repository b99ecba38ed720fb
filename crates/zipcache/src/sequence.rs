//! Browsing sequence

use std::future::Future;
use std::ops::Index;
use std::pin::Pin;

use crate::error::LoadError;
use crate::natural::natural_cmp;

/// Boxed future producing one entry's image
pub type LoadFuture<I> = Pin<Box<dyn Future<Output = Result<I, LoadError>> + Send + 'static>>;

/// One archive member that can be turned into a displayable image
pub trait Entry: Send + Sync + 'static {
    /// Decoded, displayable image handle
    type Image: Clone + Send + Sync + 'static;

    /// Name used for ordering and display
    fn filename(&self) -> &str;

    /// Start fetching and decoding this entry
    ///
    /// The returned future must not borrow `self`; the cache spawns it.
    fn load(&self) -> LoadFuture<Self::Image>;
}

/// Entries in natural filename order, fixed for the session
pub struct Sequence<E> {
    entries: Vec<E>,
}

impl<E: Entry> Sequence<E> {
    /// Sort entries that arrived in archive order
    ///
    /// The sort is stable, so names the comparator considers equal keep
    /// their archive order.
    pub fn from_unordered(mut entries: Vec<E>) -> Self {
        entries.sort_by(|a, b| natural_cmp(a.filename(), b.filename()));
        Self { entries }
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    /// Filename at `index`
    pub fn filename(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.filename())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there is nothing to browse
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in browsing order
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }
}

impl<E> Index<usize> for Sequence<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.entries[index]
    }
}
