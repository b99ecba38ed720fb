//! LRU bookkeeping for cached chunks
//!
//! Slots live in a vector and are threaded onto an intrusive
//! doubly-linked list, so touch, insert and evict are all O(1).

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;

/// Chunk slot on the recency list
struct Slot {
    chunk: u64,
    data: Arc<[u8]>,
    newer: Option<usize>,
    older: Option<usize>,
}

/// Fixed-capacity LRU of chunk buffers keyed by chunk number
pub(crate) struct ChunkLru {
    map: HashMap<u64, usize, RandomState>,
    slots: Vec<Option<Slot>>,
    newest: Option<usize>,
    oldest: Option<usize>,
    vacant: Vec<usize>,
    capacity: usize,
}

impl ChunkLru {
    /// Create an empty LRU holding at most `capacity` chunks
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            slots: Vec::with_capacity(capacity),
            newest: None,
            oldest: None,
            vacant: Vec::new(),
            capacity,
        }
    }

    /// Look up a chunk and mark it most recently used
    pub(crate) fn get(&mut self, chunk: u64) -> Option<Arc<[u8]>> {
        let idx = *self.map.get(&chunk)?;
        self.touch(idx);
        self.slots[idx].as_ref().map(|slot| Arc::clone(&slot.data))
    }

    /// Insert a chunk, returning the chunk number evicted to make room
    pub(crate) fn insert(&mut self, chunk: u64, data: Arc<[u8]>) -> Option<u64> {
        if let Some(&idx) = self.map.get(&chunk) {
            if let Some(slot) = &mut self.slots[idx] {
                slot.data = data;
            }
            self.touch(idx);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_oldest()
        } else {
            None
        };

        let idx = match self.vacant.pop() {
            Some(idx) => idx,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        self.slots[idx] = Some(Slot {
            chunk,
            data,
            newer: None,
            older: None,
        });
        self.push_newest(idx);
        self.map.insert(chunk, idx);

        evicted
    }

    /// Number of chunks held
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    fn touch(&mut self, idx: usize) {
        if self.newest == Some(idx) {
            return;
        }
        self.detach(idx);
        self.push_newest(idx);
    }

    fn push_newest(&mut self, idx: usize) {
        let previous = self.newest;
        if let Some(slot) = &mut self.slots[idx] {
            slot.newer = None;
            slot.older = previous;
        }
        if let Some(prev_idx) = previous {
            if let Some(prev) = &mut self.slots[prev_idx] {
                prev.newer = Some(idx);
            }
        }
        self.newest = Some(idx);
        if self.oldest.is_none() {
            self.oldest = Some(idx);
        }
    }

    fn detach(&mut self, idx: usize) {
        let (newer, older) = match &self.slots[idx] {
            Some(slot) => (slot.newer, slot.older),
            None => return,
        };

        match newer {
            Some(n) => {
                if let Some(slot) = &mut self.slots[n] {
                    slot.older = older;
                }
            }
            None => self.newest = older,
        }
        match older {
            Some(o) => {
                if let Some(slot) = &mut self.slots[o] {
                    slot.newer = newer;
                }
            }
            None => self.oldest = newer,
        }
    }

    fn pop_oldest(&mut self) -> Option<u64> {
        let idx = self.oldest?;
        self.detach(idx);
        let slot = self.slots[idx].take()?;
        self.map.remove(&slot.chunk);
        self.vacant.push(idx);
        Some(slot.chunk)
    }
}
