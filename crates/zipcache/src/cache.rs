//! Windowed image cache
//!
//! Each requested index gets one slot that moves from Pending to Ready or
//! Failed exactly once. Requests for a Pending slot queue behind the
//! in-flight fetch instead of starting another. Eviction drops slots
//! outside a window around the current index; a fetch that settles after
//! its slot was evicted is recognised by its ticket and not written back.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use ahash::RandomState;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::{Error, LoadError};
use crate::sequence::{Entry, Sequence};
use crate::stats::CacheStats;

/// Result of loading one entry
pub type Outcome<I> = Result<I, LoadError>;

/// Coarse slot state, for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Fetch in flight
    Pending,
    /// Image available
    Ready,
    /// Fetch failed; replayed until evicted
    Failed,
}

enum Slot<I> {
    Pending { waiters: Vec<oneshot::Sender<Outcome<I>>> },
    Ready(I),
    Failed(LoadError),
}

struct CacheEntry<I> {
    ticket: u64,
    slot: Slot<I>,
}

/// A finished fetch on its way back to the cache
pub struct Settlement<I> {
    index: usize,
    ticket: u64,
    outcome: Outcome<I>,
}

impl<I> Settlement<I> {
    /// Index the fetch was for
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Receipt for one request; resolves exactly once
pub struct LoadHandle<I> {
    index: usize,
    rx: oneshot::Receiver<Outcome<I>>,
}

impl<I> LoadHandle<I> {
    /// Index this handle was issued for
    pub fn index(&self) -> usize {
        self.index
    }

    /// Wait for the outcome
    ///
    /// `None` only if the cache was dropped before the fetch settled.
    pub async fn wait(self) -> Option<Outcome<I>> {
        self.rx.await.ok()
    }

    /// Take the outcome if it has already been delivered
    pub fn try_take(&mut self) -> Option<Outcome<I>> {
        self.rx.try_recv().ok()
    }
}

/// Per-index image cache over a [`Sequence`]
pub struct ImageCache<E: Entry> {
    sequence: Arc<Sequence<E>>,
    entries: HashMap<usize, CacheEntry<E::Image>, RandomState>,
    /// Waiters of evicted Pending slots, keyed by ticket
    detached: HashMap<u64, Vec<oneshot::Sender<Outcome<E::Image>>>, RandomState>,
    next_ticket: u64,
    settled_tx: mpsc::UnboundedSender<Settlement<E::Image>>,
    settled_rx: mpsc::UnboundedReceiver<Settlement<E::Image>>,
    stats: Arc<CacheStats>,
}

impl<E: Entry> ImageCache<E> {
    /// Create an empty cache for `sequence`
    pub fn new(sequence: Arc<Sequence<E>>) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();

        Self {
            sequence,
            entries: HashMap::with_hasher(RandomState::new()),
            detached: HashMap::with_hasher(RandomState::new()),
            next_ticket: 0,
            settled_tx,
            settled_rx,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Register interest in `index`
    ///
    /// Starts the fetch if the index has no slot. The returned handle is
    /// never resolved inside this call's stack frame: outcomes travel
    /// through a channel, so a cache hit cannot re-enter the caller.
    /// Must be called within a Tokio runtime.
    pub fn request(&mut self, index: usize) -> LoadHandle<E::Image> {
        let (tx, rx) = oneshot::channel();
        let handle = LoadHandle { index, rx };

        if let Some(cached) = self.entries.get_mut(&index) {
            match &mut cached.slot {
                Slot::Pending { waiters } => {
                    waiters.push(tx);
                    self.stats.record_join();
                    debug!(index, waiters = waiters.len(), "joined pending load");
                }
                Slot::Ready(image) => {
                    let _ = tx.send(Ok(image.clone()));
                    self.stats.record_hit();
                }
                Slot::Failed(err) => {
                    let _ = tx.send(Err(err.clone()));
                    self.stats.record_hit();
                }
            }
            return handle;
        }

        let load = match self.sequence.get(index) {
            Some(entry) => {
                debug!(index, filename = entry.filename(), "load start");
                entry.load()
            }
            None => {
                let err = Error::IndexOutOfRange {
                    index,
                    len: self.sequence.len(),
                };
                let _ = tx.send(Err(err.into()));
                return handle;
            }
        };

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.entries.insert(
            index,
            CacheEntry {
                ticket,
                slot: Slot::Pending { waiters: vec![tx] },
            },
        );
        self.stats.record_miss();

        let settled = self.settled_tx.clone();
        tokio::spawn(async move {
            let outcome = load.await;
            let _ = settled.send(Settlement {
                index,
                ticket,
                outcome,
            });
        });

        handle
    }

    /// Drop every slot outside `[center - radius, center + radius]`
    ///
    /// In-flight fetches keep running. Their waiters are still answered,
    /// but the result is not stored.
    ///
    /// # Returns
    /// * `usize` - Number of slots evicted
    pub fn evict(&mut self, center: usize, radius: usize) -> usize {
        let low = center.saturating_sub(radius);
        let high = center.saturating_add(radius);

        let doomed: Vec<usize> = self
            .entries
            .keys()
            .copied()
            .filter(|&i| i < low || i > high)
            .collect();

        for &index in &doomed {
            let Some(entry) = self.entries.remove(&index) else {
                continue;
            };
            debug!(index, "expiring entry");
            self.stats.record_eviction();

            if let Slot::Pending { mut waiters } = entry.slot {
                waiters.retain(|w| !w.is_closed());
                if !waiters.is_empty() {
                    self.detached.insert(entry.ticket, waiters);
                }
            }
        }

        doomed.len()
    }

    /// Apply a finished fetch
    ///
    /// # Returns
    /// * `bool` - Whether the outcome was stored (false if the slot was evicted)
    pub fn settle(&mut self, settlement: Settlement<E::Image>) -> bool {
        let Settlement {
            index,
            ticket,
            outcome,
        } = settlement;

        match self.entries.get_mut(&index) {
            Some(entry) if entry.ticket == ticket => {
                let slot = match &outcome {
                    Ok(image) => Slot::Ready(image.clone()),
                    Err(err) => Slot::Failed(err.clone()),
                };
                debug!(index, ok = outcome.is_ok(), "load settled");

                if let Slot::Pending { waiters } = mem::replace(&mut entry.slot, slot) {
                    notify(waiters, &outcome);
                }
                true
            }
            _ => {
                debug!(index, ticket, "discarding result for evicted entry");
                self.stats.record_discard();
                if let Some(waiters) = self.detached.remove(&ticket) {
                    notify(waiters, &outcome);
                }
                false
            }
        }
    }

    /// Wait for the next fetch to finish and apply it
    ///
    /// Cancel-safe: nothing is applied unless a settlement was received.
    ///
    /// # Returns
    /// * `Option<usize>` - Index whose fetch settled
    pub async fn settle_next(&mut self) -> Option<usize> {
        // The cache holds a sender, so the channel never closes
        let settlement = self.settled_rx.recv().await?;
        let index = settlement.index;
        self.settle(settlement);
        Some(index)
    }

    /// Slot state for `index`, if it has a slot
    pub fn status(&self, index: usize) -> Option<SlotStatus> {
        self.entries.get(&index).map(|entry| match entry.slot {
            Slot::Pending { .. } => SlotStatus::Pending,
            Slot::Ready(_) => SlotStatus::Ready,
            Slot::Failed(_) => SlotStatus::Failed,
        })
    }

    /// Check whether `index` has a slot
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Indices with a slot, ascending
    pub fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.entries.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no index has a slot
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The sequence being cached
    pub fn sequence(&self) -> &Arc<Sequence<E>> {
        &self.sequence
    }

    /// Cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Shared handle to the statistics
    pub fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }
}

/// Answer waiters in registration order
fn notify<I: Clone>(waiters: Vec<oneshot::Sender<Outcome<I>>>, outcome: &Outcome<I>) {
    for waiter in waiters {
        let _ = waiter.send(outcome.clone());
    }
}
