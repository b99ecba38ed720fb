//! # zipcache
//!
//! Loading engine for a one-image-at-a-time archive viewer.
//!
//! ## Architecture
//! - **Natural order**: digit runs compare by value, fixed once into a [`Sequence`]
//! - **ImageCache**: per-index Pending/Ready/Failed slots, one fetch per index,
//!   sliding eviction window
//! - **Navigator**: current index, foreground load, delayed neighbour prefetch
//!
//! Everything runs on one logical task. Fetches are spawned onto the Tokio
//! runtime and report back through a channel, so cache and viewer state
//! are only ever mutated from the task that owns the [`Navigator`].

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod natural;
mod navigator;
mod sequence;
mod stats;
mod view;

#[cfg(test)]
mod testing;

pub use cache::{ImageCache, LoadHandle, Outcome, Settlement, SlotStatus};
pub use config::ViewerConfig;
pub use error::{Error, LoadError, Result};
pub use natural::natural_cmp;
pub use navigator::{Navigator, ViewerState};
pub use sequence::{Entry, LoadFuture, Sequence};
pub use stats::CacheStats;
pub use view::{Command, Render, View};
