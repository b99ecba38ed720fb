//! Viewer tuning

use std::time::Duration;

/// Timing and window sizes for the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Pause between a foreground load finishing and neighbour prefetch
    pub prefetch_delay: Duration,
    /// Neighbours prefetched on each side of the current index
    pub prefetch_radius: usize,
    /// Entries retained on each side of the current index
    pub retain_radius: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            prefetch_delay: Duration::from_millis(100),
            prefetch_radius: 1,
            retain_radius: 2,
        }
    }
}
