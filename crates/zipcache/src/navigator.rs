//! Navigation and prefetch controller
//!
//! Owns the current index and the viewer state. Every move requests the
//! new index in the foreground; once that load lands (and is still the
//! current one), the view is rendered, neighbours are prefetched after a
//! short delay, and the cache is trimmed to the retention window.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{ImageCache, Outcome};
use crate::config::ViewerConfig;
use crate::error::{Error, LoadError, Result};
use crate::sequence::{Entry, Sequence};
use crate::view::{Command, Render, View};

/// What the presentation layer gets to see
#[derive(Debug, Clone)]
pub struct ViewerState<I> {
    current: usize,
    loading: bool,
    image: Option<I>,
    error: Option<LoadError>,
}

impl<I> ViewerState<I> {
    /// Current index (0-based)
    pub fn current(&self) -> usize {
        self.current
    }

    /// Whether the current index is still loading
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Image for the current index, once loaded
    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    /// Load failure for the current index
    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }
}

/// Internal events fed back into the controller's task
enum Event<I> {
    /// A foreground request settled
    Loaded { index: usize, outcome: Outcome<I> },
    /// Prefetch delay elapsed for `center`
    Prefetch { center: usize },
}

/// Single-session viewer controller
pub struct Navigator<E: Entry, R> {
    cache: ImageCache<E>,
    state: ViewerState<E::Image>,
    renderer: R,
    config: ViewerConfig,
    events_tx: mpsc::UnboundedSender<Event<E::Image>>,
    events_rx: mpsc::UnboundedReceiver<Event<E::Image>>,
}

impl<E, R> Navigator<E, R>
where
    E: Entry,
    R: Render<E::Image>,
{
    /// Create a controller over a non-empty sequence
    pub fn new(sequence: Arc<Sequence<E>>, renderer: R, config: ViewerConfig) -> Result<Self> {
        if sequence.is_empty() {
            return Err(Error::EmptySequence);
        }
        if config.retain_radius < config.prefetch_radius {
            warn!(
                retain = config.retain_radius,
                prefetch = config.prefetch_radius,
                "retain radius is smaller than prefetch radius; prefetched images will be evicted"
            );
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            cache: ImageCache::new(sequence),
            state: ViewerState {
                current: 0,
                loading: false,
                image: None,
                error: None,
            },
            renderer,
            config,
            events_tx,
            events_rx,
        })
    }

    /// Show the first entry
    pub fn start(&mut self) {
        info!(entries = self.len(), "starting viewer");
        self.show(0);
    }

    /// Step back one entry; no-op at the first entry
    ///
    /// # Returns
    /// * `bool` - Whether the index changed
    pub fn navigate_left(&mut self) -> bool {
        if self.state.current == 0 {
            return false;
        }
        self.show(self.state.current - 1);
        true
    }

    /// Step forward one entry; no-op at the last entry
    ///
    /// # Returns
    /// * `bool` - Whether the index changed
    pub fn navigate_right(&mut self) -> bool {
        if self.state.current + 1 >= self.len() {
            return false;
        }
        self.show(self.state.current + 1);
        true
    }

    /// Redraw without touching state
    pub fn resize(&mut self) {
        self.render();
    }

    /// Route one input command
    ///
    /// # Returns
    /// * `bool` - False once the session should end
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Left => {
                self.navigate_left();
            }
            Command::Right => {
                self.navigate_right();
            }
            Command::Resize => self.resize(),
            Command::Quit => return false,
        }
        true
    }

    /// Wait for one internal event (fetch settled, load delivered,
    /// prefetch due) and handle it
    pub async fn pump(&mut self) {
        tokio::select! {
            _ = self.cache.settle_next() => {}
            Some(event) = self.events_rx.recv() => self.handle(event),
        }
    }

    /// Drive the viewer until `Quit` or until the command channel closes
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.apply(command) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = self.pump() => {}
            }
        }
        debug!(current = self.state.current, "viewer loop finished");
    }

    /// Current viewer state
    pub fn state(&self) -> &ViewerState<E::Image> {
        &self.state
    }

    /// The image cache
    pub fn cache(&self) -> &ImageCache<E> {
        &self.cache
    }

    /// The presentation layer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the presentation layer
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.cache.sequence().len()
    }

    /// Companion to [`Navigator::len`]; `new` rejects empty sequences
    pub fn is_empty(&self) -> bool {
        self.cache.sequence().is_empty()
    }

    fn show(&mut self, index: usize) {
        self.state.current = index;
        self.state.loading = true;
        self.state.image = None;
        self.state.error = None;

        let handle = self.cache.request(index);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            if let Some(outcome) = handle.wait().await {
                let _ = events.send(Event::Loaded { index, outcome });
            }
        });

        self.render();
        self.cache.evict(index, self.config.retain_radius);
    }

    fn handle(&mut self, event: Event<E::Image>) {
        match event {
            Event::Loaded { index, outcome } => self.loaded(index, outcome),
            Event::Prefetch { center } => self.prefetch(center),
        }
    }

    fn loaded(&mut self, index: usize, outcome: Outcome<E::Image>) {
        if index != self.state.current {
            debug!(index, current = self.state.current, "dropping stale load");
            return;
        }

        self.state.loading = false;
        match outcome {
            Ok(image) => self.state.image = Some(image),
            Err(err) => {
                warn!(index, error = %err, "couldn't load entry");
                self.state.error = Some(err);
            }
        }
        self.render();

        if self.config.prefetch_radius > 0 {
            let events = self.events_tx.clone();
            let delay = self.config.prefetch_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = events.send(Event::Prefetch { center: index });
            });
        }

        self.cache.evict(index, self.config.retain_radius);
    }

    /// Fire-and-forget neighbour loads; stale centers are not cancelled
    fn prefetch(&mut self, center: usize) {
        let len = self.len();
        for distance in 1..=self.config.prefetch_radius {
            if let Some(before) = center.checked_sub(distance) {
                self.cache.request(before);
            }
            if center + distance < len {
                self.cache.request(center + distance);
            }
        }
    }

    fn render(&mut self) {
        let index = self.state.current;
        let sequence = self.cache.sequence();
        let view = View {
            index,
            total: sequence.len(),
            filename: sequence.filename(index).unwrap_or_default(),
            loading: self.state.loading,
            image: self.state.image.as_ref(),
            error: self.state.error.as_ref(),
        };
        self.renderer.render(&view);
    }
}
