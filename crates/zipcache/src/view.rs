//! Presentation and input contracts

use crate::error::LoadError;

/// Snapshot handed to the presentation layer on every render
#[derive(Debug)]
pub struct View<'a, I> {
    /// Current index (0-based)
    pub index: usize,
    /// Number of entries in the sequence
    pub total: usize,
    /// Name of the current entry
    pub filename: &'a str,
    /// Current entry still loading
    pub loading: bool,
    /// Loaded image for the current entry
    pub image: Option<&'a I>,
    /// Load failure for the current entry
    pub error: Option<&'a LoadError>,
}

impl<I> View<'_, I> {
    /// Position header, e.g. `[2/3] a10.png (loading)`
    pub fn context_line(&self) -> String {
        let mut line = format!("[{}/{}] {}", self.index + 1, self.total, self.filename);
        if self.loading {
            line.push_str(" (loading)");
        }
        line
    }
}

/// Presentation layer: a function of the view, never read back
pub trait Render<I> {
    /// Draw the view
    fn render(&mut self, view: &View<'_, I>);
}

/// Navigation entry points exposed to input routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Previous entry
    Left,
    /// Next entry
    Right,
    /// Viewport changed; redraw only
    Resize,
    /// Stop the event loop
    Quit,
}
