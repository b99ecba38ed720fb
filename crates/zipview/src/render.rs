//! Line-oriented terminal presentation

use std::fmt::Display;
use std::io::Write;

use tracing::warn;
use zipcache::{Render, View};

use crate::picture::Picture;

/// Writes one block of text per render to `out`
pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Shown while the archive's central directory is fetched
    pub fn opening(&mut self, location: &str) {
        self.emit(format_args!("Opening {}", location));
    }

    /// Shown when the archive cannot be browsed at all
    pub fn fatal(&mut self, location: &str, err: &dyn Display) {
        self.emit(format_args!("Couldn't load from {}: {}", location, err));
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>) {
        let result = writeln!(self.out, "{}", text).and_then(|_| self.out.flush());
        if let Err(err) = result {
            warn!(error = %err, "couldn't write to terminal");
        }
    }
}

impl<W: Write> Render<Picture> for TerminalRenderer<W> {
    fn render(&mut self, view: &View<'_, Picture>) {
        let body = match (view.image, view.error) {
            (_, Some(err)) => format!("Couldn't open {} in zip file: {}", view.filename, err),
            (Some(picture), None) => format!(
                "{}: {} {}x{}, {} bytes",
                view.filename,
                picture.format_name(),
                picture.width(),
                picture.height(),
                picture.data().len()
            ),
            (None, None) => format!("Loading {}", view.filename),
        };
        self.emit(format_args!("{}\n{}", view.context_line(), body));
    }
}
