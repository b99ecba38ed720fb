//! Scripted entries for cache and navigator tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::LoadError;
use crate::sequence::{Entry, LoadFuture, Sequence};
use crate::view::{Render, View};

/// Entry whose loads are counted and optionally held until released
pub(crate) struct FakeEntry {
    name: String,
    fetches: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
    fail: bool,
}

impl Entry for FakeEntry {
    type Image = String;

    fn filename(&self) -> &str {
        &self.name
    }

    fn load(&self) -> LoadFuture<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let name = self.name.clone();
        let gate = self.gate.clone();
        let fail = self.fail;

        Box::pin(async move {
            if let Some(gate) = gate {
                gate.acquire().await.map_err(LoadError::new)?.forget();
            }
            if fail {
                Err(LoadError::msg(format!("{} is corrupt", name)))
            } else {
                Ok(format!("image:{}", name))
            }
        })
    }
}

/// Builder for a sequence of fake entries
pub(crate) struct Book {
    entries: Vec<FakeEntry>,
}

impl Book {
    pub(crate) fn new(names: &[&str]) -> Self {
        let entries = names
            .iter()
            .map(|name| FakeEntry {
                name: name.to_string(),
                fetches: Arc::new(AtomicUsize::new(0)),
                gate: None,
                fail: false,
            })
            .collect();
        Self { entries }
    }

    /// `count` entries named p00, p01, ...
    pub(crate) fn numbered(count: usize) -> Self {
        let names: Vec<String> = (0..count).map(|i| format!("p{:02}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::new(&refs)
    }

    /// Hold loads of `name` until [`Probe::release`]
    pub(crate) fn gated(mut self, name: &str) -> Self {
        for entry in self.entries.iter_mut().filter(|e| e.name == name) {
            entry.gate = Some(Arc::new(Semaphore::new(0)));
        }
        self
    }

    /// Make loads of `name` fail
    pub(crate) fn failing(mut self, name: &str) -> Self {
        for entry in self.entries.iter_mut().filter(|e| e.name == name) {
            entry.fail = true;
        }
        self
    }

    pub(crate) fn build(self) -> (Arc<Sequence<FakeEntry>>, Probe) {
        let mut probe = Probe {
            fetches: HashMap::new(),
            gates: HashMap::new(),
        };
        for entry in &self.entries {
            probe
                .fetches
                .insert(entry.name.clone(), Arc::clone(&entry.fetches));
            if let Some(gate) = &entry.gate {
                probe.gates.insert(entry.name.clone(), Arc::clone(gate));
            }
        }
        (Arc::new(Sequence::from_unordered(self.entries)), probe)
    }
}

/// Test-side handles into a built [`Book`]
pub(crate) struct Probe {
    fetches: HashMap<String, Arc<AtomicUsize>>,
    gates: HashMap<String, Arc<Semaphore>>,
}

impl Probe {
    /// Number of loads started for `name`
    pub(crate) fn fetches(&self, name: &str) -> usize {
        self.fetches
            .get(name)
            .map_or(0, |count| count.load(Ordering::SeqCst))
    }

    /// Let one held load of `name` finish
    pub(crate) fn release(&self, name: &str) {
        if let Some(gate) = self.gates.get(name) {
            gate.add_permits(1);
        }
    }
}

/// Renderer that keeps one line per frame
#[derive(Default)]
pub(crate) struct Frames(pub(crate) Vec<String>);

impl Frames {
    pub(crate) fn last(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }
}

impl Render<String> for Frames {
    fn render(&mut self, view: &View<'_, String>) {
        let body = match (view.image, view.error) {
            (_, Some(err)) => format!("error: {}", err),
            (Some(image), None) => image.clone(),
            (None, None) => "-".to_string(),
        };
        self.0.push(format!("{} | {}", view.context_line(), body));
    }
}
