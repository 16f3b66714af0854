//! Background synchronization of notebooks into the store.
//!
//! The [`Worker`] polls every notebook on a fixed period (or on request),
//! reconciles the store against what each source returned, and publishes
//! changed notes on the event bus.

pub mod worker;

pub use worker::{Worker, DEFAULT_SYNC_INTERVAL};

use crate::models::{Notebook, NotebookKind};
use crate::sources::{discover_profiles, MozillaSource};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Control messages accepted by a running worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Run a sync cycle now
    Reload,
    /// Finish the current cycle, close the bus and return
    Stop,
}

/// Capacity of the request channel.
pub const REQUEST_CAPACITY: usize = 1;

pub fn request_channel() -> (mpsc::Sender<Request>, mpsc::Receiver<Request>) {
    mpsc::channel(REQUEST_CAPACITY)
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Notebooks whose load returned an error
    pub failed_notebooks: usize,
    /// Notes accepted by the bus
    pub published: usize,
}

impl CycleReport {
    /// Whether the store changed during the cycle.
    pub fn has_changes(&self) -> bool {
        self.inserted + self.updated + self.deleted > 0
    }

    fn absorb(&mut self, other: CycleReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.failed_notebooks += other.failed_notebooks;
        self.published += other.published;
    }
}

/// Called once after a cycle that changed the store.
pub trait RefreshHook: Send + Sync {
    fn refresh(&self);
}

impl<F> RefreshHook for F
where
    F: Fn() + Send + Sync,
{
    fn refresh(&self) {
        self()
    }
}

/// Refresh hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresh;

impl RefreshHook for NoopRefresh {
    fn refresh(&self) {}
}

/// Produces notebooks that were not configured explicitly.
pub trait Discoverer: Send + Sync {
    fn discover(&self) -> Vec<Notebook>;
}

/// Finds Firefox profiles below a home directory.
#[derive(Debug, Clone)]
pub struct MozillaDiscoverer {
    home: PathBuf,
}

impl MozillaDiscoverer {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }
}

impl Discoverer for MozillaDiscoverer {
    fn discover(&self) -> Vec<Notebook> {
        discover_profiles(&self.home)
            .into_iter()
            .map(|(name, places)| {
                let mut config = HashMap::new();
                config.insert("impl".to_string(), "mozilla".to_string());
                config.insert("path".to_string(), places.to_string_lossy().into_owned());
                Notebook::new(
                    name,
                    Arc::new(MozillaSource::new(places)),
                    config,
                    NotebookKind::AutoDiscovered,
                )
            })
            .collect()
    }
}
