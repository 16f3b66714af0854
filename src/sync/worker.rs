//! The synchronizer loop.

use crate::bus::BusWriter;
use crate::metrics::SyncMetrics;
use crate::models::{Note, NoteKey, Notebook, Query};
use crate::store::Store;
use crate::sync::{CycleReport, Discoverer, NoopRefresh, RefreshHook, Request};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Polling period when none is configured.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Keeps the store in step with every notebook's source.
///
/// The worker owns the only [`BusWriter`]; the bus closes when the worker
/// returns from [`Worker::run`].
pub struct Worker {
    store: Arc<Store>,
    bus: Option<BusWriter>,
    requests: mpsc::Receiver<Request>,
    refresh: Arc<dyn RefreshHook>,
    discoverers: Vec<Box<dyn Discoverer>>,
    interval: Duration,
    metrics: SyncMetrics,
}

impl Worker {
    pub fn new(store: Arc<Store>, bus: BusWriter, requests: mpsc::Receiver<Request>) -> Self {
        Self {
            store,
            bus: Some(bus),
            requests,
            refresh: Arc::new(NoopRefresh),
            discoverers: Vec::new(),
            interval: DEFAULT_SYNC_INTERVAL,
            metrics: SyncMetrics::new(),
        }
    }

    pub fn with_refresh(mut self, hook: impl RefreshHook + 'static) -> Self {
        self.refresh = Arc::new(hook);
        self
    }

    /// Add a source of auto-discovered notebooks, consulted every cycle.
    pub fn with_discoverer(mut self, discoverer: impl Discoverer + 'static) -> Self {
        self.discoverers.push(Box::new(discoverer));
        self
    }

    /// Period between cycles. A zero period keeps the default.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            warn!(
                default = ?DEFAULT_SYNC_INTERVAL,
                "Sync interval must be non-zero, using default"
            );
            return self;
        }
        self.interval = interval;
        self
    }

    /// Counters shared with this worker.
    pub fn metrics(&self) -> SyncMetrics {
        self.metrics.clone()
    }

    /// Process requests and periodic ticks until stopped.
    ///
    /// Returns on [`Request::Stop`] or when every request sender is gone.
    pub async fn run(mut self) {
        info!(interval = ?self.interval, "Synchronizer started");

        let mut ticker = interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                request = self.requests.recv() => match request {
                    Some(Request::Reload) => {
                        debug!("Reload requested");
                        self.run_cycle().await;
                    }
                    Some(Request::Stop) => {
                        info!("received graceful shutdown request");
                        break;
                    }
                    None => {
                        info!("Request channel closed, stopping synchronizer");
                        break;
                    }
                },
            }
        }

        self.bus.take();
    }

    /// Discover, load and reconcile every notebook once.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        self.discover();

        let notebooks: Vec<Arc<Notebook>> = self
            .store
            .notebooks()
            .into_iter()
            .filter(|nb| nb.is_enabled())
            .collect();

        let outcomes = join_all(notebooks.iter().map(|nb| self.sync_notebook(nb))).await;

        let mut report = CycleReport::default();
        for outcome in outcomes {
            report.absorb(outcome);
        }

        if report.has_changes() {
            self.refresh.refresh();
        }

        let elapsed = started.elapsed();
        self.metrics.record_cycle(&report, elapsed);
        debug!(
            notebooks = notebooks.len(),
            inserted = report.inserted,
            updated = report.updated,
            deleted = report.deleted,
            failed = report.failed_notebooks,
            elapsed_ms = elapsed.as_millis() as u64,
            "Sync cycle complete"
        );

        report
    }

    /// Register discovered notebooks the store does not know yet.
    fn discover(&self) {
        for discoverer in &self.discoverers {
            for notebook in discoverer.discover() {
                if self.store.has_notebook(notebook.name()) {
                    continue;
                }
                let id = notebook.id().clone();
                if self.store.create_notebook(notebook) {
                    info!(notebook = %id, "Registered auto-discovered notebook");
                }
            }
        }
    }

    async fn sync_notebook(&self, notebook: &Notebook) -> CycleReport {
        let mut report = CycleReport::default();

        let data = match notebook.load_data().await {
            Ok(data) => data,
            Err(e) => {
                warn!(notebook = %notebook.id(), "Failed to load notebook: {}", e);
                report.failed_notebooks = 1;
                return report;
            }
        };

        let known: HashSet<u64> = self
            .store
            .query(&Query::all().in_notebook(notebook.id().clone()))
            .into_iter()
            .map(|note| note.uuid)
            .collect();

        for uuid in known.iter().filter(|uuid| !data.contains_key(uuid)) {
            if self.store.delete(&NoteKey::new(notebook.id().clone(), *uuid)) {
                report.deleted += 1;
            }
        }

        for (uuid, mut note) in data {
            let key = NoteKey::new(notebook.id().clone(), uuid);
            match self.store.get(&key) {
                Some(existing) if existing.same_as(&note) => continue,
                Some(_) => report.updated += 1,
                None => report.inserted += 1,
            }

            note.source = Some(key.notebook.clone());
            self.store.put(key, note.clone());
            if self.publish(note).await {
                report.published += 1;
            }
        }

        if report.has_changes() {
            debug!(
                notebook = %notebook.id(),
                inserted = report.inserted,
                updated = report.updated,
                deleted = report.deleted,
                "Notebook changed"
            );
        }

        report
    }

    async fn publish(&self, note: Note) -> bool {
        match &self.bus {
            Some(bus) => {
                let delivered = bus.publish(note).await;
                if !delivered {
                    debug!("Event bus has no reader, change not delivered");
                }
                delivered
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("interval", &self.interval)
            .field("discoverers", &self.discoverers.len())
            .field("bus_open", &self.bus.is_some())
            .finish()
    }
}
