//! Basic metrics instrumentation for the synchronizer.
//!
//! Provides counters for sync cycles, failed loads, and store mutations.

use crate::sync::CycleReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector shared between the worker and whoever reports on it.
#[derive(Debug, Clone)]
pub struct SyncMetrics {
    /// Completed sync cycles
    cycles_total: Arc<AtomicU64>,

    /// Notebook loads that returned an error
    load_failures_total: Arc<AtomicU64>,

    notes_inserted_total: Arc<AtomicU64>,

    notes_updated_total: Arc<AtomicU64>,

    notes_deleted_total: Arc<AtomicU64>,

    /// Notes handed to the event bus
    notes_published_total: Arc<AtomicU64>,

    /// Total wall time spent in cycles, in milliseconds
    cycle_duration_total_ms: Arc<AtomicU64>,
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            cycles_total: Arc::new(AtomicU64::new(0)),
            load_failures_total: Arc::new(AtomicU64::new(0)),
            notes_inserted_total: Arc::new(AtomicU64::new(0)),
            notes_updated_total: Arc::new(AtomicU64::new(0)),
            notes_deleted_total: Arc::new(AtomicU64::new(0)),
            notes_published_total: Arc::new(AtomicU64::new(0)),
            cycle_duration_total_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fold one finished cycle into the counters.
    pub fn record_cycle(&self, report: &CycleReport, duration: Duration) {
        self.cycles_total.fetch_add(1, Ordering::Relaxed);
        self.load_failures_total
            .fetch_add(report.failed_notebooks as u64, Ordering::Relaxed);
        self.notes_inserted_total
            .fetch_add(report.inserted as u64, Ordering::Relaxed);
        self.notes_updated_total
            .fetch_add(report.updated as u64, Ordering::Relaxed);
        self.notes_deleted_total
            .fetch_add(report.deleted as u64, Ordering::Relaxed);
        self.notes_published_total
            .fetch_add(report.published as u64, Ordering::Relaxed);
        self.cycle_duration_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn cycles_total(&self) -> u64 {
        self.cycles_total.load(Ordering::Relaxed)
    }

    pub fn load_failures_total(&self) -> u64 {
        self.load_failures_total.load(Ordering::Relaxed)
    }

    pub fn notes_inserted_total(&self) -> u64 {
        self.notes_inserted_total.load(Ordering::Relaxed)
    }

    pub fn notes_updated_total(&self) -> u64 {
        self.notes_updated_total.load(Ordering::Relaxed)
    }

    pub fn notes_deleted_total(&self) -> u64 {
        self.notes_deleted_total.load(Ordering::Relaxed)
    }

    pub fn notes_published_total(&self) -> u64 {
        self.notes_published_total.load(Ordering::Relaxed)
    }

    /// Average cycle duration in milliseconds.
    pub fn cycle_duration_avg_ms(&self) -> f64 {
        let total = self.cycle_duration_total_ms.load(Ordering::Relaxed);
        let count = self.cycles_total();
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Get a summary of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            cycles_total: self.cycles_total(),
            load_failures_total: self.load_failures_total(),
            notes_inserted_total: self.notes_inserted_total(),
            notes_updated_total: self.notes_updated_total(),
            notes_deleted_total: self.notes_deleted_total(),
            notes_published_total: self.notes_published_total(),
            cycle_duration_avg_ms: self.cycle_duration_avg_ms(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub cycles_total: u64,
    pub load_failures_total: u64,
    pub notes_inserted_total: u64,
    pub notes_updated_total: u64,
    pub notes_deleted_total: u64,
    pub notes_published_total: u64,
    pub cycle_duration_avg_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn report(inserted: usize, deleted: usize, failed: usize) -> CycleReport {
        CycleReport {
            inserted,
            updated: 0,
            deleted,
            failed_notebooks: failed,
            published: inserted,
        }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = SyncMetrics::new();
        assert_eq!(metrics.cycles_total(), 0);
        assert_eq!(metrics.cycle_duration_avg_ms(), 0.0);
    }

    #[test]
    fn test_record_cycle() {
        let metrics = SyncMetrics::new();
        metrics.record_cycle(&report(3, 1, 0), Duration::from_millis(100));
        metrics.record_cycle(&report(0, 0, 1), Duration::from_millis(200));

        let summary = metrics.summary();
        assert_eq!(summary.cycles_total, 2);
        assert_eq!(summary.notes_inserted_total, 3);
        assert_eq!(summary.notes_deleted_total, 1);
        assert_eq!(summary.notes_published_total, 3);
        assert_eq!(summary.load_failures_total, 1);
        assert_eq!(summary.cycle_duration_avg_ms, 150.0);
    }

    #[test]
    fn test_concurrent_access() {
        let metrics = SyncMetrics::new();
        let metrics1 = metrics.clone();
        let metrics2 = metrics.clone();

        let handle1 = thread::spawn(move || {
            for _ in 0..100 {
                metrics1.record_cycle(&report(1, 0, 0), Duration::from_millis(1));
            }
        });

        let handle2 = thread::spawn(move || {
            for _ in 0..100 {
                metrics2.record_cycle(&report(1, 0, 0), Duration::from_millis(1));
            }
        });

        handle1.join().unwrap();
        handle2.join().unwrap();

        assert_eq!(metrics.cycles_total(), 200);
        assert_eq!(metrics.notes_inserted_total(), 200);
    }
}
