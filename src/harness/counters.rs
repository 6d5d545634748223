//! Global harness counters.
//!
//! The only mutable state shared across workers. Updates are independent
//! increments with no cross-field invariant, so plain relaxed atomics are
//! enough; the reporter reads a snapshot periodically.

use crate::oracle::anomaly::AnomalyKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters, incremented from any worker.
#[derive(Debug, Default)]
pub struct Counters {
    updates: AtomicU64,
    errors: AtomicU64,
    data_loss: AtomicU64,
    keys_lost: AtomicU64,
    regressions: AtomicU64,
    mismatches: AtomicU64,
    conflicts: AtomicU64,
}

impl Counters {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one successful update cycle.
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one failed cycle.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one detected anomaly by kind.
    pub fn record_anomaly(&self, kind: AnomalyKind) {
        let counter = match kind {
            AnomalyKind::DataLoss => &self.data_loss,
            AnomalyKind::KeyNotFound => &self.keys_lost,
            AnomalyKind::RevisionRegression => &self.regressions,
            AnomalyKind::RevisionMismatch => &self.mismatches,
            AnomalyKind::UpdateConflict => &self.conflicts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters at once.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            updates: self.updates.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            data_loss: self.data_loss.load(Ordering::Relaxed),
            keys_lost: self.keys_lost.load(Ordering::Relaxed),
            regressions: self.regressions.load(Ordering::Relaxed),
            mismatches: self.mismatches.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    /// Successful update cycles.
    pub updates: u64,
    /// Failed cycles (transient faults and CAS conflicts).
    pub errors: u64,
    /// DataLoss anomalies.
    pub data_loss: u64,
    /// KeyNotFound anomalies.
    pub keys_lost: u64,
    /// RevisionRegression anomalies.
    pub regressions: u64,
    /// RevisionMismatch anomalies.
    pub mismatches: u64,
    /// UpdateConflict anomalies.
    pub conflicts: u64,
}

impl CountersSnapshot {
    /// Total contract violations: everything except expected CAS contention.
    pub fn violations(&self) -> u64 {
        self.data_loss + self.keys_lost + self.regressions + self.mismatches
    }
}
