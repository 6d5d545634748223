//! Last locally-confirmed entry per key.
//!
//! Each worker owns a disjoint key set, so the tracker is worker-local and
//! needs no synchronization. An expectation exists only after this
//! process's own successful create or update of the key; it is the
//! reference every later read of that key is checked against.

use bytes::Bytes;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A worker's belief about a key's last-confirmed state.
#[derive(Debug, Clone)]
pub struct Expectation {
    /// Revision returned by the confirming create/update.
    pub revision: u64,

    /// Payload written by the confirming create/update.
    pub payload: Bytes,

    /// When the confirmation was observed.
    pub observed_at: Instant,
}

impl Expectation {
    /// Time since the confirming write.
    pub fn age(&self) -> Duration {
        self.observed_at.elapsed()
    }
}

/// Per-worker map from key to its expectation.
#[derive(Debug, Default)]
pub struct KeyTracker {
    entries: HashMap<String, Expectation>,
}

impl KeyTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally overwrite the expectation for a key.
    pub fn record(&mut self, key: &str, revision: u64, payload: Bytes, now: Instant) {
        self.entries.insert(
            key.to_string(),
            Expectation {
                revision,
                payload,
                observed_at: now,
            },
        );
    }

    /// Look up the expectation for a key, if one has been recorded.
    pub fn lookup(&self, key: &str) -> Option<&Expectation> {
        self.entries.get(key)
    }

    /// Number of keys with a recorded expectation.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no expectations have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
