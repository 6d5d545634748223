//! One verify-then-update iteration for one key.
//!
//! A cycle reads the store, checks what it sees against the worker's
//! expectation, then attempts a CAS update conditioned on the observed
//! revision. Exactly one outcome is produced per cycle, success or
//! failure, so counter accounting stays exact; anomalies are reported on
//! the side and never abort the loop.

use crate::core::error::StoreError;
use crate::harness::payload::random_payload;
use crate::oracle::anomaly::{self, Anomaly, AnomalyRecord};
use crate::oracle::tracker::{Expectation, KeyTracker};
use crate::store::BucketHandle;
use std::time::Instant;

/// Knobs for a single cycle, derived from configuration once per worker.
#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    /// Maximum benign revision drift.
    pub tolerance: u64,

    /// Consecutive reads in the stability probe. 0 disables it.
    pub probe_reads: u32,

    /// Payload size for the CAS update.
    pub payload_size: usize,
}

/// What a cycle did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The CAS update landed, producing this revision.
    Updated { revision: u64 },
    /// The read or update failed; the tracker was left untouched.
    Failed,
}

/// Result of one cycle: the outcome plus every anomaly it surfaced.
#[derive(Debug)]
pub struct CycleReport {
    /// Success or failure of the iteration.
    pub outcome: CycleOutcome,

    /// Anomalies detected during the iteration, already logged.
    pub anomalies: Vec<AnomalyRecord>,
}

impl CycleReport {
    /// Whether the cycle's update landed.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Updated { .. })
    }
}

/// Execute one verify-then-update iteration for `key`.
pub async fn run_cycle(
    bucket: &dyn BucketHandle,
    key: &str,
    tracker: &mut KeyTracker,
    opts: &CycleOptions,
) -> CycleReport {
    let mut anomalies = Vec::new();

    // Stability probe: consecutive reads of the same key should not show
    // the revision stepping backward beyond replica lag.
    if opts.probe_reads > 0 {
        let mut window = Vec::with_capacity(opts.probe_reads as usize);
        for _ in 0..opts.probe_reads {
            match bucket.get(key).await {
                Ok(entry) => window.push(entry),
                Err(error) => {
                    tracing::debug!(
                        bucket = %bucket.name(),
                        key,
                        error = %error,
                        "probe read failed"
                    );
                }
            }
        }
        for found in anomaly::check_probe_window(&window, opts.tolerance) {
            record(&mut anomalies, bucket.name(), key, tracker, found);
        }
    }

    // Authoritative read. A missing key is a violation in its own right:
    // every key this worker touches was created by it and never deleted.
    let observed = match bucket.get(key).await {
        Ok(entry) => entry,
        Err(error) => {
            if error.is_not_found() {
                record(&mut anomalies, bucket.name(), key, tracker, Anomaly::KeyNotFound);
            } else {
                tracing::warn!(bucket = %bucket.name(), key, error = %error, "read failed");
            }
            return CycleReport {
                outcome: CycleOutcome::Failed,
                anomalies,
            };
        }
    };

    if let Some(found) = anomaly::check_observation(tracker.lookup(key), &observed, opts.tolerance)
    {
        record(&mut anomalies, bucket.name(), key, tracker, found);
    }

    let payload = random_payload(opts.payload_size);
    match bucket
        .update_if_revision(key, payload.clone(), observed.revision)
        .await
    {
        Ok(revision) => {
            debug_assert!(
                revision > observed.revision,
                "CAS returned non-advancing revision {revision} over {}",
                observed.revision
            );
            tracker.record(key, revision, payload, Instant::now());
            CycleReport {
                outcome: CycleOutcome::Updated { revision },
                anomalies,
            }
        }
        Err(StoreError::RevisionConflict { expected, current }) => {
            record(
                &mut anomalies,
                bucket.name(),
                key,
                tracker,
                Anomaly::UpdateConflict { expected, current },
            );
            CycleReport {
                outcome: CycleOutcome::Failed,
                anomalies,
            }
        }
        Err(error) => {
            tracing::warn!(bucket = %bucket.name(), key, error = %error, "update failed");
            CycleReport {
                outcome: CycleOutcome::Failed,
                anomalies,
            }
        }
    }
}

fn record(
    anomalies: &mut Vec<AnomalyRecord>,
    bucket: &str,
    key: &str,
    tracker: &KeyTracker,
    anomaly: Anomaly,
) {
    let record = AnomalyRecord {
        bucket: bucket.to_string(),
        key: key.to_string(),
        expectation_age: tracker.lookup(key).map(Expectation::age),
        anomaly,
    };
    record.log();
    anomalies.push(record);
}
