//! Anomaly kinds, severity, and classification.
//!
//! Classification is pure: given the tracked expectation, the observed
//! entry, and the probe history, decide whether the store broke its
//! contract. The hard part is telling genuine violations apart from benign
//! replica lag and from expected CAS contention, so every check is gated
//! on the configurable revision tolerance.

use crate::oracle::tracker::Expectation;
use crate::store::Entry;
use bytes::Bytes;
use std::time::Duration;

/// How serious a detected anomaly is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Expected under concurrent writers; only a problem if persistent.
    Informational,
    /// May indicate lost updates or non-linearizable reads.
    Warning,
    /// Direct contract violation.
    Critical,
}

/// Anomaly classification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    /// Consecutive probe reads showed a revision drop beyond tolerance.
    RevisionRegression,
    /// Tracked and observed revisions diverge beyond tolerance.
    RevisionMismatch,
    /// Equal revision, unequal payload.
    DataLoss,
    /// A key this process created is reported absent.
    KeyNotFound,
    /// CAS update rejected on revision mismatch.
    UpdateConflict,
}

impl AnomalyKind {
    /// All kinds, in severity-reporting order.
    pub const ALL: [AnomalyKind; 5] = [
        AnomalyKind::DataLoss,
        AnomalyKind::KeyNotFound,
        AnomalyKind::RevisionRegression,
        AnomalyKind::RevisionMismatch,
        AnomalyKind::UpdateConflict,
    ];

    /// Stable name used in log fields and report lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RevisionRegression => "revision_regression",
            Self::RevisionMismatch => "revision_mismatch",
            Self::DataLoss => "data_loss",
            Self::KeyNotFound => "key_not_found",
            Self::UpdateConflict => "update_conflict",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected discrepancy, carrying the conflicting snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// A later probe read returned a revision more than `tolerance` below
    /// an earlier one within the same iteration.
    RevisionRegression {
        /// Revision from the earlier probe read.
        from: u64,
        /// Revision from the later probe read.
        to: u64,
    },

    /// The observed revision diverges from this worker's last confirmed
    /// write by more than the tolerance.
    RevisionMismatch {
        /// Revision this worker last confirmed.
        expected: u64,
        /// Revision the store reported.
        observed: u64,
        /// Whether the payload also differs from the confirmed one.
        payload_differs: bool,
    },

    /// Same revision, different payload: the store silently lost or
    /// altered a write.
    DataLoss {
        /// The stable revision both observations share.
        revision: u64,
        /// Payload this worker confirmed at that revision.
        expected: Bytes,
        /// Payload the store returned at that revision.
        observed: Bytes,
    },

    /// A key created by this process is gone.
    KeyNotFound,

    /// The store rejected a CAS update because the revision moved.
    UpdateConflict {
        /// Revision the update was conditioned on.
        expected: u64,
        /// Revision the store reported at rejection time, when known.
        current: u64,
    },
}

impl Anomaly {
    /// The classification kind of this anomaly.
    pub fn kind(&self) -> AnomalyKind {
        match self {
            Self::RevisionRegression { .. } => AnomalyKind::RevisionRegression,
            Self::RevisionMismatch { .. } => AnomalyKind::RevisionMismatch,
            Self::DataLoss { .. } => AnomalyKind::DataLoss,
            Self::KeyNotFound => AnomalyKind::KeyNotFound,
            Self::UpdateConflict { .. } => AnomalyKind::UpdateConflict,
        }
    }

    /// Severity policy for this anomaly.
    pub fn severity(&self) -> Severity {
        match self {
            Self::DataLoss { .. } | Self::KeyNotFound => Severity::Critical,
            Self::RevisionRegression { .. } | Self::RevisionMismatch { .. } => Severity::Warning,
            Self::UpdateConflict { .. } => Severity::Informational,
        }
    }
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RevisionRegression { from, to } => {
                write!(f, "probe revision regressed from {from} to {to}")
            }
            Self::RevisionMismatch {
                expected,
                observed,
                payload_differs,
            } => write!(
                f,
                "observed revision {observed}, expected {expected} (payload differs: {payload_differs})"
            ),
            Self::DataLoss {
                revision,
                expected,
                observed,
            } => write!(
                f,
                "revision {revision} returned payload {:?}, expected {:?}",
                String::from_utf8_lossy(observed),
                String::from_utf8_lossy(expected)
            ),
            Self::KeyNotFound => write!(f, "key absent after successful creation"),
            Self::UpdateConflict { expected, current } => {
                write!(f, "update conditioned on revision {expected} rejected at {current}")
            }
        }
    }
}

/// A detected anomaly in context: which bucket and key, and how stale the
/// worker's expectation was when the discrepancy surfaced.
#[derive(Debug, Clone)]
pub struct AnomalyRecord {
    /// Bucket the key lives in.
    pub bucket: String,

    /// The affected key.
    pub key: String,

    /// Age of the worker's expectation, when one existed.
    pub expectation_age: Option<Duration>,

    /// The classified discrepancy.
    pub anomaly: Anomaly,
}

impl AnomalyRecord {
    /// Emit the structured log event for this record.
    ///
    /// Violations are never suppressed: critical kinds log at error,
    /// warnings at warn, and expected-contention kinds at debug.
    pub fn log(&self) {
        let kind = self.anomaly.kind();
        let age_ms = self.expectation_age.map(|age| age.as_millis() as u64);
        match self.anomaly.severity() {
            Severity::Critical => tracing::error!(
                bucket = %self.bucket,
                key = %self.key,
                kind = %kind,
                age_ms,
                detail = %self.anomaly,
                "store contract violation"
            ),
            Severity::Warning => tracing::warn!(
                bucket = %self.bucket,
                key = %self.key,
                kind = %kind,
                age_ms,
                detail = %self.anomaly,
                "store anomaly"
            ),
            Severity::Informational => tracing::debug!(
                bucket = %self.bucket,
                key = %self.key,
                kind = %kind,
                age_ms,
                detail = %self.anomaly,
                "update contention"
            ),
        }
    }
}

/// Check consecutive probe reads for revision regressions.
///
/// A drop of at most `tolerance` between consecutive reads is treated as
/// replica staleness; anything larger is flagged. Forward movement between
/// reads is expected (the probe races other writers) and never flagged.
pub fn check_probe_window(probes: &[Entry], tolerance: u64) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    for pair in probes.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.revision.saturating_sub(next.revision) > tolerance {
            anomalies.push(Anomaly::RevisionRegression {
                from: prev.revision,
                to: next.revision,
            });
        }
    }
    anomalies
}

/// Compare an authoritative read against the worker's expectation.
///
/// With no expectation there is nothing to verify. Otherwise: divergence
/// beyond the tolerance is a revision mismatch, and a byte-for-byte payload
/// difference under a stable revision is data loss.
pub fn check_observation(
    expectation: Option<&Expectation>,
    observed: &Entry,
    tolerance: u64,
) -> Option<Anomaly> {
    let expected = expectation?;
    let drift = observed.revision.abs_diff(expected.revision);
    if drift > tolerance {
        Some(Anomaly::RevisionMismatch {
            expected: expected.revision,
            observed: observed.revision,
            payload_differs: observed.payload != expected.payload,
        })
    } else if observed.revision == expected.revision && observed.payload != expected.payload {
        Some(Anomaly::DataLoss {
            revision: expected.revision,
            expected: expected.payload.clone(),
            observed: observed.payload.clone(),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Instant, SystemTime};

    fn entry(revision: u64, payload: &'static [u8]) -> Entry {
        Entry {
            payload: Bytes::from_static(payload),
            revision,
            created_at: SystemTime::now(),
        }
    }

    fn expectation(revision: u64, payload: &'static [u8]) -> Expectation {
        Expectation {
            revision,
            payload: Bytes::from_static(payload),
            observed_at: Instant::now(),
        }
    }

    #[test]
    fn no_expectation_never_flags() {
        assert!(check_observation(None, &entry(42, b"x"), 2).is_none());
    }

    #[test]
    fn drift_within_tolerance_is_benign() {
        let exp = expectation(10, b"x");
        // Payload comparison only applies at equal revisions.
        assert!(check_observation(Some(&exp), &entry(12, b"y"), 2).is_none());
        assert!(check_observation(Some(&exp), &entry(8, b"y"), 2).is_none());
    }

    #[test]
    fn drift_beyond_tolerance_is_mismatch() {
        let exp = expectation(10, b"x");
        let anomaly = check_observation(Some(&exp), &entry(13, b"y"), 2).unwrap();
        match &anomaly {
            Anomaly::RevisionMismatch {
                expected,
                observed,
                payload_differs,
            } => {
                assert_eq!(*expected, 10);
                assert_eq!(*observed, 13);
                assert!(*payload_differs);
            }
            other => panic!("expected RevisionMismatch, got {other:?}"),
        }
        assert_eq!(anomaly.severity(), Severity::Warning);
    }

    #[test]
    fn equal_revision_unequal_payload_is_data_loss() {
        let exp = expectation(10, b"A");
        let anomaly = check_observation(Some(&exp), &entry(10, b"B"), 2).unwrap();
        match &anomaly {
            Anomaly::DataLoss {
                revision,
                expected,
                observed,
            } => {
                assert_eq!(*revision, 10);
                assert_eq!(expected, &Bytes::from_static(b"A"));
                assert_eq!(observed, &Bytes::from_static(b"B"));
            }
            other => panic!("expected DataLoss, got {other:?}"),
        }
        assert_eq!(anomaly.severity(), Severity::Critical);
    }

    #[test]
    fn matching_observation_is_clean() {
        let exp = expectation(10, b"same");
        assert!(check_observation(Some(&exp), &entry(10, b"same"), 2).is_none());
    }

    #[test]
    fn probe_regression_beyond_tolerance_flagged() {
        let probes = vec![entry(10, b"a"), entry(7, b"b")];
        let anomalies = check_probe_window(&probes, 2);
        assert_eq!(
            anomalies,
            vec![Anomaly::RevisionRegression { from: 10, to: 7 }]
        );
    }

    #[test]
    fn probe_regression_within_tolerance_ignored() {
        let probes = vec![entry(10, b"a"), entry(8, b"b")];
        assert!(check_probe_window(&probes, 2).is_empty());
    }

    #[test]
    fn probe_forward_movement_ignored() {
        let probes = vec![entry(3, b"a"), entry(9, b"b"), entry(30, b"c")];
        assert!(check_probe_window(&probes, 2).is_empty());
    }

    #[test]
    fn short_probe_windows_are_clean() {
        assert!(check_probe_window(&[], 2).is_empty());
        assert!(check_probe_window(&[entry(5, b"a")], 2).is_empty());
    }
}
