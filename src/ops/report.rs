//! Periodic summary reporting.
//!
//! One line per interval with the cumulative counters and elapsed
//! wall-clock time. Anomaly detail lives in the per-record events emitted
//! at classification time; this is the heartbeat.

use crate::harness::counters::CountersSnapshot;
use std::time::{Duration, Instant};

/// Emits the periodic summary line.
pub struct Reporter {
    started: Instant,
}

impl Reporter {
    /// Create a reporter; elapsed time counts from here.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Emit one summary line for the given snapshot.
    pub fn emit(&self, snapshot: &CountersSnapshot) {
        tracing::info!(
            updates = snapshot.updates,
            errors = snapshot.errors,
            violations = snapshot.violations(),
            data_loss = snapshot.data_loss,
            keys_lost = snapshot.keys_lost,
            regressions = snapshot.regressions,
            mismatches = snapshot.mismatches,
            conflicts = snapshot.conflicts,
            elapsed = %format_elapsed(self.started.elapsed()),
            "progress"
        );
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a duration as whole seconds, minutes, or hours.
fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes:02}m{seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}
