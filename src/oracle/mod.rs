//! Per-key verification state.
//!
//! The oracle side of the harness: what this process believes about each
//! key it owns, and the classification of observed store state against
//! that belief.
//! - [`tracker`] - Last locally-confirmed entry per key
//! - [`anomaly`] - Anomaly kinds, severity, and pure classification

pub mod anomaly;
pub mod tracker;
