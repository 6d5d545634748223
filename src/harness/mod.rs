//! Workload execution.
//!
//! The moving parts of the harness:
//! - [`payload`] - Random payload generation
//! - [`counters`] - Global atomic counters shared by all workers
//! - [`cycle`] - One verify-then-update iteration for one key
//! - [`worker`] - Per-bucket provisioning and the unbounded update loop
//! - [`orchestrator`] - Worker spawning, reporting, and shutdown

pub mod counters;
pub mod cycle;
pub mod orchestrator;
pub mod payload;
pub mod worker;
