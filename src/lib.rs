//! vigil - consistency stress harness for replicated key-value stores.
//!
//! vigil drives a store that advertises per-key monotone revisions and CAS
//! updates with many concurrent read-modify-write loops, and verifies in
//! real time that the store keeps its contract: revisions never regress,
//! a stable revision always carries the same payload, and created keys
//! never vanish. It detects violations; it does not repair them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Orchestrator                            │
//! │        worker spawning │ shared counters │ periodic report      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │  one task per bucket
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Worker                               │
//! │     bucket/key provisioning │ key selection │ update loop       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │  one iteration per pass
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Update Cycle                             │
//! │   stability probe │ read │ classify vs expectation │ CAS write  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Store Client                             │
//! │      bucket/key capabilities │ embedded reference store         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - [`core::config`] - Configuration parsing and validation
//! - [`core::error`] - Store error taxonomy
//! - [`core::retry`] - Bounded retry for provisioning calls
//! - [`store`] - Store capability traits and the in-memory reference store
//! - [`oracle::tracker`] - Last locally-confirmed entry per key
//! - [`oracle::anomaly`] - Anomaly classification and severity policy
//! - [`harness`] - Update cycles, workers, orchestration, counters
//! - [`ops::report`] - Periodic summary reporting
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod core;
pub mod harness;
pub mod ops;
pub mod oracle;
pub mod store;
