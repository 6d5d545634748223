//! Worker spawning, reporting, and shutdown.
//!
//! The orchestrator spawns one independent task per worker and then owns
//! the main loop: periodic summary emission, worker-exit logging, and
//! graceful shutdown on SIGINT. Workers share nothing but the counters;
//! a worker that dies is reported and deliberately not restarted, so a
//! persistent infrastructure failure stays visible.

use crate::core::config::Config;
use crate::harness::counters::Counters;
use crate::harness::worker::Worker;
use crate::ops::report::Reporter;
use crate::store::StoreClient;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};

/// How long workers get to notice shutdown before being aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Owns the worker fleet and the report loop.
pub struct Orchestrator {
    store: Arc<dyn StoreClient>,
    config: Arc<Config>,
    counters: Arc<Counters>,
}

impl Orchestrator {
    /// Create an orchestrator over the given store.
    pub fn new(store: Arc<dyn StoreClient>, config: Arc<Config>) -> Self {
        Self {
            store,
            config,
            counters: Arc::new(Counters::new()),
        }
    }

    /// Shared counter handle (read by the reporter and by tests).
    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    /// Spawn all workers and run until SIGINT or until every worker has
    /// finished (bounded runs).
    pub async fn run(&self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut workers: JoinSet<(u32, Result<()>)> = JoinSet::new();

        for index in 0..self.config.workload.workers {
            let worker = Worker::new(
                index,
                Arc::clone(&self.store),
                Arc::clone(&self.counters),
                Arc::clone(&self.config),
            );
            let shutdown = shutdown_rx.clone();
            workers.spawn(async move { (index, worker.run(shutdown).await) });
        }
        drop(shutdown_rx);

        tracing::info!(
            workers = self.config.workload.workers,
            keys_per_worker = self.config.workload.keys_per_worker,
            bucket_prefix = %self.config.workload.bucket_prefix,
            "harness started"
        );

        let reporter = Reporter::new();
        let mut interval = tokio::time::interval(self.config.report_interval());
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("shutdown signal received (SIGINT)");
                    break;
                }
                _ = interval.tick() => {
                    reporter.emit(&self.counters.snapshot());
                }
                joined = workers.join_next() => match joined {
                    Some(joined) => log_worker_exit(joined),
                    None => {
                        tracing::info!("all workers finished");
                        break;
                    }
                }
            }
        }

        let _ = shutdown_tx.send(true);
        loop {
            match tokio::time::timeout(SHUTDOWN_GRACE, workers.join_next()).await {
                Ok(Some(joined)) => log_worker_exit(joined),
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!("workers did not stop in time; aborting");
                    workers.abort_all();
                }
            }
        }

        reporter.emit(&self.counters.snapshot());
        Ok(())
    }
}

fn log_worker_exit(joined: Result<(u32, Result<()>), JoinError>) {
    match joined {
        Ok((index, Ok(()))) => tracing::info!(worker = index, "worker finished"),
        Ok((index, Err(error))) => {
            tracing::error!(worker = index, error = %error, "worker terminated")
        }
        Err(error) if error.is_cancelled() => tracing::debug!("worker task cancelled"),
        Err(error) => tracing::error!(error = %error, "worker task panicked"),
    }
}
