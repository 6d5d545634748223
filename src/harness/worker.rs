//! Per-bucket worker.
//!
//! Each worker owns one bucket and a fixed key set. Setup provisions both
//! under a bounded retry budget; after that the worker loops update cycles
//! until shutdown (or until a configured cycle bound for self-checks).
//! Setup failure terminates only this worker.

use crate::core::config::{Config, KeySelection};
use crate::core::retry::with_budget;
use crate::harness::counters::Counters;
use crate::harness::cycle::{run_cycle, CycleOptions};
use crate::harness::payload::random_payload;
use crate::oracle::tracker::KeyTracker;
use crate::store::{BucketHandle, BucketSpec, StoreClient};
use anyhow::{Context, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// A worker bound to one bucket.
pub struct Worker {
    index: u32,
    bucket_name: String,
    store: Arc<dyn StoreClient>,
    counters: Arc<Counters>,
    config: Arc<Config>,
}

impl Worker {
    /// Create worker `index`; it will own bucket `{prefix}-{index}`.
    pub fn new(
        index: u32,
        store: Arc<dyn StoreClient>,
        counters: Arc<Counters>,
        config: Arc<Config>,
    ) -> Self {
        let bucket_name = format!("{}-{}", config.workload.bucket_prefix, index);
        Self {
            index,
            bucket_name,
            store,
            counters,
            config,
        }
    }

    /// The bucket this worker owns.
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Provision the bucket and keys, then run update cycles until
    /// shutdown. Returns an error only on setup exhaustion.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let bucket = self.provision_bucket().await?;
        let mut tracker = KeyTracker::new();
        self.provision_keys(bucket.as_ref(), &mut tracker).await?;

        let keys: Vec<String> = (0..self.config.workload.keys_per_worker)
            .map(|i| format!("key-{i}"))
            .collect();
        let opts = CycleOptions {
            tolerance: self.config.verify.revision_tolerance,
            probe_reads: self.config.verify.probe_reads,
            payload_size: self.config.workload.payload_size,
        };
        tracing::info!(
            worker = self.index,
            bucket = %self.bucket_name,
            keys = keys.len(),
            "worker running"
        );

        let mut cycles: u64 = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }
            if let Some(max) = self.config.workload.max_cycles {
                if cycles >= max {
                    break;
                }
            }

            let key = match self.config.workload.key_selection {
                KeySelection::Random => {
                    let pick = rand::thread_rng().gen_range(0..keys.len());
                    &keys[pick]
                }
                KeySelection::Sequential => &keys[cycles as usize % keys.len()],
            };

            let report = run_cycle(bucket.as_ref(), key, &mut tracker, &opts).await;
            if report.succeeded() {
                self.counters.record_update();
            } else {
                self.counters.record_error();
            }
            for found in &report.anomalies {
                self.counters.record_anomaly(found.anomaly.kind());
            }
            cycles += 1;

            if self.pause(&mut shutdown).await {
                break;
            }
        }

        tracing::info!(worker = self.index, bucket = %self.bucket_name, cycles, "worker stopped");
        Ok(())
    }

    /// Open the worker's bucket, creating it if the store does not know it
    /// yet. AlreadyExists from a racing creator is resolved by opening.
    async fn provision_bucket(&self) -> Result<Arc<dyn BucketHandle>> {
        let existing = match self.store.bucket_names().await {
            Ok(names) => names,
            Err(error) => {
                tracing::warn!(error = %error, "could not list buckets");
                Default::default()
            }
        };
        if existing.contains(&self.bucket_name) {
            let bucket = self
                .store
                .open_bucket(&self.bucket_name)
                .await
                .with_context(|| format!("failed to open bucket {}", self.bucket_name))?;
            return Ok(bucket);
        }

        tracing::info!(bucket = %self.bucket_name, "creating bucket");
        let spec = BucketSpec {
            name: self.bucket_name.clone(),
            replication_factor: self.config.store.replication_factor,
            durability: self.config.store.durability,
        };
        let this = self;
        let bucket = with_budget(self.config.workload.creation_retries, || {
            let spec = spec.clone();
            async move {
                match this.store.create_bucket(&spec).await {
                    Ok(bucket) => Ok(bucket),
                    Err(error) if error.is_already_exists() => {
                        this.store.open_bucket(&this.bucket_name).await
                    }
                    Err(error) => Err(error),
                }
            }
        })
        .await
        .with_context(|| format!("could not provision bucket {}", self.bucket_name))?;
        Ok(bucket)
    }

    /// Create the worker's key set with initial random payloads. A fresh
    /// create seeds the tracker; a pre-existing key does not (nothing has
    /// been confirmed by this process yet).
    async fn provision_keys(
        &self,
        bucket: &dyn BucketHandle,
        tracker: &mut KeyTracker,
    ) -> Result<()> {
        for i in 0..self.config.workload.keys_per_worker {
            let key = format!("key-{i}");
            let payload = random_payload(self.config.workload.payload_size);
            let created = with_budget(self.config.workload.creation_retries, || {
                let key = key.clone();
                let payload = payload.clone();
                async move {
                    match bucket.create(&key, payload).await {
                        Ok(revision) => Ok(Some(revision)),
                        Err(error) if error.is_already_exists() => Ok(None),
                        Err(error) => Err(error),
                    }
                }
            })
            .await
            .with_context(|| {
                format!("could not create key {key} in bucket {}", self.bucket_name)
            })?;

            if let Some(revision) = created {
                tracker.record(&key, revision, payload, Instant::now());
            }
        }
        Ok(())
    }

    /// Inter-iteration pacing. Returns true when shutdown arrived during
    /// the pause.
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let (min, max) = (
            self.config.workload.delay_min_ms,
            self.config.workload.delay_max_ms,
        );
        if max == 0 {
            // No pacing configured; still give the runtime a scheduling
            // point so an undelayed loop cannot monopolize its thread.
            tokio::task::yield_now().await;
            return false;
        }
        let delay = Duration::from_millis(rand::thread_rng().gen_range(min..=max));
        tokio::select! {
            _ = tokio::time::sleep(delay) => false,
            _ = shutdown.changed() => true,
        }
    }
}
