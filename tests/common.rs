//! Common test utilities.
//!
//! Shared helpers for integration tests: a harness configuration tuned for
//! deterministic bounded runs, and a fault-injecting store wrapper that
//! scripts read and update behavior on top of the consistent in-memory
//! store. Import with `mod common;` in test files.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use vigil::core::config::{Config, DurabilityMode, KeySelection};
use vigil::core::error::{StoreError, StoreResult};
use vigil::store::memory::MemoryStore;
use vigil::store::{BucketHandle, BucketSpec, Entry, StoreClient};

/// Configuration for bounded, delay-free, single-threaded-friendly runs.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.workload.bucket_prefix = "test".to_string();
    config.workload.workers = 1;
    config.workload.keys_per_worker = 1;
    config.workload.payload_size = 16;
    config.workload.key_selection = KeySelection::Sequential;
    config.workload.delay_min_ms = 0;
    config.workload.delay_max_ms = 0;
    config.verify.probe_reads = 0;
    config
}

/// A bucket spec for direct store calls in tests.
pub fn bucket_spec(name: &str) -> BucketSpec {
    BucketSpec {
        name: name.to_string(),
        replication_factor: 1,
        durability: DurabilityMode::Memory,
    }
}

/// An entry literal for classification tests.
pub fn entry(revision: u64, payload: &[u8]) -> Entry {
    Entry {
        payload: Bytes::copy_from_slice(payload),
        revision,
        created_at: SystemTime::now(),
    }
}

/// Scripted behavior for one `get` call.
#[derive(Debug, Clone)]
pub enum ReadFault {
    /// Report the key as absent.
    NotFound,
    /// Fail with a transient error.
    Transient,
    /// Return this entry instead of the stored one.
    Entry(Entry),
}

/// Scripted behavior for one `update_if_revision` call.
#[derive(Debug, Clone)]
pub enum UpdateFault {
    /// Reject with a revision conflict.
    Conflict,
    /// Fail with a transient error.
    Transient,
}

/// Bucket wrapper that consumes scripted faults before delegating.
///
/// Faults are queued per operation and consumed one per call; an empty
/// queue passes through to the wrapped bucket. `conflict_on_every_update`
/// is sticky and overrides the update queue.
pub struct FaultBucket {
    inner: Arc<dyn BucketHandle>,
    reads: Mutex<VecDeque<ReadFault>>,
    updates: Mutex<VecDeque<UpdateFault>>,
    conflict_updates: AtomicBool,
}

impl FaultBucket {
    pub fn new(inner: Arc<dyn BucketHandle>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reads: Mutex::new(VecDeque::new()),
            updates: Mutex::new(VecDeque::new()),
            conflict_updates: AtomicBool::new(false),
        })
    }

    /// Queue a fault for the next unscripted `get`.
    pub fn script_read(&self, fault: ReadFault) {
        self.reads.lock().push_back(fault);
    }

    /// Queue a fault for the next unscripted update.
    pub fn script_update(&self, fault: UpdateFault) {
        self.updates.lock().push_back(fault);
    }

    /// Reject every update from now on with a revision conflict.
    pub fn conflict_on_every_update(&self) {
        self.conflict_updates.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl BucketHandle for FaultBucket {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn create(&self, key: &str, payload: Bytes) -> StoreResult<u64> {
        self.inner.create(key, payload).await
    }

    async fn get(&self, key: &str) -> StoreResult<Entry> {
        let fault = self.reads.lock().pop_front();
        match fault {
            None => self.inner.get(key).await,
            Some(ReadFault::NotFound) => Err(StoreError::KeyNotFound),
            Some(ReadFault::Transient) => Err(StoreError::transient("injected read fault")),
            Some(ReadFault::Entry(entry)) => Ok(entry),
        }
    }

    async fn update_if_revision(
        &self,
        key: &str,
        payload: Bytes,
        expected_revision: u64,
    ) -> StoreResult<u64> {
        if self.conflict_updates.load(Ordering::Relaxed) {
            let current = match self.inner.get(key).await {
                Ok(entry) => entry.revision,
                Err(_) => expected_revision,
            };
            return Err(StoreError::RevisionConflict {
                expected: expected_revision,
                current,
            });
        }
        let fault = self.updates.lock().pop_front();
        match fault {
            None => {
                self.inner
                    .update_if_revision(key, payload, expected_revision)
                    .await
            }
            Some(UpdateFault::Conflict) => {
                let current = match self.inner.get(key).await {
                    Ok(entry) => entry.revision,
                    Err(_) => expected_revision,
                };
                Err(StoreError::RevisionConflict {
                    expected: expected_revision,
                    current,
                })
            }
            Some(UpdateFault::Transient) => Err(StoreError::transient("injected update fault")),
        }
    }
}

/// Store wrapper handing out [`FaultBucket`]s over a real memory store.
#[derive(Default)]
pub struct FaultStore {
    inner: MemoryStore,
    buckets: Mutex<HashMap<String, Arc<FaultBucket>>>,
    fail_bucket_creation: AtomicBool,
}

impl FaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fault wrapper for a bucket, once created or opened through
    /// this store.
    pub fn bucket(&self, name: &str) -> Option<Arc<FaultBucket>> {
        self.buckets.lock().get(name).cloned()
    }

    /// Fail every bucket creation with a transient error.
    pub fn fail_bucket_creation(&self) {
        self.fail_bucket_creation.store(true, Ordering::Relaxed);
    }

    fn wrap(&self, name: &str, inner: Arc<dyn BucketHandle>) -> Arc<FaultBucket> {
        let mut buckets = self.buckets.lock();
        if let Some(existing) = buckets.get(name) {
            return Arc::clone(existing);
        }
        let wrapped = FaultBucket::new(inner);
        buckets.insert(name.to_string(), Arc::clone(&wrapped));
        wrapped
    }
}

#[async_trait]
impl StoreClient for FaultStore {
    async fn bucket_names(&self) -> StoreResult<HashSet<String>> {
        self.inner.bucket_names().await
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> StoreResult<Arc<dyn BucketHandle>> {
        if self.fail_bucket_creation.load(Ordering::Relaxed) {
            return Err(StoreError::transient("injected bucket creation fault"));
        }
        let inner = self.inner.create_bucket(spec).await?;
        let wrapped: Arc<dyn BucketHandle> = self.wrap(&spec.name, inner);
        Ok(wrapped)
    }

    async fn open_bucket(&self, name: &str) -> StoreResult<Arc<dyn BucketHandle>> {
        let inner = self.inner.open_bucket(name).await?;
        let wrapped: Arc<dyn BucketHandle> = self.wrap(name, inner);
        Ok(wrapped)
    }
}
