//! In-process reference store.
//!
//! A fully consistent implementation of the store traits: reads always see
//! the latest write and revisions are assigned from a per-bucket sequence,
//! so they strictly increase and are never reused across keys. The embedded
//! harness mode runs against this store, and the test suite layers fault
//! injection on top of it.

use crate::core::error::{StoreError, StoreResult};
use crate::store::{BucketHandle, BucketSpec, Entry, StoreClient};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;

/// In-memory store client.
#[derive(Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, Arc<MemoryBucket>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn bucket_names(&self) -> StoreResult<HashSet<String>> {
        Ok(self.buckets.lock().keys().cloned().collect())
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> StoreResult<Arc<dyn BucketHandle>> {
        let mut buckets = self.buckets.lock();
        if buckets.contains_key(&spec.name) {
            return Err(StoreError::AlreadyExists);
        }
        let bucket = Arc::new(MemoryBucket::new(spec.clone()));
        buckets.insert(spec.name.clone(), Arc::clone(&bucket));
        Ok(bucket as Arc<dyn BucketHandle>)
    }

    async fn open_bucket(&self, name: &str) -> StoreResult<Arc<dyn BucketHandle>> {
        let buckets = self.buckets.lock();
        match buckets.get(name) {
            Some(bucket) => Ok(Arc::clone(bucket) as Arc<dyn BucketHandle>),
            None => Err(StoreError::BucketNotFound {
                bucket: name.to_string(),
            }),
        }
    }
}

/// One bucket's records plus its revision sequence.
struct BucketState {
    entries: HashMap<String, Entry>,
    next_revision: u64,
}

/// In-memory bucket.
pub struct MemoryBucket {
    spec: BucketSpec,
    state: Mutex<BucketState>,
}

impl MemoryBucket {
    fn new(spec: BucketSpec) -> Self {
        Self {
            spec,
            state: Mutex::new(BucketState {
                entries: HashMap::new(),
                next_revision: 1,
            }),
        }
    }

    /// The spec this bucket was created with.
    pub fn spec(&self) -> &BucketSpec {
        &self.spec
    }
}

#[async_trait]
impl BucketHandle for MemoryBucket {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn create(&self, key: &str, payload: Bytes) -> StoreResult<u64> {
        let mut state = self.state.lock();
        if state.entries.contains_key(key) {
            return Err(StoreError::AlreadyExists);
        }
        let revision = state.next_revision;
        state.next_revision += 1;
        state.entries.insert(
            key.to_string(),
            Entry {
                payload,
                revision,
                created_at: SystemTime::now(),
            },
        );
        Ok(revision)
    }

    async fn get(&self, key: &str) -> StoreResult<Entry> {
        let state = self.state.lock();
        state.entries.get(key).cloned().ok_or(StoreError::KeyNotFound)
    }

    async fn update_if_revision(
        &self,
        key: &str,
        payload: Bytes,
        expected_revision: u64,
    ) -> StoreResult<u64> {
        let mut state = self.state.lock();
        let revision = state.next_revision;
        let entry = state.entries.get_mut(key).ok_or(StoreError::KeyNotFound)?;
        if entry.revision != expected_revision {
            return Err(StoreError::RevisionConflict {
                expected: expected_revision,
                current: entry.revision,
            });
        }
        entry.payload = payload;
        entry.revision = revision;
        state.next_revision = revision + 1;
        Ok(revision)
    }
}
