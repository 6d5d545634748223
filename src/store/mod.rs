//! Store client capability traits.
//!
//! The harness consumes a replicated key-value store through this seam: a
//! client that can enumerate, create, and open named buckets, and a bucket
//! handle that can create, read, and conditionally update keyed entries.
//! Any store with per-key monotone revisions and CAS updates can sit behind
//! these traits; the in-process [`memory`] implementation backs the
//! embedded mode and the test suite.

pub mod memory;

use crate::core::config::DurabilityMode;
use crate::core::error::StoreResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

/// The store's authoritative state for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry payload.
    pub payload: Bytes,

    /// Store-assigned revision. Strictly increases on every successful
    /// write; never reused.
    pub revision: u64,

    /// When the key was first created.
    pub created_at: SystemTime,
}

/// Parameters for bucket creation.
#[derive(Debug, Clone)]
pub struct BucketSpec {
    /// Bucket name.
    pub name: String,

    /// Requested replication factor.
    pub replication_factor: u32,

    /// Requested durability mode.
    pub durability: DurabilityMode,
}

/// A connected store client.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Names of all buckets currently known to the store.
    async fn bucket_names(&self) -> StoreResult<HashSet<String>>;

    /// Create a bucket. Fails with `AlreadyExists` if the name is taken.
    async fn create_bucket(&self, spec: &BucketSpec) -> StoreResult<Arc<dyn BucketHandle>>;

    /// Open an existing bucket. Fails with `BucketNotFound`.
    async fn open_bucket(&self, name: &str) -> StoreResult<Arc<dyn BucketHandle>>;
}

/// A handle to one bucket.
#[async_trait]
pub trait BucketHandle: Send + Sync {
    /// The bucket's name.
    fn name(&self) -> &str;

    /// Create a key with an initial payload, returning its first revision.
    /// Fails with `AlreadyExists` if the key is present.
    async fn create(&self, key: &str, payload: Bytes) -> StoreResult<u64>;

    /// Read the current entry for a key.
    async fn get(&self, key: &str) -> StoreResult<Entry>;

    /// Conditionally update a key: succeeds only when `expected_revision`
    /// matches the store's current revision, returning the new revision.
    async fn update_if_revision(
        &self,
        key: &str,
        payload: Bytes,
        expected_revision: u64,
    ) -> StoreResult<u64>;
}
