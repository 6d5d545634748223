//! Store error taxonomy.
//!
//! Every store capability call resolves to one of these conditions. The
//! harness distinguishes expected outcomes (a CAS conflict under contention,
//! an idempotent create hitting an existing record) from transient faults
//! and from absence, because they feed different branches of the
//! verification logic.

use thiserror::Error;

/// Error conditions surfaced by a store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named bucket does not exist.
    #[error("bucket {bucket} not found")]
    BucketNotFound { bucket: String },

    /// The key does not exist in the bucket.
    #[error("key not found")]
    KeyNotFound,

    /// The bucket or key already exists.
    ///
    /// Creation is idempotent from the harness's point of view, so
    /// provisioning paths treat this as success.
    #[error("already exists")]
    AlreadyExists,

    /// A conditional update was rejected because the supplied revision no
    /// longer matches the store's current revision for the key.
    #[error("revision conflict: expected {expected}, current {current}")]
    RevisionConflict { expected: u64, current: u64 },

    /// A network or store-side fault that may succeed on a later attempt.
    #[error("transient store error: {message}")]
    Transient { message: String },
}

impl StoreError {
    /// Create a transient error from any displayable cause.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Whether this error means the requested record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound | Self::BucketNotFound { .. })
    }

    /// Whether this error is the idempotent-creation outcome.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists)
    }

    /// Whether this error is a CAS revision conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RevisionConflict { .. })
    }

    /// Whether a later attempt of the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Result type using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
