//! Random payload generation.

use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generate a fresh random alphanumeric payload of `size` bytes.
///
/// Alphanumeric keeps payloads printable, so anomaly logs can quote both
/// sides of a corrupted entry directly.
pub fn random_payload(size: usize) -> Bytes {
    let bytes: Vec<u8> = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(size)
        .collect();
    Bytes::from(bytes)
}
