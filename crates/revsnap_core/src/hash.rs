//! Content hashing for dedup and storage addressing.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of raw bytes.
///
/// Used both as the global dedup key and as the blob storage address, so the
/// same bytes always map to the same snapshot identity.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
