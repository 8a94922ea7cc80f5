//! Content hashing for invalidation keys.

use sha2::{Digest, Sha256};

/// SHA-256 of `text`.
///
/// Returns a 64-character lowercase hexadecimal string.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
