//! Content hashing helpers.
//!
//! Item files and deployed entity content are compared by hash only; the
//! resolver never fetches file bytes. These helpers exist for the workflows
//! that build entities locally before deploying them.

use sha2::{Digest, Sha256};

/// Compute the SHA256 hash of content, hex encoded.
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash() {
        let hash1 = compute_hash(b"a wearable model");
        let hash2 = compute_hash(b"a wearable model");
        let hash3 = compute_hash(b"another model");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }
}
