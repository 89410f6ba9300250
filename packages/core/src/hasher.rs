// ABOUTME: One-way digest of token secrets used as the storage lookup key
// ABOUTME: SHA-256 rendered as lowercase hex, so raw secrets are never persisted

use sha2::{Digest, Sha256};

/// Hash a composed token secret into its storage key.
///
/// The result is always 64 lowercase hex characters. The same function
/// derives the key at creation and again at validation.
pub fn hash_token(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(digest)
}
