//! Shared SHA-256 helper.
//!
//! Used by `admin` for secret comparison and by `canvas` to derive a stable
//! color from the prompt text.

use sha2::{Digest, Sha256};

/// Compute the raw SHA-256 digest of the given bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}
