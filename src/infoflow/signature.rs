//! Handshake signature for the robot callback address verification.
//!
//! The platform proves ownership of a callback address by sending `rn`, `timestamp` and
//! `signature`, where `signature = md5hex(rn + timestamp + token)`.

use md5::{Digest, Md5};

/// Compute the lowercase hex MD5 signature over `rn + timestamp + token`.
pub fn sign(rn: &str, timestamp: &str, token: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(rn.as_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a handshake signature.
///
/// Returns `false` when any input is empty or the signature does not match byte-for-byte.
pub fn verify(rn: &str, timestamp: &str, token: &str, signature: &str) -> bool {
    if rn.is_empty() || timestamp.is_empty() || token.is_empty() || signature.is_empty() {
        return false;
    }

    sign(rn, timestamp, token) == signature
}
