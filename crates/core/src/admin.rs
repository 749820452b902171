//! Admin maintenance: credential check and input validation.

use crate::error::CoreError;
use crate::hashing::sha256;

// ---------------------------------------------------------------------------
// Shared secret
// ---------------------------------------------------------------------------

/// Check a presented admin credential against the configured secret.
///
/// - no configured secret (or an empty one) -> [`CoreError::Misconfigured`]
/// - missing or different credential -> [`CoreError::Unauthorized`]
///
/// Both sides are hashed before comparison so the comparison time does not
/// depend on the secret's length or on the position of the first mismatch.
pub fn verify_shared_secret(
    configured: Option<&str>,
    presented: Option<&str>,
) -> Result<(), CoreError> {
    let expected = match configured {
        Some(secret) if !secret.is_empty() => secret,
        _ => {
            return Err(CoreError::Misconfigured(
                "Admin secret is not configured".into(),
            ))
        }
    };

    let presented = presented
        .ok_or_else(|| CoreError::Unauthorized("Missing admin credential".into()))?;

    let a = sha256(expected.as_bytes());
    let b = sha256(presented.as_bytes());
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    if diff == 0 {
        Ok(())
    } else {
        Err(CoreError::Unauthorized("Invalid admin credential".into()))
    }
}

// ---------------------------------------------------------------------------
// Retain-newest-N input
// ---------------------------------------------------------------------------

/// Parse the `count` field of a retain-newest-N request.
///
/// Accepts a non-negative JSON integer or a string of ASCII digits. Anything
/// else (missing, negative, fractional, non-numeric) is a validation error.
pub fn parse_retain_count(value: Option<&serde_json::Value>) -> Result<usize, CoreError> {
    let invalid = || CoreError::Validation("count must be a non-negative integer".into());

    match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(invalid),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            s.parse::<usize>().map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}
