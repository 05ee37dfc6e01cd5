//! Lock key validation and lock-file naming.
//!
//! Valid keys:
//! - Must be non-empty and at most 200 bytes
//! - Must not contain control characters
//!
//! Keys made only of ASCII alphanumerics, `-`, `_` and `.` map directly to
//! `<key>.lock`; anything else is hex-encoded so the lock file name can
//! never escape the lock directory.

use crate::error::{LockError, Result};

const MAX_KEY_LEN: usize = 200;

/// Validate a lock key, returning `Ok(())` if valid.
///
/// ```
/// use folio_lock::names::validate_lock_key;
///
/// assert!(validate_lock_key("abc123").is_ok());
/// assert!(validate_lock_key("").is_err());
/// ```
pub fn validate_lock_key(key: &str) -> Result<()> {
    let invalid = |reason: &str| LockError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    if key.is_empty() {
        return Err(invalid("lock key must not be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(invalid("lock key is too long"));
    }
    if key.chars().any(char::is_control) {
        return Err(invalid("lock key contains control characters"));
    }
    Ok(())
}

/// The lock-file name for a (valid) key.
pub fn lock_file_name(key: &str) -> String {
    let plain = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.');
    if plain {
        format!("{key}.lock")
    } else {
        format!("x-{}.lock", hex::encode(key.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        assert!(validate_lock_key("abc123").is_ok());
        assert!(validate_lock_key("work/abc123").is_ok());
    }

    #[test]
    fn invalid_keys() {
        assert!(validate_lock_key("").is_err());
        assert!(validate_lock_key("a\nb").is_err());
        assert!(validate_lock_key(&"k".repeat(201)).is_err());
    }

    #[test]
    fn plain_keys_map_directly() {
        assert_eq!(lock_file_name("abc123"), "abc123.lock");
    }

    #[test]
    fn unsafe_keys_are_hex_encoded() {
        assert_eq!(lock_file_name("../x"), "x-2e2e2f78.lock");
        assert_eq!(lock_file_name(".hidden"), "x-2e68696464656e.lock");
        assert!(!lock_file_name("work/abc").contains('/'));
    }
}
