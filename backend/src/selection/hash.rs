//! Stable 64-bit hashing
//!
//! The only source of "randomness" in the engine. A hash depends on nothing
//! but its inputs, so it is identical across runs, platforms, and thread
//! schedules.
//!
//! CRITICAL: Do not swap in `std::hash` or any randomly keyed hasher here.

use sha2::{Digest, Sha256};

/// Separates id from salt so `("ab", "c")` and `("a", "bc")` differ.
const FIELD_SEPARATOR: u8 = 0x1F;

/// First 8 bytes (big-endian) of `SHA-256(id ‖ 0x1F ‖ salt)`
///
/// # Example
/// ```
/// use workforce_transition_core_rs::selection::stable_hash;
///
/// assert_eq!(stable_hash("EMP_1", "salt"), stable_hash("EMP_1", "salt"));
/// assert_ne!(stable_hash("EMP_1", "salt"), stable_hash("EMP_1", "other"));
/// ```
pub fn stable_hash(id: &str, salt: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        assert_ne!(stable_hash("ab", "c"), stable_hash("a", "bc"));
    }

    #[test]
    fn test_hash_is_repeatable() {
        let first = stable_hash("EMP_000001", "experienced_termination");
        let second = stable_hash("EMP_000001", "experienced_termination");
        assert_eq!(first, second);
        assert_ne!(first, 0);
    }
}
