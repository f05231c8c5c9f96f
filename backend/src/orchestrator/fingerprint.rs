//! Output fingerprinting
//!
//! Lets a driver assert that two runs over the same inputs produced
//! byte-identical results without storing both.
//!
//! Uses canonical JSON serialization with sorted keys, so the fingerprint
//! does not depend on map iteration order.

use crate::orchestrator::EngineError;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute deterministic SHA256 hash of any serializable value
pub fn compute_fingerprint<T: Serialize>(value: &T) -> Result<String, EngineError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(value)
        .map_err(|e| EngineError::Serialization(format!("Fingerprint serialization failed: {}", e)))?;

    // Recursively sort all object keys for canonical representation
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| EngineError::Serialization(format!("Fingerprint serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
