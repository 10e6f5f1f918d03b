// ---------------------------------------------------------------------------
// Integrity checksum over the covered subset of a record
// ---------------------------------------------------------------------------
//
// The digest is SHA-256 over a canonical JSON rendering of the format
// version, the metadata block, and the checksum-covered module states
// (see `record::CHECKSUM_MODULES`). serde_json keeps object keys sorted,
// so serializing the rebuilt subset is already canonical.
//
// A record without a checksum field is "unverifiable, assume valid": records
// written before the field existed must still load, at the cost of no tamper
// detection for them.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::SaveError;
use crate::record::{CHECKSUM_MODULES, KEY_CHECKSUM, KEY_FORMAT_VERSION, KEY_METADATA, KEY_MODULE_STATES};

/// Outcome of verifying a record's stored checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Stored and recomputed checksums match.
    Match,
    /// They differ; the record is suspect and should be routed to repair.
    Mismatch { stored: String, computed: String },
    /// The record carries no checksum. Assume valid.
    Absent,
}

/// Rebuild the covered field subset of a record value.
fn covered_subset(record: &Value) -> Value {
    let mut subset = Map::new();
    if let Some(version) = record.get(KEY_FORMAT_VERSION) {
        subset.insert(KEY_FORMAT_VERSION.to_string(), version.clone());
    }
    if let Some(metadata) = record.get(KEY_METADATA) {
        subset.insert(KEY_METADATA.to_string(), metadata.clone());
    }
    let mut modules = Map::new();
    if let Some(states) = record.get(KEY_MODULE_STATES) {
        for id in CHECKSUM_MODULES {
            if let Some(state) = states.get(id) {
                modules.insert(id.to_string(), state.clone());
            }
        }
    }
    subset.insert(KEY_MODULE_STATES.to_string(), Value::Object(modules));
    Value::Object(subset)
}

/// Compute the integrity checksum for a record value.
pub fn generate(record: &Value) -> Result<String, SaveError> {
    let canonical = serde_json::to_string(&covered_subset(record))
        .map_err(|e| SaveError::Encode(e.to_string()))?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(hex::encode(digest))
}

/// Recompute the checksum and compare it against the stored one.
pub fn verify(record: &Value) -> Result<Verification, SaveError> {
    let stored = match record.get(KEY_CHECKSUM) {
        None | Some(Value::Null) => return Ok(Verification::Absent),
        Some(Value::String(s)) => s.clone(),
        // A non-string checksum field can never match; treat as mismatch.
        Some(other) => other.to_string(),
    };
    let computed = generate(record)?;
    if stored == computed {
        Ok(Verification::Match)
    } else {
        Ok(Verification::Mismatch { stored, computed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Value {
        serde_json::json!({
            "formatVersion": 2,
            "createdAt": "2026-01-01T00:00:00+00:00",
            "metadata": {
                "simulationTick": 840,
                "progressionTier": "hamlet",
                "isPaused": false,
                "slotName": "s1",
                "description": "",
                "savedAt": "2026-01-01T00:00:00+00:00",
                "playtimeSeconds": 420
            },
            "moduleStates": {
                "grid": { "width": 8, "height": 8, "occupancy": [] },
                "inhabitants": { "roster": [], "nextId": 0, "totalCreated": 0 },
                "storage": { "entries": [{ "resource": "Wood", "amount": 50.0 }], "capacity": 500.0 },
                "morale": { "settlementMorale": 50.0, "modifiers": [] }
            }
        })
    }

    #[test]
    fn test_generate_is_deterministic() {
        let record = sample_record();
        let a = generate(&record).expect("generate");
        let b = generate(&record).expect("generate");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64, "sha-256 hex digest is 64 chars");
    }

    #[test]
    fn test_verify_absent_checksum_assumes_valid() {
        let record = sample_record();
        assert_eq!(verify(&record).expect("verify"), Verification::Absent);
    }

    #[test]
    fn test_verify_match_after_generate() {
        let mut record = sample_record();
        let digest = generate(&record).expect("generate");
        record["integrityChecksum"] = Value::String(digest);
        assert_eq!(verify(&record).expect("verify"), Verification::Match);
    }

    #[test]
    fn test_covered_field_mutation_detected() {
        let mut record = sample_record();
        let digest = generate(&record).expect("generate");
        record["integrityChecksum"] = Value::String(digest);

        record["moduleStates"]["storage"]["entries"][0]["amount"] =
            serde_json::json!(9999.0);

        assert!(matches!(
            verify(&record).expect("verify"),
            Verification::Mismatch { .. }
        ));
    }

    #[test]
    fn test_metadata_mutation_detected() {
        let mut record = sample_record();
        let digest = generate(&record).expect("generate");
        record["integrityChecksum"] = Value::String(digest);

        record["metadata"]["simulationTick"] = serde_json::json!("oops");

        assert!(matches!(
            verify(&record).expect("verify"),
            Verification::Mismatch { .. }
        ));
    }

    #[test]
    fn test_uncovered_field_mutation_not_detected() {
        let mut record = sample_record();
        let digest = generate(&record).expect("generate");
        record["integrityChecksum"] = Value::String(digest);

        // morale is outside the covered subset.
        record["moduleStates"]["morale"]["settlementMorale"] = serde_json::json!(1.0);
        record["createdAt"] = serde_json::json!("1999-01-01T00:00:00+00:00");

        assert_eq!(verify(&record).expect("verify"), Verification::Match);
    }

    #[test]
    fn test_non_string_checksum_is_mismatch() {
        let mut record = sample_record();
        record["integrityChecksum"] = serde_json::json!(12345);
        assert!(matches!(
            verify(&record).expect("verify"),
            Verification::Mismatch { .. }
        ));
    }
}
