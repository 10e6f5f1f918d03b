// ---------------------------------------------------------------------------
// Best-effort repair of a damaged record value
// ---------------------------------------------------------------------------
//
// Repair substitutes documented defaults field by field: a mistyped metadata
// field becomes its default, a missing or malformed module sub-record becomes
// that module's default state, unknown module ids are dropped. It never fails
// on structurally recoverable input; the only unrecoverable case is input
// that is not a JSON object at all. The checksum is regenerated over the
// repaired data, so a repaired record always verifies.

use serde_json::{Map, Value};
use tracing::warn;

use crate::checksum;
use crate::codec::CODECS;
use crate::error::SaveError;
use crate::record::{
    now_iso, SaveMetadata, CURRENT_FORMAT_VERSION, KEY_CHECKSUM, KEY_CREATED_AT,
    KEY_FORMAT_VERSION, KEY_METADATA, KEY_MODULE_STATES,
};
use crate::validator;

/// Outcome of a successful repair.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The repaired record value, checksum already regenerated.
    pub record: Value,
    /// Paths that received default substitutions. Empty when the input was
    /// already valid.
    pub substituted: Vec<String>,
}

/// Repair a record value, substituting defaults for whatever is missing or
/// fails its type check.
pub fn repair(input: Value) -> Result<RepairOutcome, SaveError> {
    let Value::Object(mut map) = input else {
        return Err(SaveError::Corruption(
            "record is not a JSON object; repair cannot help".to_string(),
        ));
    };

    let mut substituted = Vec::new();

    if map.get(KEY_FORMAT_VERSION).and_then(Value::as_u64).is_none() {
        map.insert(
            KEY_FORMAT_VERSION.to_string(),
            Value::from(CURRENT_FORMAT_VERSION),
        );
        substituted.push(KEY_FORMAT_VERSION.to_string());
    }

    if !map.get(KEY_CREATED_AT).map(Value::is_string).unwrap_or(false) {
        map.insert(KEY_CREATED_AT.to_string(), Value::String(now_iso()));
        substituted.push(KEY_CREATED_AT.to_string());
    }

    repair_metadata(&mut map, &mut substituted);
    repair_module_states(&mut map, &mut substituted);

    if !substituted.is_empty() {
        warn!(
            substitutions = substituted.len(),
            "repaired record with default substitutions: {}",
            substituted.join(", ")
        );
    }

    // Regenerate the checksum over the repaired data.
    let mut record = Value::Object(map);
    let digest = checksum::generate(&record)?;
    record[KEY_CHECKSUM] = Value::String(digest);

    Ok(RepairOutcome {
        record,
        substituted,
    })
}

fn repair_metadata(map: &mut Map<String, Value>, substituted: &mut Vec<String>) {
    let defaults = SaveMetadata {
        saved_at: now_iso(),
        ..SaveMetadata::default()
    };
    let default_value = match serde_json::to_value(&defaults) {
        Ok(Value::Object(m)) => m,
        // SaveMetadata always encodes as an object; fall back to empty.
        _ => Map::new(),
    };

    if !matches!(map.get(KEY_METADATA), Some(Value::Object(_))) {
        map.insert(KEY_METADATA.to_string(), Value::Object(default_value));
        substituted.push(KEY_METADATA.to_string());
        return;
    }
    let Some(Value::Object(metadata)) = map.get_mut(KEY_METADATA) else {
        return;
    };

    for (key, default) in &default_value {
        let ok = match metadata.get(key) {
            Some(value) => match default {
                Value::Number(_) => value.as_u64().is_some(),
                Value::String(_) => value.is_string(),
                Value::Bool(_) => value.is_boolean(),
                _ => true,
            },
            None => false,
        };
        if !ok {
            metadata.insert(key.clone(), default.clone());
            substituted.push(format!("{KEY_METADATA}.{key}"));
        }
    }
}

fn repair_module_states(map: &mut Map<String, Value>, substituted: &mut Vec<String>) {
    if !matches!(map.get(KEY_MODULE_STATES), Some(Value::Object(_))) {
        map.insert(KEY_MODULE_STATES.to_string(), Value::Object(Map::new()));
        substituted.push(KEY_MODULE_STATES.to_string());
    }
    let Some(Value::Object(states)) = map.get_mut(KEY_MODULE_STATES) else {
        return;
    };

    // Drop sub-records for module ids outside the closed set.
    let unknown: Vec<String> = states
        .keys()
        .filter(|id| CODECS.iter().all(|c| c.id != id.as_str()))
        .cloned()
        .collect();
    for id in unknown {
        states.remove(&id);
        substituted.push(format!("{KEY_MODULE_STATES}.{id} (dropped)"));
    }

    // Substitute defaults for missing or schema-violating sub-records.
    for codec in &CODECS {
        let needs_default = match states.get(codec.id) {
            Some(state) => !validator::module_errors(codec.id, state).is_empty(),
            None => true,
        };
        if needs_default {
            states.insert(codec.id.to_string(), (codec.default_state)());
            substituted.push(format!("{KEY_MODULE_STATES}.{}", codec.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer;
    use crate::validator::validate_record;
    use simulation::SimulationModules;

    fn valid_record_value() -> Value {
        let modules = SimulationModules::sample_settlement();
        let record = serializer::serialize(&modules).expect("serialize");
        record.to_value().expect("to_value")
    }

    #[test]
    fn test_non_object_input_is_unrecoverable() {
        assert!(matches!(
            repair(Value::Array(vec![])),
            Err(SaveError::Corruption(_))
        ));
        assert!(matches!(
            repair(Value::String("junk".into())),
            Err(SaveError::Corruption(_))
        ));
    }

    #[test]
    fn test_empty_object_repairs_to_valid_record() {
        let outcome = repair(serde_json::json!({})).expect("repair");
        let report = validate_record(&outcome.record);
        assert!(report.is_valid(), "violations: {:?}", report.errors);
        assert!(!outcome.substituted.is_empty());
    }

    #[test]
    fn test_valid_record_unchanged_except_checksum() {
        let value = valid_record_value();
        let outcome = repair(value.clone()).expect("repair");
        assert!(outcome.substituted.is_empty());

        // Everything except the regenerated checksum must be untouched.
        let mut repaired = outcome.record.clone();
        repaired
            .as_object_mut()
            .expect("object")
            .remove(KEY_CHECKSUM);
        assert_eq!(repaired, value);
    }

    #[test]
    fn test_mistyped_tick_gets_default() {
        let mut value = valid_record_value();
        value["metadata"]["simulationTick"] = serde_json::json!("oops");

        let outcome = repair(value).expect("repair");
        assert_eq!(
            outcome.record["metadata"]["simulationTick"],
            serde_json::json!(0)
        );
        assert!(outcome
            .substituted
            .iter()
            .any(|p| p == "metadata.simulationTick"));
        // Untouched metadata fields survive.
        assert_eq!(
            outcome.record["metadata"]["slotName"],
            valid_record_value()["metadata"]["slotName"]
        );
    }

    #[test]
    fn test_damaged_module_replaced_with_default() {
        let mut value = valid_record_value();
        value["moduleStates"]["buildings"] = serde_json::json!("not an object");

        let outcome = repair(value).expect("repair");
        assert_eq!(
            outcome.record["moduleStates"]["buildings"]["buildings"],
            serde_json::json!([])
        );
    }

    #[test]
    fn test_unknown_module_dropped() {
        let mut value = valid_record_value();
        value["moduleStates"]["weather"] = serde_json::json!({ "rain": true });

        let outcome = repair(value).expect("repair");
        assert!(outcome.record["moduleStates"].get("weather").is_none());
        let report = validate_record(&outcome.record);
        assert!(report.is_valid(), "violations: {:?}", report.errors);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut value = valid_record_value();
        value["metadata"]["playtimeSeconds"] = serde_json::json!(-1);
        value["moduleStates"]["territory"]["radius"] = serde_json::json!(0);

        let once = repair(value).expect("first repair");
        let twice = repair(once.record.clone()).expect("second repair");

        assert!(twice.substituted.is_empty());
        assert_eq!(once.record, twice.record);
        assert!(validate_record(&twice.record).is_valid());
    }

    #[test]
    fn test_repaired_record_verifies() {
        let mut value = valid_record_value();
        value["metadata"]["simulationTick"] = serde_json::json!("oops");

        let outcome = repair(value).expect("repair");
        assert_eq!(
            checksum::verify(&outcome.record).expect("verify"),
            checksum::Verification::Match
        );
    }
}
