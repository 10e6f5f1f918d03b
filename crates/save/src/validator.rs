// ---------------------------------------------------------------------------
// Structural validation of a record value
// ---------------------------------------------------------------------------
//
// Validation runs on raw JSON, not the typed record, so violations the typed
// layer would reject outright (a string where a tick belongs) are still
// reportable field by field. Every violation found is collected; the caller
// decides whether to reject the record or hand it to repair.

use serde_json::{Map, Value};

use crate::record::{
    KEY_CHECKSUM, KEY_CREATED_AT, KEY_FORMAT_VERSION, KEY_METADATA, KEY_MODULE_STATES,
    MODULE_IDS, REQUIRED_MODULES,
};

/// Result of structural validation. Lists every violation found.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a record value against the fixed schema.
pub fn validate_record(record: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    let Some(map) = record.as_object() else {
        return ValidationReport {
            errors: vec!["record is not a JSON object".to_string()],
        };
    };

    check_u64(map, KEY_FORMAT_VERSION, KEY_FORMAT_VERSION, &mut errors);
    check_string(map, KEY_CREATED_AT, KEY_CREATED_AT, &mut errors);

    match map.get(KEY_METADATA).and_then(Value::as_object) {
        Some(metadata) => validate_metadata(metadata, &mut errors),
        None => errors.push(format!("{KEY_METADATA}: expected an object")),
    }

    match map.get(KEY_MODULE_STATES).and_then(Value::as_object) {
        Some(states) => {
            for id in REQUIRED_MODULES {
                if !states.contains_key(id) {
                    errors.push(format!("{KEY_MODULE_STATES}.{id}: required module is missing"));
                }
            }
            for (id, state) in states {
                if !MODULE_IDS.contains(&id.as_str()) {
                    errors.push(format!("{KEY_MODULE_STATES}.{id}: unknown module id"));
                    continue;
                }
                errors.extend(module_errors(id, state));
            }
        }
        None => errors.push(format!("{KEY_MODULE_STATES}: expected an object")),
    }

    if let Some(checksum) = map.get(KEY_CHECKSUM) {
        if !checksum.is_string() && !checksum.is_null() {
            errors.push(format!("{KEY_CHECKSUM}: expected a string"));
        }
    }

    ValidationReport { errors }
}

fn validate_metadata(metadata: &Map<String, Value>, errors: &mut Vec<String>) {
    check_u64(metadata, "simulationTick", "metadata.simulationTick", errors);
    check_string(metadata, "progressionTier", "metadata.progressionTier", errors);
    check_bool(metadata, "isPaused", "metadata.isPaused", errors);
    check_string(metadata, "slotName", "metadata.slotName", errors);
    check_string(metadata, "description", "metadata.description", errors);
    check_string(metadata, "savedAt", "metadata.savedAt", errors);
    check_u64(metadata, "playtimeSeconds", "metadata.playtimeSeconds", errors);
}

/// Schema check for one module's sub-record. Used both by full-record
/// validation and by the repair pass to decide whether a sub-record needs
/// default substitution.
pub(crate) fn module_errors(id: &str, state: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let path = format!("moduleStates.{id}");

    let Some(map) = state.as_object() else {
        return vec![format!("{path}: expected an object")];
    };

    match id {
        "grid" => {
            check_positive_u64(map, "width", &path, &mut errors);
            check_positive_u64(map, "height", &path, &mut errors);
            if let Some(cells) = check_array(map, "occupancy", &path, &mut errors) {
                for (i, cell) in cells.iter().enumerate() {
                    if let Some(cell) = cell.as_object() {
                        check_u64(cell, "x", &format!("{path}.occupancy[{i}].x"), &mut errors);
                        check_u64(cell, "y", &format!("{path}.occupancy[{i}].y"), &mut errors);
                    } else {
                        errors.push(format!("{path}.occupancy[{i}]: expected an object"));
                    }
                }
            }
        }
        "inhabitants" => {
            if let Some(roster) = check_array(map, "roster", &path, &mut errors) {
                for (i, person) in roster.iter().enumerate() {
                    if let Some(person) = person.as_object() {
                        check_u64(person, "id", &format!("{path}.roster[{i}].id"), &mut errors);
                        check_range(
                            person,
                            "health",
                            &format!("{path}.roster[{i}].health"),
                            0.0,
                            100.0,
                            &mut errors,
                        );
                        check_range(
                            person,
                            "morale",
                            &format!("{path}.roster[{i}].morale"),
                            0.0,
                            100.0,
                            &mut errors,
                        );
                    } else {
                        errors.push(format!("{path}.roster[{i}]: expected an object"));
                    }
                }
            }
            check_u64(map, "nextId", &path, &mut errors);
            check_u64(map, "totalCreated", &path, &mut errors);
        }
        "storage" => {
            if let Some(entries) = check_array(map, "entries", &path, &mut errors) {
                for (i, entry) in entries.iter().enumerate() {
                    let amount = entry.get("amount").and_then(Value::as_f64);
                    match amount {
                        Some(a) if a >= 0.0 => {}
                        Some(a) => errors.push(format!(
                            "{path}.entries[{i}].amount: quantity must not be negative, got {a}"
                        )),
                        None => errors.push(format!(
                            "{path}.entries[{i}].amount: expected a number"
                        )),
                    }
                }
            }
            match map.get("capacity").and_then(Value::as_f64) {
                Some(c) if c > 0.0 => {}
                Some(c) => errors.push(format!("{path}.capacity: must be positive, got {c}")),
                None => errors.push(format!("{path}.capacity: expected a number")),
            }
        }
        "territory" => {
            match map.get("radius").and_then(Value::as_u64) {
                Some(r) if r > 0 => {}
                Some(_) => errors.push(format!("{path}.radius: must be greater than zero")),
                None => errors.push(format!("{path}.radius: expected a non-negative integer")),
            }
            check_array(map, "claimed", &path, &mut errors);
        }
        "buildings" => {
            if let Some(buildings) = check_array(map, "buildings", &path, &mut errors) {
                for (i, building) in buildings.iter().enumerate() {
                    if let Some(building) = building.as_object() {
                        check_u64(building, "id", &format!("{path}.buildings[{i}].id"), &mut errors);
                        check_range(
                            building,
                            "health",
                            &format!("{path}.buildings[{i}].health"),
                            0.0,
                            100.0,
                            &mut errors,
                        );
                    } else {
                        errors.push(format!("{path}.buildings[{i}]: expected an object"));
                    }
                }
            }
            check_u64(map, "nextId", &path, &mut errors);
        }
        "progression" => {
            check_string(map, "tier", &format!("{path}.tier"), &mut errors);
            check_array(map, "unlocked", &path, &mut errors);
        }
        "achievements" => {
            check_array(map, "unlocked", &path, &mut errors);
        }
        "events" => {
            if let Some(pending) = check_array(map, "pending", &path, &mut errors) {
                for (i, event) in pending.iter().enumerate() {
                    if let Some(event) = event.as_object() {
                        check_u64(event, "dueTick", &format!("{path}.pending[{i}].dueTick"), &mut errors);
                    } else {
                        errors.push(format!("{path}.pending[{i}]: expected an object"));
                    }
                }
            }
        }
        "assignments" => {
            if let Some(pairs) = check_array(map, "pairs", &path, &mut errors) {
                for (i, pair) in pairs.iter().enumerate() {
                    if let Some(pair) = pair.as_object() {
                        check_u64(pair, "inhabitantId", &format!("{path}.pairs[{i}].inhabitantId"), &mut errors);
                        check_u64(pair, "buildingId", &format!("{path}.pairs[{i}].buildingId"), &mut errors);
                    } else {
                        errors.push(format!("{path}.pairs[{i}]: expected an object"));
                    }
                }
            }
        }
        "production" => {
            if let Some(entries) = check_array(map, "entries", &path, &mut errors) {
                for (i, entry) in entries.iter().enumerate() {
                    if let Some(entry) = entry.as_object() {
                        check_range(
                            entry,
                            "progress",
                            &format!("{path}.entries[{i}].progress"),
                            0.0,
                            1.0,
                            &mut errors,
                        );
                    } else {
                        errors.push(format!("{path}.entries[{i}]: expected an object"));
                    }
                }
            }
        }
        "morale" => {
            check_range(map, "settlementMorale", &format!("{path}.settlementMorale"), 0.0, 100.0, &mut errors);
            check_array(map, "modifiers", &path, &mut errors);
        }
        "economy" => {
            if let Some(prices) = check_array(map, "prices", &path, &mut errors) {
                for (i, entry) in prices.iter().enumerate() {
                    match entry.get("price").and_then(Value::as_f64) {
                        Some(p) if p >= 0.0 => {}
                        Some(p) => errors.push(format!(
                            "{path}.prices[{i}].price: must not be negative, got {p}"
                        )),
                        None => errors.push(format!("{path}.prices[{i}].price: expected a number")),
                    }
                }
            }
            check_u64(map, "tradesCompleted", &path, &mut errors);
        }
        "stats" => {
            for key in [
                "buildingsConstructed",
                "resourcesProduced",
                "inhabitantsDeceased",
                "raidsSurvived",
            ] {
                check_u64(map, key, &path, &mut errors);
            }
        }
        _ => {
            // Unknown ids are reported by the caller; nothing to check here.
        }
    }

    errors
}

// ---------------------------------------------------------------------------
// Field check helpers
// ---------------------------------------------------------------------------

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "missing".to_string(),
        Some(v) => v.to_string(),
    }
}

fn check_u64(map: &Map<String, Value>, key: &str, path: &str, errors: &mut Vec<String>) {
    if map.get(key).and_then(Value::as_u64).is_none() {
        let shown = if path.ends_with(key) {
            path.to_string()
        } else {
            format!("{path}.{key}")
        };
        errors.push(format!(
            "{shown}: expected a non-negative integer, got {}",
            describe(map.get(key))
        ));
    }
}

fn check_positive_u64(map: &Map<String, Value>, key: &str, path: &str, errors: &mut Vec<String>) {
    match map.get(key).and_then(Value::as_u64) {
        Some(v) if v > 0 => {}
        Some(_) => errors.push(format!("{path}.{key}: must be greater than zero")),
        None => errors.push(format!(
            "{path}.{key}: expected a positive integer, got {}",
            describe(map.get(key))
        )),
    }
}

fn check_string(map: &Map<String, Value>, key: &str, path: &str, errors: &mut Vec<String>) {
    if !map.get(key).map(Value::is_string).unwrap_or(false) {
        let shown = if path.ends_with(key) {
            path.to_string()
        } else {
            format!("{path}.{key}")
        };
        errors.push(format!(
            "{shown}: expected a string, got {}",
            describe(map.get(key))
        ));
    }
}

fn check_bool(map: &Map<String, Value>, key: &str, path: &str, errors: &mut Vec<String>) {
    if !map.get(key).map(Value::is_boolean).unwrap_or(false) {
        errors.push(format!(
            "{path}: expected a boolean, got {}",
            describe(map.get(key))
        ));
    }
}

fn check_range(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
    lo: f64,
    hi: f64,
    errors: &mut Vec<String>,
) {
    match map.get(key).and_then(Value::as_f64) {
        Some(v) if (lo..=hi).contains(&v) => {}
        Some(v) => errors.push(format!("{path}: must be within [{lo}, {hi}], got {v}")),
        None => errors.push(format!(
            "{path}: expected a number, got {}",
            describe(map.get(key))
        )),
    }
}

fn check_array<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<String>,
) -> Option<&'a Vec<Value>> {
    match map.get(key).and_then(Value::as_array) {
        Some(array) => Some(array),
        None => {
            errors.push(format!(
                "{path}.{key}: expected an array, got {}",
                describe(map.get(key))
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer;
    use simulation::SimulationModules;

    fn valid_record_value() -> Value {
        let modules = SimulationModules::sample_settlement();
        let record = serializer::serialize(&modules).expect("serialize");
        record.to_value().expect("to_value")
    }

    #[test]
    fn test_serialized_record_validates() {
        let report = validate_record(&valid_record_value());
        assert!(report.is_valid(), "violations: {:?}", report.errors);
    }

    #[test]
    fn test_non_object_record_rejected() {
        let report = validate_record(&Value::String("nope".into()));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_string_tick_reported_with_path() {
        let mut value = valid_record_value();
        value["metadata"]["simulationTick"] = serde_json::json!("oops");
        let report = validate_record(&value);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("metadata.simulationTick")));
    }

    #[test]
    fn test_missing_required_module_rejected() {
        let mut value = valid_record_value();
        value["moduleStates"]
            .as_object_mut()
            .expect("object")
            .remove("storage");
        let report = validate_record(&value);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("storage") && e.contains("missing")));
    }

    #[test]
    fn test_unknown_module_id_rejected() {
        let mut value = valid_record_value();
        value["moduleStates"]["weather"] = serde_json::json!({});
        let report = validate_record(&value);
        assert!(report.errors.iter().any(|e| e.contains("unknown module id")));
    }

    #[test]
    fn test_health_out_of_range_rejected() {
        let mut value = valid_record_value();
        value["moduleStates"]["inhabitants"]["roster"][0]["health"] = serde_json::json!(250.0);
        let report = validate_record(&value);
        assert!(report.errors.iter().any(|e| e.contains("health")), "{:?}", report.errors);
    }

    #[test]
    fn test_negative_resource_rejected() {
        let mut value = valid_record_value();
        value["moduleStates"]["storage"]["entries"][0]["amount"] = serde_json::json!(-3.0);
        let report = validate_record(&value);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("must not be negative")));
    }

    #[test]
    fn test_zero_radius_rejected() {
        let mut value = valid_record_value();
        value["moduleStates"]["territory"]["radius"] = serde_json::json!(0);
        let report = validate_record(&value);
        assert!(report.errors.iter().any(|e| e.contains("radius")));
    }

    #[test]
    fn test_all_violations_collected() {
        let mut value = valid_record_value();
        value["metadata"]["simulationTick"] = serde_json::json!("oops");
        value["moduleStates"]["territory"]["radius"] = serde_json::json!(0);
        value["moduleStates"]["storage"]["entries"][0]["amount"] = serde_json::json!(-3.0);
        let report = validate_record(&value);
        assert!(
            report.errors.len() >= 3,
            "expected all three violations, got {:?}",
            report.errors
        );
    }
}
