// ---------------------------------------------------------------------------
// Record format migration
// ---------------------------------------------------------------------------
//
// One migration step per version bump, applied in order on the raw JSON
// value before typed decoding. The registry constructor checks the chain is
// contiguous from v0 to CURRENT_FORMAT_VERSION. Records from a newer build
// are refused, never guessed at.

use serde_json::{Map, Value};

use crate::codec::codec_for;
use crate::error::SaveError;
use crate::record::{CURRENT_FORMAT_VERSION, KEY_FORMAT_VERSION, KEY_METADATA, KEY_MODULE_STATES};

/// One version transition.
struct MigrationStep {
    from_version: u32,
    description: &'static str,
    migrate_fn: fn(&mut Map<String, Value>),
}

/// Details of a completed migration.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub original_version: u32,
    pub final_version: u32,
    pub steps_applied: u32,
    pub step_descriptions: Vec<&'static str>,
}

fn migration_steps() -> Vec<MigrationStep> {
    vec![
        // v0 -> v1: records written before versioning existed. All v1 fields
        // already deserialized leniently, so this step only tags the version.
        MigrationStep {
            from_version: 0,
            description: "Tag legacy unversioned record as v1",
            migrate_fn: |_record| {},
        },
        // v1 -> v2: playtime tracking and the events/production modules.
        MigrationStep {
            from_version: 1,
            description: "Add playtimeSeconds metadata and events/production module states",
            migrate_fn: |record| {
                if let Some(Value::Object(metadata)) = record.get_mut(KEY_METADATA) {
                    metadata
                        .entry("playtimeSeconds")
                        .or_insert(Value::from(0u64));
                }
                if let Some(Value::Object(states)) = record.get_mut(KEY_MODULE_STATES) {
                    for id in ["events", "production"] {
                        if !states.contains_key(id) {
                            if let Some(codec) = codec_for(id) {
                                states.insert(id.to_string(), (codec.default_state)());
                            }
                        }
                    }
                }
            },
        },
    ]
}

/// Migrate a record value in place up to [`CURRENT_FORMAT_VERSION`].
///
/// A missing or mistyped version field is treated as v0 (legacy). Returns
/// `SaveError::VersionMismatch` for records from a newer build.
pub fn migrate_record(record: &mut Value) -> Result<MigrationReport, SaveError> {
    let Some(map) = record.as_object_mut() else {
        return Err(SaveError::Corruption(
            "cannot migrate a non-object record".to_string(),
        ));
    };

    let original_version = map
        .get(KEY_FORMAT_VERSION)
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(0);

    if original_version > CURRENT_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_FORMAT_VERSION,
            found: original_version,
        });
    }

    let steps = migration_steps();
    let mut applied = Vec::new();
    for step in &steps {
        if step.from_version >= original_version {
            (step.migrate_fn)(map);
            applied.push(step.description);
        }
    }
    map.insert(
        KEY_FORMAT_VERSION.to_string(),
        Value::from(CURRENT_FORMAT_VERSION),
    );

    Ok(MigrationReport {
        original_version,
        final_version: CURRENT_FORMAT_VERSION,
        steps_applied: applied.len() as u32,
        step_descriptions: applied,
    })
}
