// ---------------------------------------------------------------------------
// State serializer: live modules <-> SaveRecord
// ---------------------------------------------------------------------------
//
// `serialize` is a pure snapshot: it reads every module through its codec and
// never mutates live state. `deserialize` applies each module independently,
// so one damaged sub-record cannot block restoration of the others; the
// per-module failures land in the report instead. A final consistency pass
// cross-checks invariants no single module can verify alone.

use std::collections::BTreeMap;

use tracing::debug;

use simulation::SimulationModules;

use crate::codec::{codec_for, CODECS};
use crate::error::SaveError;
use crate::record::{now_iso, SaveMetadata, SaveRecord, CURRENT_FORMAT_VERSION};

/// One failed module restoration or consistency violation.
#[derive(Debug, Clone)]
pub struct RestoreIssue {
    pub module: String,
    pub message: String,
}

/// Result of applying a record to live modules.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    /// Module ids restored successfully, in application order.
    pub applied: Vec<String>,
    /// Per-module failures and consistency violations. State already
    /// applied is never reverted on account of these.
    pub issues: Vec<RestoreIssue>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Snapshot every live module into a fresh record.
///
/// Slot name and description are left empty; the save manager fills them in
/// before the record is written.
pub fn serialize(modules: &SimulationModules) -> Result<SaveRecord, SaveError> {
    let mut module_states = BTreeMap::new();
    for codec in &CODECS {
        let state = (codec.capture)(modules).map_err(|message| SaveError::Module {
            module: codec.id.to_string(),
            message,
        })?;
        module_states.insert(codec.id.to_string(), state);
    }

    let metadata = SaveMetadata {
        simulation_tick: modules.scheduler.tick(),
        progression_tier: modules.progression.tier().as_str().to_string(),
        is_paused: modules.scheduler.is_paused(),
        slot_name: String::new(),
        description: String::new(),
        saved_at: now_iso(),
        playtime_seconds: modules.scheduler.playtime_seconds(),
    };

    Ok(SaveRecord {
        format_version: CURRENT_FORMAT_VERSION,
        created_at: now_iso(),
        metadata,
        module_states,
        integrity_checksum: None,
    })
}

/// Apply a record to the live modules, module by module.
pub fn deserialize(record: &SaveRecord, modules: &mut SimulationModules) -> RestoreReport {
    let mut report = RestoreReport::default();

    for (id, state) in &record.module_states {
        match codec_for(id) {
            Some(codec) => match (codec.apply)(state, modules) {
                Ok(()) => report.applied.push(id.clone()),
                Err(message) => report.issues.push(RestoreIssue {
                    module: id.clone(),
                    message,
                }),
            },
            None => report.issues.push(RestoreIssue {
                module: id.clone(),
                message: "unknown module id; state ignored".to_string(),
            }),
        }
    }

    modules.scheduler.restore_clock(
        record.metadata.simulation_tick,
        record.metadata.is_paused,
        record.metadata.playtime_seconds,
    );

    consistency_pass(modules, &mut report);

    debug!(
        applied = report.applied.len(),
        issues = report.issues.len(),
        "record applied to live modules"
    );
    report
}

/// Cross-module invariants no single module can verify alone. Violations are
/// reported, never reverted: the caller keeps whatever state was applied.
fn consistency_pass(modules: &SimulationModules, report: &mut RestoreReport) {
    let living = modules.inhabitants.living_count() as u64;
    let ever = modules.inhabitants.total_created();
    if living > ever {
        report.issues.push(RestoreIssue {
            module: "inhabitants".to_string(),
            message: format!("{living} living inhabitants exceed {ever} ever created"),
        });
    }

    for (resource, amount) in modules.storage.entries() {
        if amount < 0.0 {
            report.issues.push(RestoreIssue {
                module: "storage".to_string(),
                message: format!("negative quantity {amount} of {resource:?}"),
            });
        }
    }

    for (inhabitant, building) in modules.assignments.pairs() {
        if !modules.inhabitants.contains(inhabitant) {
            report.issues.push(RestoreIssue {
                module: "assignments".to_string(),
                message: format!("assignment references unknown inhabitant {inhabitant}"),
            });
        }
        if !modules.buildings.contains(building) {
            report.issues.push(RestoreIssue {
                module: "assignments".to_string(),
                message: format!("assignment references unknown building {building}"),
            });
        }
    }

    for (x, y) in modules.territory.claimed_cells() {
        if !modules.grid.in_bounds(x, y) {
            report.issues.push(RestoreIssue {
                module: "territory".to_string(),
                message: format!("claimed cell ({x}, {y}) lies outside the terrain grid"),
            });
        }
    }
}
