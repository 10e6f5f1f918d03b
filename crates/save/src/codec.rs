// ---------------------------------------------------------------------------
// Module codecs: the closed registry mapping module ids to capture/apply
// ---------------------------------------------------------------------------
//
// One entry per simulation module. `capture` snapshots the live module into
// raw JSON, `apply` decodes raw JSON and restores the live module, and
// `default_state` supplies the documented default the repair pass
// substitutes for a missing or damaged sub-record.

use serde_json::Value;
use simulation::achievements::AchievementLog;
use simulation::assignments::WorkAssignments;
use simulation::buildings::BuildingRegistry;
use simulation::economy::TradeLedger;
use simulation::events::EventSchedule;
use simulation::grid::TerrainGrid;
use simulation::inhabitants::InhabitantRoster;
use simulation::morale::MoraleState;
use simulation::production::ProductionState;
use simulation::progression::ProgressionState;
use simulation::stats::LifetimeStats;
use simulation::storage::ResourceStore;
use simulation::territory::TerritoryMap;
use simulation::{Persistable, SimulationModules};

use crate::record::MODULE_IDS;

pub(crate) struct ModuleCodec {
    pub id: &'static str,
    pub capture: fn(&SimulationModules) -> Result<Value, String>,
    pub apply: fn(&Value, &mut SimulationModules) -> Result<(), String>,
    pub default_state: fn() -> Value,
}

macro_rules! module_codec {
    ($module:ty, $field:ident) => {
        ModuleCodec {
            id: <$module as Persistable>::MODULE_ID,
            capture: |modules| {
                serde_json::to_value(modules.$field.snapshot()).map_err(|e| e.to_string())
            },
            apply: |value, modules| {
                let state: <$module as Persistable>::State =
                    serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
                modules.$field.restore(state);
                Ok(())
            },
            default_state: || {
                serde_json::to_value(<<$module as Persistable>::State as Default>::default())
                    .unwrap_or(Value::Null)
            },
        }
    };
}

pub(crate) static CODECS: [ModuleCodec; 13] = [
    module_codec!(AchievementLog, achievements),
    module_codec!(WorkAssignments, assignments),
    module_codec!(BuildingRegistry, buildings),
    module_codec!(TradeLedger, economy),
    module_codec!(EventSchedule, events),
    module_codec!(TerrainGrid, grid),
    module_codec!(InhabitantRoster, inhabitants),
    module_codec!(MoraleState, morale),
    module_codec!(ProductionState, production),
    module_codec!(ProgressionState, progression),
    module_codec!(LifetimeStats, stats),
    module_codec!(ResourceStore, storage),
    module_codec!(TerritoryMap, territory),
];

pub(crate) fn codec_for(id: &str) -> Option<&'static ModuleCodec> {
    CODECS.iter().find(|codec| codec.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_closed_module_set() {
        let ids: Vec<&str> = CODECS.iter().map(|c| c.id).collect();
        assert_eq!(ids, MODULE_IDS.to_vec());
    }

    #[test]
    fn test_capture_apply_roundtrip_every_module() {
        let source = SimulationModules::sample_settlement();
        let mut target = SimulationModules::new();

        for codec in &CODECS {
            let value = (codec.capture)(&source)
                .unwrap_or_else(|e| panic!("capture of '{}' failed: {e}", codec.id));
            (codec.apply)(&value, &mut target)
                .unwrap_or_else(|e| panic!("apply of '{}' failed: {e}", codec.id));
        }

        assert_eq!(target.buildings.count(), source.buildings.count());
        assert_eq!(
            target.inhabitants.living_count(),
            source.inhabitants.living_count()
        );
        assert_eq!(target.storage.amount(simulation::storage::ResourceKind::Wood), 50.0);
        assert_eq!(target.territory.claimed_count(), 2);
    }

    #[test]
    fn test_default_states_are_objects() {
        for codec in &CODECS {
            let value = (codec.default_state)();
            assert!(
                value.is_object(),
                "default state of '{}' should be a JSON object, got {value}",
                codec.id
            );
        }
    }

    #[test]
    fn test_apply_rejects_garbage() {
        let mut modules = SimulationModules::new();
        let garbage = serde_json::json!({ "this": "is not a module state" });
        let codec = codec_for("inhabitants").expect("codec exists");
        assert!((codec.apply)(&garbage, &mut modules).is_err());
    }
}
