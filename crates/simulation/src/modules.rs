//! The aggregate handle over every live simulation module.

use crate::achievements::AchievementLog;
use crate::assignments::WorkAssignments;
use crate::buildings::{BuildingKind, BuildingRegistry};
use crate::economy::TradeLedger;
use crate::events::EventSchedule;
use crate::grid::{CellKind, TerrainGrid};
use crate::inhabitants::InhabitantRoster;
use crate::morale::MoraleState;
use crate::production::ProductionState;
use crate::progression::ProgressionState;
use crate::scheduler::TickScheduler;
use crate::stats::LifetimeStats;
use crate::storage::{ResourceKind, ResourceStore};
use crate::territory::TerritoryMap;

/// Every live module of a running settlement, plus the scheduler.
///
/// The persistence layer receives `&SimulationModules` to snapshot and
/// `&mut SimulationModules` to restore; it never holds on to the modules.
#[derive(Debug, Default)]
pub struct SimulationModules {
    pub grid: TerrainGrid,
    pub buildings: BuildingRegistry,
    pub inhabitants: InhabitantRoster,
    pub storage: ResourceStore,
    pub territory: TerritoryMap,
    pub progression: ProgressionState,
    pub achievements: AchievementLog,
    pub events: EventSchedule,
    pub assignments: WorkAssignments,
    pub production: ProductionState,
    pub morale: MoraleState,
    pub economy: TradeLedger,
    pub stats: LifetimeStats,
    pub scheduler: TickScheduler,
}

impl SimulationModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small populated settlement, used by tests and benchmarks.
    pub fn sample_settlement() -> Self {
        let mut modules = Self::new();

        modules.grid.set_cell(2, 3, CellKind::Forest);
        modules.grid.set_cell(4, 4, CellKind::Rock);
        modules.grid.set_cell(7, 1, CellKind::Water);

        let farm = modules.buildings.construct(BuildingKind::Farm, 5, 5);
        let house = modules.buildings.construct(BuildingKind::House, 6, 5);
        modules.stats.buildings_constructed = 2;

        let aldra = modules.inhabitants.spawn("Aldra");
        let bryn = modules.inhabitants.spawn("Bryn");
        modules.assignments.assign(aldra, farm);
        modules.assignments.assign(bryn, house);

        modules.storage.add(ResourceKind::Wood, 50.0);
        modules.storage.add(ResourceKind::Stone, 50.0);
        modules.storage.add(ResourceKind::Food, 120.0);

        modules.territory.claim(5, 5);
        modules.territory.claim(6, 5);
        modules.territory.expand(3);

        modules.progression.unlock("farming");
        modules.achievements.unlock("first-harvest", 100);
        modules
            .events
            .schedule(crate::events::EventKind::TraderArrival, 900);
        modules.production.set_progress(farm, 0.4);
        modules.morale.set_base(64.0);
        modules.economy.set_price(ResourceKind::Wood, 1.5);

        modules.scheduler.restore_clock(840, false, 420);
        modules
    }
}
