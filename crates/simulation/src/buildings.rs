//! Building registry: every constructed building and its condition.

use serde::{Deserialize, Serialize};

use crate::Persistable;

/// Building archetypes available to the settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingKind {
    Farm,
    Lumberyard,
    Quarry,
    House,
    Storehouse,
    Workshop,
}

/// One constructed building.
///
/// `health` is a percentage in `[0, 100]`; buildings at 0 are rubble but
/// stay in the registry until explicitly demolished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: u64,
    pub kind: BuildingKind,
    pub x: u32,
    pub y: u32,
    pub health: f32,
    pub level: u8,
}

/// The live building registry.
#[derive(Debug, Clone, Default)]
pub struct BuildingRegistry {
    buildings: Vec<Building>,
    next_id: u64,
}

/// Persisted shape of the building registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRegistryState {
    pub buildings: Vec<Building>,
    pub next_id: u64,
}

impl BuildingRegistry {
    /// Construct a new building and return its id.
    pub fn construct(&mut self, kind: BuildingKind, x: u32, y: u32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.buildings.push(Building {
            id,
            kind,
            x,
            y,
            health: 100.0,
            level: 1,
        });
        id
    }

    pub fn get(&self, id: u64) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.id == id)
    }

    /// Remove a building. Removing an unknown id is a no-op.
    pub fn demolish(&mut self, id: u64) {
        self.buildings.retain(|b| b.id != id);
    }

    pub fn contains(&self, id: u64) -> bool {
        self.buildings.iter().any(|b| b.id == id)
    }

    pub fn all(&self) -> &[Building] {
        &self.buildings
    }

    pub fn count(&self) -> usize {
        self.buildings.len()
    }
}

impl Persistable for BuildingRegistry {
    type State = BuildingRegistryState;

    const MODULE_ID: &'static str = "buildings";

    fn snapshot(&self) -> BuildingRegistryState {
        BuildingRegistryState {
            buildings: self.buildings.clone(),
            next_id: self.next_id,
        }
    }

    fn restore(&mut self, state: BuildingRegistryState) {
        // Never let a restored counter collide with existing ids.
        let max_id = state.buildings.iter().map(|b| b.id + 1).max().unwrap_or(0);
        self.next_id = state.next_id.max(max_id);
        self.buildings = state.buildings;
    }
}
