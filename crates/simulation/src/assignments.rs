//! Work assignments: which inhabitant works in which building.
//!
//! The live association is a map keyed by inhabitant id; the persisted shape
//! is an explicit list of id pairs, since restored modules do not share
//! object identity with the originals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Persistable;

#[derive(Debug, Clone, Default)]
pub struct WorkAssignments {
    by_inhabitant: BTreeMap<u64, u64>,
}

/// One persisted inhabitant-to-building pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPair {
    pub inhabitant_id: u64,
    pub building_id: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkAssignmentsState {
    pub pairs: Vec<AssignmentPair>,
}

impl WorkAssignments {
    /// Assign an inhabitant to a building, replacing any previous assignment.
    pub fn assign(&mut self, inhabitant_id: u64, building_id: u64) {
        self.by_inhabitant.insert(inhabitant_id, building_id);
    }

    pub fn unassign(&mut self, inhabitant_id: u64) {
        self.by_inhabitant.remove(&inhabitant_id);
    }

    pub fn building_for(&self, inhabitant_id: u64) -> Option<u64> {
        self.by_inhabitant.get(&inhabitant_id).copied()
    }

    pub fn workers_of(&self, building_id: u64) -> Vec<u64> {
        self.by_inhabitant
            .iter()
            .filter(|(_, b)| **b == building_id)
            .map(|(i, _)| *i)
            .collect()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.by_inhabitant.iter().map(|(i, b)| (*i, *b))
    }

    pub fn count(&self) -> usize {
        self.by_inhabitant.len()
    }
}

impl Persistable for WorkAssignments {
    type State = WorkAssignmentsState;

    const MODULE_ID: &'static str = "assignments";

    fn snapshot(&self) -> WorkAssignmentsState {
        WorkAssignmentsState {
            pairs: self
                .by_inhabitant
                .iter()
                .map(|(inhabitant_id, building_id)| AssignmentPair {
                    inhabitant_id: *inhabitant_id,
                    building_id: *building_id,
                })
                .collect(),
        }
    }

    fn restore(&mut self, state: WorkAssignmentsState) {
        self.by_inhabitant = state
            .pairs
            .into_iter()
            .map(|p| (p.inhabitant_id, p.building_id))
            .collect();
    }
}
