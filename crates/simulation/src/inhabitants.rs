//! Inhabitant roster: the settlement's living population.

use serde::{Deserialize, Serialize};

use crate::Persistable;

/// One living inhabitant.
///
/// `health` and `morale` are percentages in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inhabitant {
    pub id: u64,
    pub name: String,
    pub health: f32,
    pub morale: f32,
    pub age_ticks: u64,
}

/// The live roster.
///
/// `total_created` counts every inhabitant ever spawned, including the
/// deceased; the living roster can never exceed it.
#[derive(Debug, Clone, Default)]
pub struct InhabitantRoster {
    roster: Vec<Inhabitant>,
    next_id: u64,
    total_created: u64,
}

/// Persisted shape of the roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InhabitantRosterState {
    pub roster: Vec<Inhabitant>,
    pub next_id: u64,
    pub total_created: u64,
}

impl InhabitantRoster {
    /// Spawn a new inhabitant at full health and return their id.
    pub fn spawn(&mut self, name: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.total_created += 1;
        self.roster.push(Inhabitant {
            id,
            name: name.into(),
            health: 100.0,
            morale: 75.0,
            age_ticks: 0,
        });
        id
    }

    /// Remove an inhabitant from the living roster.
    pub fn remove(&mut self, id: u64) {
        self.roster.retain(|p| p.id != id);
    }

    pub fn get(&self, id: u64) -> Option<&Inhabitant> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.roster.iter().any(|p| p.id == id)
    }

    pub fn living(&self) -> &[Inhabitant] {
        &self.roster
    }

    pub fn living_count(&self) -> usize {
        self.roster.len()
    }

    pub fn total_created(&self) -> u64 {
        self.total_created
    }
}

impl Persistable for InhabitantRoster {
    type State = InhabitantRosterState;

    const MODULE_ID: &'static str = "inhabitants";

    fn snapshot(&self) -> InhabitantRosterState {
        InhabitantRosterState {
            roster: self.roster.clone(),
            next_id: self.next_id,
            total_created: self.total_created,
        }
    }

    fn restore(&mut self, state: InhabitantRosterState) {
        let max_id = state.roster.iter().map(|p| p.id + 1).max().unwrap_or(0);
        self.next_id = state.next_id.max(max_id);
        // Keep the lifetime counter consistent with the restored roster.
        self.total_created = state.total_created.max(state.roster.len() as u64);
        self.roster = state.roster;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_tracks_total_created() {
        let mut roster = InhabitantRoster::default();
        roster.spawn("Aldra");
        let id = roster.spawn("Bryn");
        roster.remove(id);
        assert_eq!(roster.living_count(), 1);
        assert_eq!(roster.total_created(), 2);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut roster = InhabitantRoster::default();
        roster.spawn("Aldra");
        roster.spawn("Bryn");

        let mut restored = InhabitantRoster::default();
        restored.restore(roster.snapshot());

        assert_eq!(restored.living_count(), 2);
        assert_eq!(restored.total_created(), 2);
        assert_eq!(restored.living()[0].name, "Aldra");
    }

    #[test]
    fn test_restore_clamps_lifetime_counter() {
        let mut roster = InhabitantRoster::default();
        roster.spawn("Aldra");
        let mut state = roster.snapshot();
        // A damaged record may undercount; restore keeps the invariant
        // living <= total_created.
        state.total_created = 0;

        let mut restored = InhabitantRoster::default();
        restored.restore(state);
        assert_eq!(restored.total_created(), 1);
    }
}
