//! Lifetime statistics: counters that only ever go up.

use serde::{Deserialize, Serialize};

use crate::Persistable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeStats {
    pub buildings_constructed: u64,
    pub resources_produced: u64,
    pub inhabitants_deceased: u64,
    pub raids_survived: u64,
}

impl Persistable for LifetimeStats {
    type State = LifetimeStats;

    const MODULE_ID: &'static str = "stats";

    fn snapshot(&self) -> LifetimeStats {
        *self
    }

    fn restore(&mut self, state: LifetimeStats) {
        *self = state;
    }
}
