//! Production: per-building output progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Persistable;

#[derive(Debug, Clone, Default)]
pub struct ProductionState {
    progress: BTreeMap<u64, f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEntry {
    pub building_id: u64,
    /// Fraction of the current output cycle completed, in `[0, 1]`.
    pub progress: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSnapshot {
    pub entries: Vec<ProductionEntry>,
}

impl ProductionState {
    pub fn set_progress(&mut self, building_id: u64, progress: f32) {
        self.progress.insert(building_id, progress.clamp(0.0, 1.0));
    }

    pub fn progress_of(&self, building_id: u64) -> f32 {
        self.progress.get(&building_id).copied().unwrap_or(0.0)
    }

    pub fn clear(&mut self, building_id: u64) {
        self.progress.remove(&building_id);
    }

    pub fn tracked_count(&self) -> usize {
        self.progress.len()
    }
}

impl Persistable for ProductionState {
    type State = ProductionSnapshot;

    const MODULE_ID: &'static str = "production";

    fn snapshot(&self) -> ProductionSnapshot {
        ProductionSnapshot {
            entries: self
                .progress
                .iter()
                .map(|(building_id, progress)| ProductionEntry {
                    building_id: *building_id,
                    progress: *progress,
                })
                .collect(),
        }
    }

    fn restore(&mut self, state: ProductionSnapshot) {
        self.progress = state
            .entries
            .into_iter()
            .map(|e| (e.building_id, e.progress.clamp(0.0, 1.0)))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamped() {
        let mut prod = ProductionState::default();
        prod.set_progress(1, 1.8);
        assert_eq!(prod.progress_of(1), 1.0);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut prod = ProductionState::default();
        prod.set_progress(1, 0.25);
        prod.set_progress(2, 0.75);

        let mut restored = ProductionState::default();
        restored.restore(prod.snapshot());

        assert_eq!(restored.progress_of(1), 0.25);
        assert_eq!(restored.tracked_count(), 2);
    }
}
