//! Achievement log: which achievements unlocked, and when.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Persistable;

#[derive(Debug, Clone, Default)]
pub struct AchievementLog {
    unlocked: BTreeMap<String, u64>,
}

/// One persisted unlock entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementEntry {
    pub id: String,
    pub unlocked_at_tick: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementLogState {
    pub unlocked: Vec<AchievementEntry>,
}

impl AchievementLog {
    /// Record an unlock. Re-unlocking keeps the original tick.
    pub fn unlock(&mut self, id: impl Into<String>, tick: u64) {
        self.unlocked.entry(id.into()).or_insert(tick);
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains_key(id)
    }

    pub fn unlocked_at(&self, id: &str) -> Option<u64> {
        self.unlocked.get(id).copied()
    }

    pub fn count(&self) -> usize {
        self.unlocked.len()
    }
}

impl Persistable for AchievementLog {
    type State = AchievementLogState;

    const MODULE_ID: &'static str = "achievements";

    fn snapshot(&self) -> AchievementLogState {
        AchievementLogState {
            unlocked: self
                .unlocked
                .iter()
                .map(|(id, tick)| AchievementEntry {
                    id: id.clone(),
                    unlocked_at_tick: *tick,
                })
                .collect(),
        }
    }

    fn restore(&mut self, state: AchievementLogState) {
        self.unlocked = state
            .unlocked
            .into_iter()
            .map(|e| (e.id, e.unlocked_at_tick))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reunlock_keeps_original_tick() {
        let mut log = AchievementLog::default();
        log.unlock("first-harvest", 100);
        log.unlock("first-harvest", 999);
        assert_eq!(log.unlocked_at("first-harvest"), Some(100));
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut log = AchievementLog::default();
        log.unlock("first-harvest", 100);
        log.unlock("ten-inhabitants", 250);

        let mut restored = AchievementLog::default();
        restored.restore(log.snapshot());

        assert_eq!(restored.count(), 2);
        assert_eq!(restored.unlocked_at("ten-inhabitants"), Some(250));
    }
}
