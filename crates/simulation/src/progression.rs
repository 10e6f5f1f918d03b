//! Progression: settlement tier and unlocked features.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Persistable;

/// Settlement tiers, in advancement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementTier {
    Camp,
    Hamlet,
    Village,
    Town,
    City,
}

impl SettlementTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SettlementTier::Camp => "camp",
            SettlementTier::Hamlet => "hamlet",
            SettlementTier::Village => "village",
            SettlementTier::Town => "town",
            SettlementTier::City => "city",
        }
    }

    /// Parse a tier name; unknown names fall back to `Camp`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "hamlet" => SettlementTier::Hamlet,
            "village" => SettlementTier::Village,
            "town" => SettlementTier::Town,
            "city" => SettlementTier::City,
            _ => SettlementTier::Camp,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            SettlementTier::Camp => Some(SettlementTier::Hamlet),
            SettlementTier::Hamlet => Some(SettlementTier::Village),
            SettlementTier::Village => Some(SettlementTier::Town),
            SettlementTier::Town => Some(SettlementTier::City),
            SettlementTier::City => None,
        }
    }
}

impl Default for SettlementTier {
    fn default() -> Self {
        SettlementTier::Camp
    }
}

/// The live progression state.
#[derive(Debug, Clone, Default)]
pub struct ProgressionState {
    tier: SettlementTier,
    unlocked: BTreeSet<String>,
}

/// Persisted shape of the progression state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSnapshot {
    pub tier: SettlementTier,
    pub unlocked: Vec<String>,
}

impl ProgressionState {
    pub fn tier(&self) -> SettlementTier {
        self.tier
    }

    /// Advance to the next tier, if any.
    pub fn advance(&mut self) {
        if let Some(next) = self.tier.next() {
            self.tier = next;
        }
    }

    pub fn unlock(&mut self, feature: impl Into<String>) {
        self.unlocked.insert(feature.into());
    }

    pub fn is_unlocked(&self, feature: &str) -> bool {
        self.unlocked.contains(feature)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }
}

impl Persistable for ProgressionState {
    type State = ProgressionSnapshot;

    const MODULE_ID: &'static str = "progression";

    fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            tier: self.tier,
            unlocked: self.unlocked.iter().cloned().collect(),
        }
    }

    fn restore(&mut self, state: ProgressionSnapshot) {
        self.tier = state.tier;
        self.unlocked = state.unlocked.into_iter().collect();
    }
}
