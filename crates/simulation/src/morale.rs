//! Settlement morale and its active modifiers.

use serde::{Deserialize, Serialize};

use crate::Persistable;

/// One active morale modifier (festival, raid aftermath, hunger, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoraleModifier {
    pub reason: String,
    pub delta: f32,
    pub expires_tick: u64,
}

#[derive(Debug, Clone)]
pub struct MoraleState {
    settlement_morale: f32,
    modifiers: Vec<MoraleModifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoraleSnapshot {
    pub settlement_morale: f32,
    pub modifiers: Vec<MoraleModifier>,
}

impl Default for MoraleSnapshot {
    fn default() -> Self {
        Self {
            settlement_morale: 50.0,
            modifiers: Vec::new(),
        }
    }
}

impl Default for MoraleState {
    fn default() -> Self {
        Self {
            settlement_morale: 50.0,
            modifiers: Vec::new(),
        }
    }
}

impl MoraleState {
    /// Base morale in `[0, 100]`, before modifiers.
    pub fn base(&self) -> f32 {
        self.settlement_morale
    }

    /// Morale with all active modifiers applied, clamped to `[0, 100]`.
    pub fn effective(&self) -> f32 {
        let total: f32 = self.modifiers.iter().map(|m| m.delta).sum();
        (self.settlement_morale + total).clamp(0.0, 100.0)
    }

    pub fn set_base(&mut self, morale: f32) {
        self.settlement_morale = morale.clamp(0.0, 100.0);
    }

    pub fn add_modifier(&mut self, reason: impl Into<String>, delta: f32, expires_tick: u64) {
        self.modifiers.push(MoraleModifier {
            reason: reason.into(),
            delta,
            expires_tick,
        });
    }

    pub fn expire(&mut self, tick: u64) {
        self.modifiers.retain(|m| m.expires_tick > tick);
    }

    pub fn modifiers(&self) -> &[MoraleModifier] {
        &self.modifiers
    }
}

impl Persistable for MoraleState {
    type State = MoraleSnapshot;

    const MODULE_ID: &'static str = "morale";

    fn snapshot(&self) -> MoraleSnapshot {
        MoraleSnapshot {
            settlement_morale: self.settlement_morale,
            modifiers: self.modifiers.clone(),
        }
    }

    fn restore(&mut self, state: MoraleSnapshot) {
        self.settlement_morale = state.settlement_morale.clamp(0.0, 100.0);
        self.modifiers = state.modifiers;
    }
}
