//! Event schedule: future simulation events waiting for their tick.

use serde::{Deserialize, Serialize};

use crate::Persistable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    RaiderAttack,
    TraderArrival,
    Harvest,
    SeasonChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    pub due_tick: u64,
    pub kind: EventKind,
}

/// The live schedule, kept sorted by due tick.
#[derive(Debug, Clone, Default)]
pub struct EventSchedule {
    pending: Vec<ScheduledEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScheduleState {
    pub pending: Vec<ScheduledEvent>,
}

impl EventSchedule {
    pub fn schedule(&mut self, kind: EventKind, due_tick: u64) {
        self.pending.push(ScheduledEvent { due_tick, kind });
        self.pending.sort_by_key(|e| e.due_tick);
    }

    /// Remove and return every event due at or before `tick`.
    pub fn drain_due(&mut self, tick: u64) -> Vec<ScheduledEvent> {
        let split = self.pending.partition_point(|e| e.due_tick <= tick);
        self.pending.drain(..split).collect()
    }

    pub fn pending(&self) -> &[ScheduledEvent] {
        &self.pending
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Persistable for EventSchedule {
    type State = EventScheduleState;

    const MODULE_ID: &'static str = "events";

    fn snapshot(&self) -> EventScheduleState {
        EventScheduleState {
            pending: self.pending.clone(),
        }
    }

    fn restore(&mut self, state: EventScheduleState) {
        self.pending = state.pending;
        self.pending.sort_by_key(|e| e.due_tick);
    }
}
