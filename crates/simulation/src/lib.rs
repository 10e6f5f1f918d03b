//! Live state of the settlement simulation.
//!
//! Each module owns one slice of mutable simulation state (terrain, buildings,
//! inhabitants, resources, ...) and exposes it to the persistence layer through
//! the [`Persistable`] trait: a pure `snapshot()` into a plain-data state
//! struct, and a `restore()` that overwrites the live state from one.
//!
//! The tick/production/morale logic itself lives elsewhere; this crate is the
//! interface boundary the save system works against.

pub mod achievements;
pub mod assignments;
pub mod buildings;
pub mod economy;
pub mod events;
pub mod grid;
pub mod inhabitants;
pub mod modules;
pub mod morale;
pub mod production;
pub mod progression;
pub mod scheduler;
pub mod stats;
pub mod storage;
pub mod territory;

pub use modules::SimulationModules;
pub use scheduler::{SchedulerSignal, SignalReceiver, TickScheduler};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Interface every simulation module exposes to the persistence layer.
///
/// `State` is a plain-data struct owned by the module: no live references,
/// no cyclic structure, safe to hand to any codec. Associations between
/// modules (e.g. which inhabitant works in which building) are represented
/// as explicit id pairs inside the owning module's `State`, never as shared
/// object identity.
pub trait Persistable {
    /// Plain-data snapshot shape owned by this module.
    ///
    /// `Default` must produce a state that passes structural validation;
    /// the save system substitutes it when repairing a damaged record.
    type State: Serialize + DeserializeOwned + Default;

    /// Identifier under which this module's state is persisted.
    const MODULE_ID: &'static str;

    /// Capture a snapshot of the live state. Must not mutate the module.
    fn snapshot(&self) -> Self::State;

    /// Overwrite the live state from a previously captured snapshot.
    fn restore(&mut self, state: Self::State);
}
