//! Resource storage: stockpiled resources shared by the settlement.
//!
//! The live store is map-shaped; the persisted shape is an explicit list of
//! `(resource, amount)` entries so the record stays plain data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Persistable;

/// Default stockpile capacity for a fresh settlement.
pub const DEFAULT_CAPACITY: f64 = 500.0;

/// Resource types the settlement can stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Stone,
    Food,
    Iron,
    Tools,
    Gold,
}

/// The live resource store.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    amounts: BTreeMap<ResourceKind, f64>,
    capacity: f64,
}

/// One persisted stockpile entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub resource: ResourceKind,
    pub amount: f64,
}

/// Persisted shape of the resource store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStoreState {
    pub entries: Vec<ResourceEntry>,
    pub capacity: f64,
}

impl Default for ResourceStoreState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self {
            amounts: BTreeMap::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ResourceStore {
    pub fn amount(&self, resource: ResourceKind) -> f64 {
        self.amounts.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Add to a stockpile, clamped to capacity. Returns the amount actually
    /// stored.
    pub fn add(&mut self, resource: ResourceKind, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let current = self.amount(resource);
        let stored = amount.min(self.capacity - current).max(0.0);
        self.amounts.insert(resource, current + stored);
        stored
    }

    /// Take from a stockpile. Returns the amount actually removed, which may
    /// be less than requested; stockpiles never go negative.
    pub fn take(&mut self, resource: ResourceKind, amount: f64) -> f64 {
        let current = self.amount(resource);
        let taken = amount.max(0.0).min(current);
        self.amounts.insert(resource, current - taken);
        taken
    }

    pub fn entries(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        self.amounts.iter().map(|(k, v)| (*k, *v))
    }
}

impl Persistable for ResourceStore {
    type State = ResourceStoreState;

    const MODULE_ID: &'static str = "storage";

    fn snapshot(&self) -> ResourceStoreState {
        ResourceStoreState {
            entries: self
                .amounts
                .iter()
                .map(|(resource, amount)| ResourceEntry {
                    resource: *resource,
                    amount: *amount,
                })
                .collect(),
            capacity: self.capacity,
        }
    }

    fn restore(&mut self, state: ResourceStoreState) {
        self.capacity = if state.capacity > 0.0 {
            state.capacity
        } else {
            DEFAULT_CAPACITY
        };
        self.amounts = state
            .entries
            .into_iter()
            .map(|e| (e.resource, e.amount))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_take() {
        let mut store = ResourceStore::default();
        assert_eq!(store.add(ResourceKind::Wood, 50.0), 50.0);
        assert_eq!(store.take(ResourceKind::Wood, 20.0), 20.0);
        assert_eq!(store.amount(ResourceKind::Wood), 30.0);
    }

    #[test]
    fn test_take_never_goes_negative() {
        let mut store = ResourceStore::default();
        store.add(ResourceKind::Stone, 10.0);
        assert_eq!(store.take(ResourceKind::Stone, 25.0), 10.0);
        assert_eq!(store.amount(ResourceKind::Stone), 0.0);
    }

    #[test]
    fn test_add_clamped_to_capacity() {
        let mut store = ResourceStore::default();
        let stored = store.add(ResourceKind::Food, DEFAULT_CAPACITY + 100.0);
        assert_eq!(stored, DEFAULT_CAPACITY);
        assert_eq!(store.amount(ResourceKind::Food), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut store = ResourceStore::default();
        store.add(ResourceKind::Wood, 50.0);
        store.add(ResourceKind::Stone, 50.0);

        let mut restored = ResourceStore::default();
        restored.restore(store.snapshot());

        assert_eq!(restored.amount(ResourceKind::Wood), 50.0);
        assert_eq!(restored.amount(ResourceKind::Stone), 50.0);
        assert_eq!(restored.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_restore_fixes_nonpositive_capacity() {
        let mut store = ResourceStore::default();
        store.restore(ResourceStoreState {
            entries: Vec::new(),
            capacity: -5.0,
        });
        assert_eq!(store.capacity(), DEFAULT_CAPACITY);
    }
}
