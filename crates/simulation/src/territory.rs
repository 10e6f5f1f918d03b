//! Territory: the claimed area around the settlement center.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Persistable;

/// The live territory map. `radius` is always at least 1.
#[derive(Debug, Clone)]
pub struct TerritoryMap {
    center: (u32, u32),
    radius: u32,
    claimed: BTreeSet<(u32, u32)>,
}

/// Persisted shape of the territory map. Claimed cells are an explicit
/// coordinate list, rebuilt into the live set on restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryMapState {
    pub center_x: u32,
    pub center_y: u32,
    pub radius: u32,
    pub claimed: Vec<(u32, u32)>,
}

impl Default for TerritoryMapState {
    fn default() -> Self {
        Self {
            center_x: 0,
            center_y: 0,
            radius: 1,
            claimed: Vec::new(),
        }
    }
}

impl Default for TerritoryMap {
    fn default() -> Self {
        Self {
            center: (0, 0),
            radius: 1,
            claimed: BTreeSet::new(),
        }
    }
}

impl TerritoryMap {
    pub fn new(center: (u32, u32), radius: u32) -> Self {
        Self {
            center,
            radius: radius.max(1),
            claimed: BTreeSet::new(),
        }
    }

    pub fn center(&self) -> (u32, u32) {
        self.center
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Expand the claim radius. Shrinking is not supported.
    pub fn expand(&mut self, new_radius: u32) {
        self.radius = self.radius.max(new_radius);
    }

    pub fn claim(&mut self, x: u32, y: u32) {
        self.claimed.insert((x, y));
    }

    pub fn is_claimed(&self, x: u32, y: u32) -> bool {
        self.claimed.contains(&(x, y))
    }

    pub fn claimed_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.claimed.iter().copied()
    }

    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }
}

impl Persistable for TerritoryMap {
    type State = TerritoryMapState;

    const MODULE_ID: &'static str = "territory";

    fn snapshot(&self) -> TerritoryMapState {
        TerritoryMapState {
            center_x: self.center.0,
            center_y: self.center.1,
            radius: self.radius,
            claimed: self.claimed.iter().copied().collect(),
        }
    }

    fn restore(&mut self, state: TerritoryMapState) {
        self.center = (state.center_x, state.center_y);
        self.radius = state.radius.max(1);
        self.claimed = state.claimed.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_never_zero() {
        let map = TerritoryMap::new((4, 4), 0);
        assert_eq!(map.radius(), 1);
    }

    #[test]
    fn test_expand_never_shrinks() {
        let mut map = TerritoryMap::new((0, 0), 5);
        map.expand(3);
        assert_eq!(map.radius(), 5);
        map.expand(8);
        assert_eq!(map.radius(), 8);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut map = TerritoryMap::new((10, 12), 4);
        map.claim(10, 12);
        map.claim(11, 12);

        let mut restored = TerritoryMap::default();
        restored.restore(map.snapshot());

        assert_eq!(restored.center(), (10, 12));
        assert_eq!(restored.radius(), 4);
        assert!(restored.is_claimed(11, 12));
        assert_eq!(restored.claimed_count(), 2);
    }
}
