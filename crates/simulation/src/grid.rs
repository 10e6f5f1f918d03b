//! Terrain grid: the fixed-size cell map the settlement is built on.
//!
//! The live grid stores one [`CellKind`] per cell. The persisted shape is the
//! grid dimensions plus an occupancy list of the non-empty cells only, which
//! keeps records small for mostly-empty maps.

use serde::{Deserialize, Serialize};

use crate::Persistable;

/// Default map edge length for a fresh settlement.
pub const DEFAULT_GRID_SIZE: u32 = 32;

/// What occupies a terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Forest,
    Rock,
    Water,
    Fields,
}

/// The live terrain grid.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
}

/// One non-empty cell in the persisted occupancy list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupiedCell {
    pub x: u32,
    pub y: u32,
    pub kind: CellKind,
}

/// Persisted shape of the terrain grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainGridState {
    pub width: u32,
    pub height: u32,
    pub occupancy: Vec<OccupiedCell>,
}

impl Default for TerrainGridState {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            occupancy: Vec::new(),
        }
    }
}

impl TerrainGrid {
    /// Create an empty grid. Zero dimensions are clamped to 1 so the grid
    /// always has at least one cell.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![CellKind::Empty; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    pub fn cell_at(&self, x: u32, y: u32) -> Option<CellKind> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[(y * self.width + x) as usize])
    }

    /// Set a cell's kind. Out-of-bounds coordinates are ignored.
    pub fn set_cell(&mut self, x: u32, y: u32, kind: CellKind) {
        if self.in_bounds(x, y) {
            self.cells[(y * self.width + x) as usize] = kind;
        }
    }

    /// Number of non-empty cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != CellKind::Empty).count()
    }
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE)
    }
}

impl Persistable for TerrainGrid {
    type State = TerrainGridState;

    const MODULE_ID: &'static str = "grid";

    fn snapshot(&self) -> TerrainGridState {
        let mut occupancy = Vec::with_capacity(self.occupied_count());
        for y in 0..self.height {
            for x in 0..self.width {
                let kind = self.cells[(y * self.width + x) as usize];
                if kind != CellKind::Empty {
                    occupancy.push(OccupiedCell { x, y, kind });
                }
            }
        }
        TerrainGridState {
            width: self.width,
            height: self.height,
            occupancy,
        }
    }

    fn restore(&mut self, state: TerrainGridState) {
        *self = Self::new(state.width, state.height);
        for cell in state.occupancy {
            self.set_cell(cell.x, cell.y, cell.kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = TerrainGrid::new(4, 4);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.cell_at(0, 0), Some(CellKind::Empty));
    }

    #[test]
    fn test_zero_dimensions_clamped() {
        let grid = TerrainGrid::new(0, 0);
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.height(), 1);
    }

    #[test]
    fn test_set_cell_out_of_bounds_ignored() {
        let mut grid = TerrainGrid::new(2, 2);
        grid.set_cell(5, 5, CellKind::Rock);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_snapshot_lists_only_occupied_cells() {
        let mut grid = TerrainGrid::new(8, 8);
        grid.set_cell(1, 2, CellKind::Forest);
        grid.set_cell(3, 4, CellKind::Water);

        let state = grid.snapshot();
        assert_eq!(state.width, 8);
        assert_eq!(state.occupancy.len(), 2);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut grid = TerrainGrid::new(6, 5);
        grid.set_cell(0, 0, CellKind::Rock);
        grid.set_cell(5, 4, CellKind::Fields);

        let mut restored = TerrainGrid::new(1, 1);
        restored.restore(grid.snapshot());

        assert_eq!(restored.width(), 6);
        assert_eq!(restored.height(), 5);
        assert_eq!(restored.cell_at(0, 0), Some(CellKind::Rock));
        assert_eq!(restored.cell_at(5, 4), Some(CellKind::Fields));
        assert_eq!(restored.occupied_count(), 2);
    }

    #[test]
    fn test_default_state_is_usable() {
        let state = TerrainGridState::default();
        assert!(state.width > 0 && state.height > 0);
        assert!(state.occupancy.is_empty());
    }
}
