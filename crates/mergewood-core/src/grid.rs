//! The fixed-size 2D board every item lives on.
//!
//! Cells are Empty, Occupied, or Locked ("cobwebs"). Locked cells are seeded
//! at game start and only ever open through [`Grid::try_unlock_cobweb`],
//! which fires after a merge lands next to them.
//!
//! Invariants, enforced by construction:
//! - `Occupied` if and only if the cell holds an item.
//! - `Locked` cells hold no item and reject every `set` until unlocked.

use crate::fixed::Millis;
use crate::item::Item;
use serde::{Deserialize, Serialize};

/// Occupancy state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Empty,
    Occupied,
    Locked,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Cell {
    state: CellState,
    item: Option<Item>,
}

/// Row-major board of `rows x cols` cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// An empty grid with the given cobweb cells locked. Out-of-range
    /// cobweb coordinates are ignored.
    pub fn new(rows: usize, cols: usize, cobwebs: &[(usize, usize)]) -> Self {
        let mut grid = Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        };
        for &(row, col) in cobwebs {
            if let Some(idx) = grid.index(row, col) {
                grid.cells[idx].state = CellState::Locked;
            }
        }
        grid
    }

    /// Rebuild a grid from saved cell contents and the remaining cobweb
    /// list. Items that would land on a locked cell are dropped rather than
    /// violating the lock invariant.
    pub fn from_saved(
        rows: usize,
        cols: usize,
        cells: &[Option<Item>],
        cobwebs: &[(usize, usize)],
    ) -> Self {
        let mut grid = Self::new(rows, cols, cobwebs);
        for (idx, item) in cells.iter().enumerate().take(grid.cells.len()) {
            if let Some(item) = item {
                grid.set(idx, Some(*item));
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total cell count.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounds-checked linearization of `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }

    /// Inverse of [`Grid::index`]. Callers pass indices previously obtained
    /// from this grid.
    pub fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.cells.get(index).and_then(|c| c.item.as_ref())
    }

    pub fn state(&self, index: usize) -> Option<CellState> {
        self.cells.get(index).map(|c| c.state)
    }

    pub fn cell_is_empty(&self, index: usize) -> bool {
        self.state(index) == Some(CellState::Empty)
    }

    pub fn cell_is_locked(&self, index: usize) -> bool {
        self.state(index) == Some(CellState::Locked)
    }

    pub fn cell_is_occupied(&self, index: usize) -> bool {
        self.state(index) == Some(CellState::Occupied)
    }

    /// Put `item` into the cell (or clear it with `None`). Returns `false`
    /// without mutating on out-of-range indices and on Locked cells.
    pub fn set(&mut self, index: usize, item: Option<Item>) -> bool {
        let Some(cell) = self.cells.get_mut(index) else {
            return false;
        };
        if cell.state == CellState::Locked {
            return false;
        }
        cell.state = if item.is_some() {
            CellState::Occupied
        } else {
            CellState::Empty
        };
        cell.item = item;
        true
    }

    /// Remove and return the cell's item, leaving it Empty. `None` when the
    /// cell is empty, locked, or out of range.
    pub fn take(&mut self, index: usize) -> Option<Item> {
        let cell = self.cells.get_mut(index)?;
        if cell.state != CellState::Occupied {
            return None;
        }
        cell.state = CellState::Empty;
        cell.item.take()
    }

    /// First Empty cell in row-major order. The canonical answer to "any
    /// empty cell", so placement is reproducible.
    pub fn find_empty_cell(&self) -> Option<usize> {
        self.cells
            .iter()
            .position(|c| c.state == CellState::Empty)
    }

    /// Nearest Empty cell to `(row, col)` by expanding Chebyshev rings.
    ///
    /// Within a ring the scan runs `dr` from `-d..=d` and `dc` from
    /// `-d..=d`, visiting only the ring border. This exact order is a
    /// compatibility contract: producer output and scissor splits must land
    /// where they always have.
    pub fn find_empty_cell_near(&self, row: usize, col: usize) -> Option<usize> {
        let max_dist = self.rows.max(self.cols) as isize;
        for dist in 0..=max_dist {
            for dr in -dist..=dist {
                for dc in -dist..=dist {
                    if dr.abs() != dist && dc.abs() != dist {
                        continue;
                    }
                    let r = row as isize + dr;
                    let c = col as isize + dc;
                    if r < 0 || c < 0 {
                        continue;
                    }
                    if let Some(idx) = self.index(r as usize, c as usize) {
                        if self.cells[idx].state == CellState::Empty {
                            return Some(idx);
                        }
                    }
                }
            }
        }
        None
    }

    /// Unlock any Locked cell orthogonally adjacent to `(row, col)`.
    /// Returns the coordinates that opened, in neighbour scan order
    /// (up, down, left, right).
    pub fn try_unlock_cobweb(&mut self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let row = row as isize;
        let col = col as isize;
        let neighbours = [
            (row - 1, col),
            (row + 1, col),
            (row, col - 1),
            (row, col + 1),
        ];
        let mut unlocked = Vec::new();
        for (r, c) in neighbours {
            if r < 0 || c < 0 {
                continue;
            }
            let (r, c) = (r as usize, c as usize);
            if let Some(idx) = self.index(r, c) {
                if self.cells[idx].state == CellState::Locked {
                    self.cells[idx].state = CellState::Empty;
                    unlocked.push((r, c));
                }
            }
        }
        unlocked
    }

    /// Which cell covers the pixel `(px, py)`, given square cells of
    /// `cell_size` pixels. `None` outside the board.
    pub fn hit_test(&self, px: f32, py: f32, cell_size: f32) -> Option<usize> {
        if px < 0.0 || py < 0.0 || cell_size <= 0.0 {
            return None;
        }
        let col = (px / cell_size).floor() as usize;
        let row = (py / cell_size).floor() as usize;
        self.index(row, col)
    }

    /// Number of Empty cells.
    pub fn empty_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.state == CellState::Empty)
            .count()
    }

    /// Iterate `(index, &item)` over occupied cells in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &Item)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.item.as_ref().map(|item| (i, item)))
    }

    /// Indices of bubble pieces whose expiry has passed.
    pub fn expired_bubbles(&self, now: Millis) -> Vec<usize> {
        self.occupied()
            .filter(|(_, item)| item.bubble_expired(now))
            .map(|(i, _)| i)
            .collect()
    }

    /// Cell contents in index order, for the save state.
    pub fn to_cells(&self) -> Vec<Option<Item>> {
        self.cells.iter().map(|c| c.item).collect()
    }

    /// Coordinates of the cells still locked, for the save state.
    pub fn locked_coords(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.state == CellState::Locked)
            .map(|(i, _)| self.row_col(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ChainId;

    fn item() -> Item {
        Item::piece(ChainId(0), 1)
    }

    #[test]
    fn index_round_trip() {
        let grid = Grid::new(9, 7, &[]);
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(1, 0), Some(7));
        assert_eq!(grid.index(8, 6), Some(62));
        assert_eq!(grid.index(9, 0), None);
        assert_eq!(grid.index(0, 7), None);
        assert_eq!(grid.row_col(62), (8, 6));
    }

    #[test]
    fn set_updates_state_and_item() {
        let mut grid = Grid::new(3, 3, &[]);
        assert!(grid.set(4, Some(item())));
        assert!(grid.cell_is_occupied(4));
        assert!(grid.get(4).is_some());
        assert!(grid.set(4, None));
        assert!(grid.cell_is_empty(4));
        assert!(grid.get(4).is_none());
    }

    #[test]
    fn occupied_iff_item_present() {
        let mut grid = Grid::new(3, 3, &[(2, 2)]);
        grid.set(0, Some(item()));
        grid.set(1, Some(item()));
        grid.take(1);
        for idx in 0..grid.len() {
            assert_eq!(
                grid.cell_is_occupied(idx),
                grid.get(idx).is_some(),
                "cell {idx}"
            );
        }
    }

    #[test]
    fn locked_cell_rejects_set() {
        let mut grid = Grid::new(3, 3, &[(1, 1)]);
        let idx = grid.index(1, 1).unwrap();
        assert!(grid.cell_is_locked(idx));
        assert!(!grid.set(idx, Some(item())));
        assert!(grid.get(idx).is_none());
        assert!(!grid.set(idx, None));
        assert!(grid.cell_is_locked(idx));
    }

    #[test]
    fn out_of_range_set_fails() {
        let mut grid = Grid::new(2, 2, &[]);
        assert!(!grid.set(4, Some(item())));
    }

    #[test]
    fn take_returns_item_and_empties() {
        let mut grid = Grid::new(2, 2, &[]);
        grid.set(3, Some(item()));
        assert_eq!(grid.take(3), Some(item()));
        assert!(grid.cell_is_empty(3));
        assert_eq!(grid.take(3), None);
    }

    #[test]
    fn find_empty_cell_is_row_major_first() {
        let mut grid = Grid::new(2, 3, &[(0, 0)]);
        grid.set(1, Some(item()));
        // 0 locked, 1 occupied -> first empty is 2.
        assert_eq!(grid.find_empty_cell(), Some(2));
    }

    #[test]
    fn find_empty_cell_full_grid() {
        let mut grid = Grid::new(2, 2, &[]);
        for idx in 0..4 {
            grid.set(idx, Some(item()));
        }
        assert_eq!(grid.find_empty_cell(), None);
        assert_eq!(grid.find_empty_cell_near(0, 0), None);
    }

    #[test]
    fn near_search_prefers_origin_then_rings() {
        let mut grid = Grid::new(5, 5, &[]);
        // Origin free: distance 0 wins.
        assert_eq!(grid.find_empty_cell_near(2, 2), grid.index(2, 2));
        // Fill everything but one cell at Chebyshev distance 2.
        for idx in 0..grid.len() {
            grid.set(idx, Some(item()));
        }
        let target = grid.index(4, 3).unwrap();
        grid.take(target);
        assert_eq!(grid.find_empty_cell_near(2, 2), Some(target));
    }

    #[test]
    fn near_search_ring_tie_break_order() {
        // Ring 1 around (1,1): scan order is (0,0),(0,1),(0,2),(1,0),(1,2),
        // (2,0),(2,1),(2,2). Leave (1,2) and (2,0) free; (1,2) scans first.
        let mut grid = Grid::new(3, 3, &[]);
        for idx in 0..grid.len() {
            grid.set(idx, Some(item()));
        }
        grid.take(grid.index(1, 2).unwrap());
        grid.take(grid.index(2, 0).unwrap());
        assert_eq!(grid.find_empty_cell_near(1, 1), grid.index(1, 2));
    }

    #[test]
    fn near_search_from_corner() {
        let mut grid = Grid::new(3, 3, &[]);
        grid.set(0, Some(item()));
        // Ring 1 around (0,0) visits (1,0) before (1,1)? Order: dr=-1 row
        // skipped (out of range), dr=0: (0,-1) skip, (0,1); so (0,1) first.
        assert_eq!(grid.find_empty_cell_near(0, 0), grid.index(0, 1));
    }

    #[test]
    fn cobweb_unlock_orthogonal_only() {
        let mut grid = Grid::new(3, 3, &[(0, 0), (0, 1), (1, 0)]);
        // Merge lands at (1,1): (0,1) and (1,0) open, (0,0) is diagonal and
        // stays locked.
        let unlocked = grid.try_unlock_cobweb(1, 1);
        assert_eq!(unlocked, vec![(0, 1), (1, 0)]);
        assert!(grid.cell_is_locked(0));
        assert!(grid.cell_is_empty(1));
        assert!(grid.cell_is_empty(3));
    }

    #[test]
    fn cobweb_unlock_at_edge() {
        let mut grid = Grid::new(2, 2, &[(0, 1)]);
        let unlocked = grid.try_unlock_cobweb(0, 0);
        assert_eq!(unlocked, vec![(0, 1)]);
        // No panic on out-of-range neighbours.
        assert!(grid.try_unlock_cobweb(1, 1).is_empty());
    }

    #[test]
    fn unlocked_cell_accepts_items() {
        let mut grid = Grid::new(2, 2, &[(0, 1)]);
        grid.try_unlock_cobweb(0, 0);
        assert!(grid.set(1, Some(item())));
    }

    #[test]
    fn hit_test_maps_pixels() {
        let grid = Grid::new(9, 7, &[]);
        assert_eq!(grid.hit_test(0.0, 0.0, 40.0), Some(0));
        assert_eq!(grid.hit_test(39.9, 39.9, 40.0), Some(0));
        assert_eq!(grid.hit_test(40.0, 0.0, 40.0), Some(1));
        assert_eq!(grid.hit_test(120.5, 80.0, 40.0), grid.index(2, 3));
        assert_eq!(grid.hit_test(-1.0, 0.0, 40.0), None);
        assert_eq!(grid.hit_test(7.0 * 40.0, 0.0, 40.0), None);
        assert_eq!(grid.hit_test(0.0, 9.0 * 40.0, 40.0), None);
    }

    #[test]
    fn save_round_trip_preserves_locks_and_items() {
        let mut grid = Grid::new(3, 3, &[(2, 2), (2, 1)]);
        grid.set(0, Some(item()));
        grid.try_unlock_cobweb(2, 0); // opens (2,1)
        let cells = grid.to_cells();
        let cobwebs = grid.locked_coords();
        assert_eq!(cobwebs, vec![(2, 2)]);

        let restored = Grid::from_saved(3, 3, &cells, &cobwebs);
        assert_eq!(restored.get(0), Some(&item()));
        assert!(restored.cell_is_locked(restored.index(2, 2).unwrap()));
        assert!(restored.cell_is_empty(restored.index(2, 1).unwrap()));
    }

    #[test]
    fn expired_bubbles_reported() {
        let mut grid = Grid::new(2, 2, &[]);
        grid.set(0, Some(Item::bubble(ChainId(0), 1, 500)));
        grid.set(1, Some(item()));
        assert!(grid.expired_bubbles(499).is_empty());
        assert_eq!(grid.expired_bubbles(500), vec![0]);
    }
}
