//! Consumable power-ups: scissors (split), wildcard placement, hourglass
//! (cooldown reset).
//!
//! Each power is an independent charge count. A use with zero charges
//! fails before touching any other state, and a use that fails for any
//! other reason keeps its charge.

use crate::error::ActionError;
use crate::grid::Grid;
use crate::id::{ProducerId, Resource, SpecialKind};
use crate::item::Item;
use crate::producer::ProducerEngine;
use serde::{Deserialize, Serialize};

/// What a scissors use produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    pub chain: crate::id::ChainId,
    /// Level of the two resulting pieces (one below the original).
    pub level: u8,
    /// The original cell, now holding the first half.
    pub replaced_index: usize,
    /// The nearby cell holding the second half.
    pub placed_index: usize,
}

/// Charge counts for the three power-ups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialItems {
    scissors: u32,
    wildcard: u32,
    hourglass: u32,
}

impl SpecialItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(scissors: u32, wildcard: u32, hourglass: u32) -> Self {
        Self {
            scissors,
            wildcard,
            hourglass,
        }
    }

    pub fn count(&self, kind: SpecialKind) -> u32 {
        match kind {
            SpecialKind::Scissors => self.scissors,
            SpecialKind::Wildcard => self.wildcard,
            SpecialKind::Hourglass => self.hourglass,
        }
    }

    /// Credit charges (shop purchases, rewards).
    pub fn add(&mut self, kind: SpecialKind, amount: u32) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
    }

    fn slot_mut(&mut self, kind: SpecialKind) -> &mut u32 {
        match kind {
            SpecialKind::Scissors => &mut self.scissors,
            SpecialKind::Wildcard => &mut self.wildcard,
            SpecialKind::Hourglass => &mut self.hourglass,
        }
    }

    fn require_charge(&self, kind: SpecialKind) -> Result<(), ActionError> {
        if self.count(kind) == 0 {
            return Err(ActionError::InsufficientResource(Resource::Charges));
        }
        Ok(())
    }

    /// Split the piece at `target` into two pieces one level lower: one in
    /// place, one in the nearest empty cell.
    pub fn use_scissors(
        &mut self,
        grid: &mut Grid,
        target: usize,
    ) -> Result<SplitOutcome, ActionError> {
        self.require_charge(SpecialKind::Scissors)?;
        let item = grid.get(target).ok_or(ActionError::InvalidTarget)?;
        if item.is_locked() {
            return Err(ActionError::InvalidTarget);
        }
        let (chain, level) = item.as_piece().ok_or(ActionError::InvalidTarget)?;
        if level <= 1 {
            return Err(ActionError::InvalidTarget);
        }

        let (row, col) = grid.row_col(target);
        // The original cell is replaced, so one nearby cell is enough.
        let placed_index = grid
            .find_empty_cell_near(row, col)
            .ok_or(ActionError::NoSpace)?;

        let half = Item::piece(chain, level - 1);
        grid.set(target, Some(half));
        grid.set(placed_index, Some(half));
        self.scissors -= 1;

        Ok(SplitOutcome {
            chain,
            level: level - 1,
            replaced_index: target,
            placed_index,
        })
    }

    /// Place a wildcard token in the first empty cell. It is consumed by
    /// its next merge.
    pub fn use_wildcard(&mut self, grid: &mut Grid) -> Result<usize, ActionError> {
        self.require_charge(SpecialKind::Wildcard)?;
        let index = grid.find_empty_cell().ok_or(ActionError::NoSpace)?;
        grid.set(index, Some(Item::Wildcard));
        self.wildcard -= 1;
        Ok(index)
    }

    /// Return a producer to Ready, whatever its buffer and cooldown were.
    pub fn use_hourglass(
        &mut self,
        producers: &mut ProducerEngine,
        producer: ProducerId,
    ) -> Result<(), ActionError> {
        self.require_charge(SpecialKind::Hourglass)?;
        if producers.state(producer).is_none() {
            return Err(ActionError::InvalidTarget);
        }
        producers.reset_cooldown(producer);
        self.hourglass -= 1;
        Ok(())
    }
}
