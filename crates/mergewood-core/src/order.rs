//! Randomized fulfillment requests, scanned against the board.
//!
//! A fixed number of slots each hold one order. Fulfillment never reserves
//! a board item for more than one requirement: a single pass walks the
//! slots in index order with one shared reservation set, so the first order
//! scanned wins a contested item. Completing an order re-runs the same
//! scan-and-consume logic and physically removes one qualifying piece per
//! requirement — all or nothing.

use crate::error::ActionError;
use crate::grid::Grid;
use crate::id::ChainId;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Order difficulty tier. Fixes the requirement count, the level range and
/// the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// The tier a slot always rolls: Easy/Medium/Hard for the first three
    /// slots, Easy beyond that.
    pub fn for_slot(slot: usize) -> Self {
        match slot {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            2 => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }

    pub fn requirement_count(self) -> usize {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Highest level a requirement may ask for.
    pub fn max_level(self) -> u8 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }

    pub fn reward(self) -> Reward {
        match self {
            Difficulty::Easy => Reward { coins: 5, stars: 1 },
            Difficulty::Medium => Reward { coins: 15, stars: 2 },
            Difficulty::Hard => Reward { coins: 30, stars: 4 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub coins: u64,
    pub stars: u64,
}

/// One requested piece. Any piece of the chain at the level *or higher*
/// satisfies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub chain: ChainId,
    pub level: u8,
    pub fulfilled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub requirements: Vec<Requirement>,
    pub reward: Reward,
    pub difficulty: Difficulty,
}

impl Order {
    pub fn is_ready(&self) -> bool {
        self.requirements.iter().all(|r| r.fulfilled)
    }
}

/// The fixed row of order slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBoard {
    slots: Vec<Option<Order>>,
}

impl OrderBoard {
    /// `slot_count` empty slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// Restore saved slots, padded or truncated to `slot_count`.
    pub fn from_saved(saved: &[Option<Order>], slot_count: usize) -> Self {
        let mut board = Self::new(slot_count);
        for (slot, order) in board.slots.iter_mut().zip(saved.iter()) {
            *slot = order.clone();
        }
        board
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&Order> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn slots(&self) -> &[Option<Order>] {
        &self.slots
    }

    /// Generate one order. Each requirement draws a uniform chain from
    /// `chains` and a uniform level in `1..=max_level`.
    pub fn generate(difficulty: Difficulty, chains: &[ChainId], rng: &mut GameRng) -> Order {
        let requirements = (0..difficulty.requirement_count())
            .map(|_| Requirement {
                // An empty chain list degrades to the first registered chain.
                chain: chains
                    .get(rng.next_below(chains.len() as u32) as usize)
                    .copied()
                    .unwrap_or(ChainId(0)),
                level: rng.next_below(difficulty.max_level() as u32) as u8 + 1,
                fulfilled: false,
            })
            .collect();
        Order {
            requirements,
            reward: difficulty.reward(),
            difficulty,
        }
    }

    /// Fill every empty slot with a fresh order of the slot's tier.
    /// Returns the indices that were filled.
    pub fn fill_empty(&mut self, chains: &[ChainId], rng: &mut GameRng) -> Vec<usize> {
        let mut filled = Vec::new();
        for index in 0..self.slots.len() {
            if self.slots[index].is_none() {
                self.slots[index] =
                    Some(Self::generate(Difficulty::for_slot(index), chains, rng));
                filled.push(index);
            }
        }
        filled
    }

    /// Respawn one cleared slot (scheduled after a completion).
    pub fn respawn_slot(&mut self, index: usize, chains: &[ChainId], rng: &mut GameRng) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_none() {
                *slot = Some(Self::generate(Difficulty::for_slot(index), chains, rng));
            }
        }
    }

    /// Recompute every `fulfilled` flag against the board.
    ///
    /// One shared reservation set spans all orders: a piece satisfies at
    /// most one requirement per pass, first come first served in slot then
    /// requirement order.
    pub fn check_fulfillment(&mut self, grid: &Grid) {
        let mut used = HashSet::new();
        for order in self.slots.iter_mut().flatten() {
            for requirement in &mut order.requirements {
                requirement.fulfilled =
                    match find_match(grid, requirement.chain, requirement.level, &used) {
                        Some(index) => {
                            used.insert(index);
                            true
                        }
                        None => false,
                    };
            }
        }
    }

    /// Consume the order in `slot`: remove one qualifying piece per
    /// requirement from the board and clear the slot. Fails with no state
    /// change if any requirement cannot be satisfied right now.
    pub fn complete(&mut self, slot: usize, grid: &mut Grid) -> Result<Order, ActionError> {
        let order = self
            .slots
            .get(slot)
            .and_then(|s| s.as_ref())
            .ok_or(ActionError::InvalidTarget)?;

        let mut used = HashSet::new();
        let mut consumed = Vec::with_capacity(order.requirements.len());
        for requirement in &order.requirements {
            let index = find_match(grid, requirement.chain, requirement.level, &used)
                .ok_or(ActionError::InvalidTarget)?;
            used.insert(index);
            consumed.push(index);
        }
        for index in consumed {
            grid.take(index);
        }
        // Checked non-None above.
        let order = self.slots[slot].take().ok_or(ActionError::InvalidTarget)?;
        Ok(order)
    }

    /// Clear a slot without completing it (periodic staleness refresh).
    pub fn clear_slot(&mut self, index: usize) -> Option<Order> {
        self.slots.get_mut(index).and_then(|s| s.take())
    }
}

/// First unreserved, unlocked, non-marker piece matching `chain` at
/// `level` or above, scanning cells in index order.
fn find_match(grid: &Grid, chain: ChainId, level: u8, used: &HashSet<usize>) -> Option<usize> {
    grid.occupied()
        .filter(|(index, item)| !used.contains(index) && !item.is_locked())
        .find(|(_, item)| {
            item.as_piece()
                .is_some_and(|(c, l)| c == chain && l >= level)
        })
        .map(|(index, _)| index)
}
