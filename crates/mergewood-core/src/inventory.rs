//! Bounded side storage, decoupled from the board.
//!
//! Items move between grid and inventory by ownership transfer; a slot is
//! either empty or holds exactly one item. Slots are bought with gems at a
//! geometrically growing price.

use crate::error::ActionError;
use crate::fixed::Fixed64;
use crate::item::Item;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Option<Item>>,
}

impl Inventory {
    /// An inventory with `slots` empty slots.
    pub fn new(slots: usize) -> Self {
        Self {
            items: vec![None; slots],
        }
    }

    /// Restore from saved items, padded or truncated to `slots`.
    pub fn from_saved(slots: usize, items: &[Option<Item>]) -> Self {
        let mut inv = Self::new(slots);
        for (slot, item) in inv.items.iter_mut().zip(items.iter()) {
            *slot = *item;
        }
        inv
    }

    /// Unlocked slot count.
    pub fn slots(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, slot: usize) -> Option<&Item> {
        self.items.get(slot).and_then(|i| i.as_ref())
    }

    pub fn free_slots(&self) -> usize {
        self.items.iter().filter(|i| i.is_none()).count()
    }

    /// Put `item` into the first free slot and return its index.
    pub fn store(&mut self, item: Item) -> Result<usize, ActionError> {
        let slot = self
            .items
            .iter()
            .position(|i| i.is_none())
            .ok_or(ActionError::NoSpace)?;
        self.items[slot] = Some(item);
        Ok(slot)
    }

    /// Remove and return the item in `slot`.
    pub fn take(&mut self, slot: usize) -> Option<Item> {
        self.items.get_mut(slot).and_then(|i| i.take())
    }

    /// Gem price of the next slot:
    /// `floor(base * multiplier^(slots / 7))` (integer division).
    pub fn expand_cost(&self, base: u64, multiplier: Fixed64) -> u64 {
        let exponent = self.slots() / 7;
        let mut factor = Fixed64::from_num(1);
        for _ in 0..exponent {
            factor *= multiplier;
        }
        (Fixed64::from_num(base) * factor).to_num::<u64>()
    }

    /// Append one empty slot, up to `max_slots`.
    pub fn add_slot(&mut self, max_slots: usize) -> Result<(), ActionError> {
        if self.slots() >= max_slots {
            return Err(ActionError::NoSpace);
        }
        self.items.push(None);
        Ok(())
    }

    /// Saved representation: the slot contents in order.
    pub fn items(&self) -> &[Option<Item>] {
        &self.items
    }
}
