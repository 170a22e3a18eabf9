//! The energy pool that powers tap-to-produce.
//!
//! Regenerates on a fixed interval while the game runs, and catches up in a
//! single step on load: elapsed offline time is converted to whole regen
//! ticks, never simulated tick-by-tick.

use crate::error::ActionError;
use crate::fixed::Millis;
use crate::id::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyPool {
    current: u32,
    max: u32,
    /// Host time of the last applied regeneration step.
    last_regen: Millis,
}

impl EnergyPool {
    /// A full pool.
    pub fn new(max: u32, now: Millis) -> Self {
        Self {
            current: max,
            max,
            last_regen: now,
        }
    }

    /// Restore from saved values, clamping to the configured max.
    pub fn from_saved(current: u32, last_regen: Millis, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
            last_regen,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn last_regen(&self) -> Millis {
        self.last_regen
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.current >= amount
    }

    /// Debit `amount`, or fail with no change.
    pub fn consume(&mut self, amount: u32) -> Result<(), ActionError> {
        if self.current < amount {
            return Err(ActionError::InsufficientResource(Resource::Energy));
        }
        self.current -= amount;
        Ok(())
    }

    /// Credit `amount`, clamped to max.
    pub fn add(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// One scheduled regeneration step.
    pub fn regen_step(&mut self, amount: u32, now: Millis) {
        self.add(amount);
        self.last_regen = now;
    }

    /// Apply all regeneration owed since `last_regen` in one step. Returns
    /// the number of whole intervals applied. `last_regen` only advances
    /// when at least one interval elapsed, so partial intervals are never
    /// lost.
    pub fn catch_up(&mut self, interval_ms: Millis, amount: u32, now: Millis) -> u64 {
        if interval_ms == 0 || now <= self.last_regen {
            return 0;
        }
        let ticks = (now - self.last_regen) / interval_ms;
        if ticks > 0 {
            let gained = (ticks * amount as u64).min(u32::MAX as u64) as u32;
            self.add(gained);
            self.last_regen = now;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_and_add() {
        let mut pool = EnergyPool::new(100, 0);
        pool.consume(30).unwrap();
        assert_eq!(pool.current(), 70);
        pool.add(50);
        assert_eq!(pool.current(), 100); // clamped
    }

    #[test]
    fn consume_shortfall_fails_without_change() {
        let mut pool = EnergyPool::from_saved(2, 0, 100);
        assert_eq!(
            pool.consume(3),
            Err(ActionError::InsufficientResource(Resource::Energy))
        );
        assert_eq!(pool.current(), 2);
    }

    #[test]
    fn offline_catch_up_is_one_step() {
        // 5 intervals elapsed, 3 below max: gain min(3, 5) = 3, capped.
        let interval = 120_000;
        let mut pool = EnergyPool::from_saved(97, 0, 100);
        let ticks = pool.catch_up(interval, 1, 5 * interval);
        assert_eq!(ticks, 5);
        assert_eq!(pool.current(), 100);
        assert_eq!(pool.last_regen(), 5 * interval);
    }

    #[test]
    fn partial_interval_not_lost() {
        let mut pool = EnergyPool::from_saved(50, 0, 100);
        assert_eq!(pool.catch_up(120_000, 1, 119_999), 0);
        // last_regen unchanged, so the partial interval still counts later.
        assert_eq!(pool.last_regen(), 0);
        assert_eq!(pool.catch_up(120_000, 1, 120_000), 1);
        assert_eq!(pool.current(), 51);
    }

    #[test]
    fn regen_step_advances_timestamp() {
        let mut pool = EnergyPool::from_saved(50, 0, 100);
        pool.regen_step(1, 120_000);
        assert_eq!(pool.current(), 51);
        assert_eq!(pool.last_regen(), 120_000);
    }

    #[test]
    fn saved_current_clamped_to_max() {
        let pool = EnergyPool::from_saved(500, 0, 100);
        assert_eq!(pool.current(), 100);
    }
}
