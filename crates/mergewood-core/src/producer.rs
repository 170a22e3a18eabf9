//! Per-producer emission state machine.
//!
//! A producer is Ready while its buffer has room (and, for consumables,
//! uses remain). Exhausting the buffer starts a cooldown; once the cooldown
//! elapses the buffer resets and emission resumes. Consumables that reach
//! zero uses are Depleted for good: the marker stays on the board, inert.
//!
//! Emission order of operations is fixed: preconditions, cooldown, space,
//! and only then any cost debit. A failed attempt never costs anything.

use crate::energy::EnergyPool;
use crate::error::ActionError;
use crate::fixed::Millis;
use crate::grid::Grid;
use crate::id::{ChainId, ProducerId};
use crate::item::Item;
use crate::registry::{ProducerDef, ProducerKind, Registry};
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mutable state for one unlocked producer. Survives while the producer is
/// unlocked, even when its marker is off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerState {
    /// Emissions performed since the last buffer reset.
    pub buffer_used: u32,
    /// When the current cooldown began, if one is running.
    pub cooldown_start: Option<Millis>,
    /// Remaining uses for consumables; `None` means unlimited.
    pub uses_left: Option<u32>,
    /// Cell of the producer's marker, if currently placed.
    pub grid_index: Option<usize>,
}

impl ProducerState {
    fn fresh(def: &ProducerDef) -> Self {
        Self {
            buffer_used: 0,
            cooldown_start: None,
            uses_left: match def.kind {
                ProducerKind::Consumable { max_uses } => Some(max_uses),
                _ => None,
            },
            grid_index: None,
        }
    }
}

/// A successful emission: what landed where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emission {
    pub index: usize,
    pub chain: ChainId,
    pub level: u8,
}

/// Buffer/cooldown summary for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    /// Emissions left before the cooldown starts.
    pub remaining: u32,
    pub total: u32,
    /// Milliseconds of cooldown left; zero when not cooling.
    pub cooldown_remaining_ms: Millis,
}

/// Owns the state of every unlocked producer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerEngine {
    states: BTreeMap<ProducerId, ProducerState>,
}

impl ProducerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a saved state map, creating fresh state for any
    /// unlocked producer the save does not know about.
    pub fn from_saved(
        saved: &BTreeMap<ProducerId, ProducerState>,
        unlocked: &[ProducerId],
        registry: &Registry,
    ) -> Self {
        let mut engine = Self::new();
        for &id in unlocked {
            let Some(def) = registry.producer(id) else {
                continue;
            };
            let state = saved.get(&id).copied().unwrap_or_else(|| ProducerState::fresh(def));
            engine.states.insert(id, state);
        }
        engine
    }

    /// Ensure state exists for a newly unlocked producer.
    pub fn unlock(&mut self, id: ProducerId, def: &ProducerDef) {
        self.states.entry(id).or_insert_with(|| ProducerState::fresh(def));
    }

    pub fn state(&self, id: ProducerId) -> Option<&ProducerState> {
        self.states.get(&id)
    }

    pub fn state_mut(&mut self, id: ProducerId) -> Option<&mut ProducerState> {
        self.states.get_mut(&id)
    }

    /// The saved representation.
    pub fn states(&self) -> &BTreeMap<ProducerId, ProducerState> {
        &self.states
    }

    /// Place (or re-place) the producer's marker at the first empty cell.
    pub fn place_on_grid(
        &mut self,
        id: ProducerId,
        registry: &Registry,
        grid: &mut Grid,
    ) -> Result<usize, ActionError> {
        let def = registry.producer(id).ok_or(ActionError::InvalidTarget)?;
        let index = grid.find_empty_cell().ok_or(ActionError::NoSpace)?;
        grid.set(index, Some(Item::ProducerMarker(id)));
        let state = self.states.entry(id).or_insert_with(|| ProducerState::fresh(def));
        state.grid_index = Some(index);
        Ok(index)
    }

    /// Player-driven emission for Energy and Consumable producers.
    pub fn tap_produce(
        &mut self,
        id: ProducerId,
        registry: &Registry,
        grid: &mut Grid,
        energy: &mut EnergyPool,
        rng: &mut GameRng,
        now: Millis,
    ) -> Result<Emission, ActionError> {
        let def = registry.producer(id).ok_or(ActionError::InvalidTarget)?;
        let state = self.states.get_mut(&id).ok_or(ActionError::InvalidTarget)?;

        match def.kind {
            ProducerKind::Energy { cost } => {
                if !energy.can_afford(cost) {
                    return Err(ActionError::InsufficientResource(
                        crate::id::Resource::Energy,
                    ));
                }
            }
            ProducerKind::Consumable { .. } => {
                if state.uses_left.unwrap_or(0) == 0 {
                    return Err(ActionError::Depleted);
                }
            }
            // Auto producers are driven by the scheduler, not taps.
            ProducerKind::Auto { .. } => return Err(ActionError::InvalidTarget),
        }

        if state.buffer_used >= def.buffer {
            if let Some(start) = state.cooldown_start {
                let elapsed = now.saturating_sub(start);
                if elapsed < def.cooldown_ms {
                    return Err(ActionError::StillCooling {
                        remaining_ms: def.cooldown_ms - elapsed,
                    });
                }
            }
            state.buffer_used = 0;
            state.cooldown_start = None;
        }

        let marker = state.grid_index.ok_or(ActionError::InvalidTarget)?;
        let (row, col) = grid.row_col(marker);
        let target = grid.find_empty_cell_near(row, col).ok_or(ActionError::NoSpace)?;

        // Space is confirmed; only now does the attempt cost anything.
        match def.kind {
            ProducerKind::Energy { cost } => energy.consume(cost)?,
            ProducerKind::Consumable { .. } => {
                if let Some(uses) = state.uses_left.as_mut() {
                    *uses = uses.saturating_sub(1);
                }
            }
            ProducerKind::Auto { .. } => {}
        }

        let emission = roll_and_place(def, grid, rng, target);
        state.buffer_used += 1;
        if state.buffer_used >= def.buffer {
            state.cooldown_start = Some(now);
        }
        Ok(emission)
    }

    /// Scheduler-driven emission for Auto producers. Failures (off-board,
    /// cooling, no space) skip the tick silently.
    pub fn auto_tick(
        &mut self,
        id: ProducerId,
        registry: &Registry,
        grid: &mut Grid,
        rng: &mut GameRng,
        now: Millis,
    ) -> Option<Emission> {
        let def = registry.producer(id)?;
        if !matches!(def.kind, ProducerKind::Auto { .. }) {
            return None;
        }
        let state = self.states.get_mut(&id)?;
        let marker = state.grid_index?;

        if state.buffer_used >= def.buffer {
            let start = *state.cooldown_start.get_or_insert(now);
            if now.saturating_sub(start) < def.cooldown_ms {
                return None;
            }
            state.buffer_used = 0;
            state.cooldown_start = None;
        }

        let (row, col) = grid.row_col(marker);
        let target = grid.find_empty_cell_near(row, col)?;

        let emission = roll_and_place(def, grid, rng, target);
        state.buffer_used += 1;
        if state.buffer_used >= def.buffer {
            state.cooldown_start = Some(now);
        }
        Some(emission)
    }

    /// Hourglass effect: back to Ready regardless of prior state.
    pub fn reset_cooldown(&mut self, id: ProducerId) {
        if let Some(state) = self.states.get_mut(&id) {
            state.buffer_used = 0;
            state.cooldown_start = None;
        }
    }

    /// Buffer/cooldown summary for the UI.
    pub fn buffer_info(&self, id: ProducerId, registry: &Registry, now: Millis) -> Option<BufferInfo> {
        let def = registry.producer(id)?;
        let state = self.states.get(&id)?;
        let cooldown_remaining_ms = match state.cooldown_start {
            Some(start) if state.buffer_used >= def.buffer => {
                def.cooldown_ms.saturating_sub(now.saturating_sub(start))
            }
            _ => 0,
        };
        Some(BufferInfo {
            remaining: def.buffer.saturating_sub(state.buffer_used),
            total: def.buffer,
            cooldown_remaining_ms,
        })
    }
}

/// Roll the drop table and place the result. The cell was verified Empty by
/// the caller.
fn roll_and_place(def: &ProducerDef, grid: &mut Grid, rng: &mut GameRng, target: usize) -> Emission {
    let weights: Vec<u32> = def.drop_table.iter().map(|d| d.weight).collect();
    let drop = def.drop_table[rng.weighted_index(&weights)];
    grid.set(target, Some(Item::piece(drop.chain, drop.level)));
    Emission {
        index: target,
        chain: drop.chain,
        level: drop.level,
    }
}
