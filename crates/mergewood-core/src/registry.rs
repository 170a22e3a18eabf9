//! Immutable game-data registry: merge chains, producer definitions, and
//! village areas. Built once at startup through [`RegistryBuilder`]
//! (registration, then validation, then freeze) and shared read-only with
//! every subsystem.

use crate::fixed::{Fixed64, Millis, f64_to_fixed64};
use crate::id::{AreaId, ChainId, ProducerId};
use std::collections::HashMap;

/// One level of a merge chain: display data only, the engine cares about
/// position.
#[derive(Debug, Clone)]
pub struct PieceDef {
    pub name: String,
    pub icon: String,
    pub color: String,
}

/// An ordered progression of piece definitions. Level `n` is
/// `pieces[n - 1]`; two pieces of level `n` merge into one of `n + 1`.
#[derive(Debug, Clone)]
pub struct ChainDef {
    pub name: String,
    pub pieces: Vec<PieceDef>,
}

impl ChainDef {
    /// Highest reachable level.
    pub fn max_level(&self) -> u8 {
        self.pieces.len() as u8
    }
}

/// What makes a producer emit, and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerKind {
    /// Player taps; each emission costs energy.
    Energy { cost: u32 },
    /// Emits on its own fixed interval, no player input.
    Auto { interval_ms: Millis },
    /// Player taps; a finite number of uses, then permanently inert.
    Consumable { max_uses: u32 },
}

/// A weighted drop-table row.
#[derive(Debug, Clone, Copy)]
pub struct DropEntry {
    pub chain: ChainId,
    pub level: u8,
    pub weight: u32,
}

/// A producer definition.
#[derive(Debug, Clone)]
pub struct ProducerDef {
    pub name: String,
    pub icon: String,
    /// The chain this producer represents (orders draw from active
    /// producers' chains).
    pub chain: ChainId,
    pub kind: ProducerKind,
    /// Emissions allowed before the cooldown starts.
    pub buffer: u32,
    pub cooldown_ms: Millis,
    pub drop_table: Vec<DropEntry>,
    /// Position in the village unlock sequence.
    pub unlock_order: u32,
}

/// A single repair task within a village area.
#[derive(Debug, Clone)]
pub struct TaskDef {
    pub name: String,
    pub star_cost: u64,
}

/// A village area: a named list of star-priced repair tasks. Areas unlock
/// in registration order.
#[derive(Debug, Clone)]
pub struct AreaDef {
    pub name: String,
    pub icon: String,
    pub tasks: Vec<TaskDef>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid chain reference: {0:?}")]
    InvalidChainRef(ChainId),
    #[error("drop level {level} out of range for chain {chain:?}")]
    InvalidDropLevel { chain: ChainId, level: u8 },
    #[error("producer {0:?} has an empty drop table")]
    EmptyDropTable(ProducerId),
}

/// Builder for constructing an immutable [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    chains: Vec<ChainDef>,
    chain_name_to_id: HashMap<String, ChainId>,
    producers: Vec<ProducerDef>,
    producer_name_to_id: HashMap<String, ProducerId>,
    areas: Vec<AreaDef>,
    area_name_to_id: HashMap<String, AreaId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a merge chain. Returns its ID.
    pub fn register_chain(&mut self, name: &str, pieces: Vec<PieceDef>) -> ChainId {
        let id = ChainId(self.chains.len() as u32);
        self.chains.push(ChainDef {
            name: name.to_string(),
            pieces,
        });
        self.chain_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a producer. Returns its ID.
    pub fn register_producer(&mut self, def: ProducerDef) -> ProducerId {
        let id = ProducerId(self.producers.len() as u32);
        self.producer_name_to_id.insert(def.name.clone(), id);
        self.producers.push(def);
        id
    }

    /// Register a village area. Areas unlock in registration order.
    pub fn register_area(&mut self, name: &str, icon: &str, tasks: Vec<TaskDef>) -> AreaId {
        let id = AreaId(self.areas.len() as u32);
        self.areas.push(AreaDef {
            name: name.to_string(),
            icon: icon.to_string(),
            tasks,
        });
        self.area_name_to_id.insert(name.to_string(), id);
        id
    }

    pub fn chain_id(&self, name: &str) -> Option<ChainId> {
        self.chain_name_to_id.get(name).copied()
    }

    /// Validate cross-references and freeze.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let chain_count = self.chains.len() as u32;
        for (i, producer) in self.producers.iter().enumerate() {
            if producer.chain.0 >= chain_count {
                return Err(RegistryError::InvalidChainRef(producer.chain));
            }
            if producer.drop_table.is_empty() {
                return Err(RegistryError::EmptyDropTable(ProducerId(i as u32)));
            }
            for entry in &producer.drop_table {
                let chain = self
                    .chains
                    .get(entry.chain.0 as usize)
                    .ok_or(RegistryError::InvalidChainRef(entry.chain))?;
                if entry.level == 0 || entry.level > chain.max_level() {
                    return Err(RegistryError::InvalidDropLevel {
                        chain: entry.chain,
                        level: entry.level,
                    });
                }
            }
        }
        Ok(Registry {
            chains: self.chains,
            chain_name_to_id: self.chain_name_to_id,
            producers: self.producers,
            producer_name_to_id: self.producer_name_to_id,
            areas: self.areas,
            area_name_to_id: self.area_name_to_id,
        })
    }
}

/// Immutable registry. Frozen after build; thread-safe to share.
#[derive(Debug)]
pub struct Registry {
    chains: Vec<ChainDef>,
    chain_name_to_id: HashMap<String, ChainId>,
    producers: Vec<ProducerDef>,
    producer_name_to_id: HashMap<String, ProducerId>,
    areas: Vec<AreaDef>,
    area_name_to_id: HashMap<String, AreaId>,
}

impl Registry {
    pub fn chain(&self, id: ChainId) -> Option<&ChainDef> {
        self.chains.get(id.0 as usize)
    }

    pub fn producer(&self, id: ProducerId) -> Option<&ProducerDef> {
        self.producers.get(id.0 as usize)
    }

    pub fn area(&self, id: AreaId) -> Option<&AreaDef> {
        self.areas.get(id.0 as usize)
    }

    pub fn chain_id(&self, name: &str) -> Option<ChainId> {
        self.chain_name_to_id.get(name).copied()
    }

    pub fn producer_id(&self, name: &str) -> Option<ProducerId> {
        self.producer_name_to_id.get(name).copied()
    }

    pub fn area_id(&self, name: &str) -> Option<AreaId> {
        self.area_name_to_id.get(name).copied()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Max level for a chain; 0 for an unknown id.
    pub fn max_level(&self, chain: ChainId) -> u8 {
        self.chain(chain).map(|c| c.max_level()).unwrap_or(0)
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        (0..self.chains.len() as u32).map(ChainId)
    }

    /// Producer ids sorted by their village unlock order.
    pub fn producers_by_unlock_order(&self) -> Vec<ProducerId> {
        let mut ids: Vec<ProducerId> = (0..self.producers.len() as u32).map(ProducerId).collect();
        ids.sort_by_key(|id| self.producers[id.0 as usize].unlock_order);
        ids
    }

    /// Areas unlock in registration order; the area after `id`, if any.
    pub fn next_area(&self, id: AreaId) -> Option<AreaId> {
        let next = id.0 + 1;
        (next < self.areas.len() as u32).then_some(AreaId(next))
    }
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Numeric knobs that shape the whole game. Defaults mirror the shipped
/// balance; data files may override any of them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Tuning {
    pub grid_rows: usize,
    pub grid_cols: usize,

    pub energy_max: u32,
    pub energy_regen_interval_ms: Millis,
    pub energy_regen_amount: u32,

    /// Sell price = floor(level * sell_multiplier * 2).
    pub sell_multiplier: Fixed64,

    pub bubble_duration_ms: Millis,
    /// Bubble spawn chance after a merge = base + result_level * per_level.
    pub bubble_base_chance: Fixed64,
    pub bubble_per_level_chance: Fixed64,

    pub order_slots: usize,
    pub order_refresh_interval_ms: Millis,
    pub order_respawn_delay_ms: Millis,
    pub fulfill_poll_ms: Millis,

    /// Merging at or above this level pays an immediate coin bonus.
    pub high_tier_bonus_level: u8,
    pub high_tier_bonus_coins_per_level: u64,

    pub inventory_initial_slots: usize,
    pub inventory_max_slots: usize,
    pub inventory_expand_base_cost: u64,
    pub inventory_expand_multiplier: Fixed64,

    pub active_producer_limit: usize,
    pub starting_gems: u64,
    pub starter_piece_count: usize,

    /// Cells locked at the start of a new game.
    pub initial_cobwebs: Vec<(usize, usize)>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid_rows: 9,
            grid_cols: 7,
            energy_max: 100,
            energy_regen_interval_ms: 120_000,
            energy_regen_amount: 1,
            sell_multiplier: f64_to_fixed64(0.5),
            bubble_duration_ms: 60_000,
            bubble_base_chance: f64_to_fixed64(0.05),
            bubble_per_level_chance: f64_to_fixed64(0.02),
            order_slots: 3,
            order_refresh_interval_ms: 300_000,
            order_respawn_delay_ms: 2_000,
            fulfill_poll_ms: 2_000,
            high_tier_bonus_level: 5,
            high_tier_bonus_coins_per_level: 5,
            inventory_initial_slots: 0,
            inventory_max_slots: 28,
            inventory_expand_base_cost: 5,
            inventory_expand_multiplier: f64_to_fixed64(1.5),
            active_producer_limit: 5,
            starting_gems: 10,
            starter_piece_count: 3,
            initial_cobwebs: vec![
                (6, 5),
                (6, 6),
                (7, 4),
                (7, 5),
                (7, 6),
                (8, 3),
                (8, 4),
                (8, 5),
                (8, 6),
            ],
        }
    }
}
