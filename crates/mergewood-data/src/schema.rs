//! Serde data file structs for game content definitions.
//!
//! These structs define the on-disk format for merge chains, producers,
//! village areas, and tuning overrides. They are deserialized from RON,
//! JSON, or TOML data files and then resolved into registry types by the
//! loader.

use serde::Deserialize;

// ===========================================================================
// Chains
// ===========================================================================

/// A merge chain definition in a data file. Pieces are listed lowest level
/// first; two pieces of one level merge into one of the next.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainData {
    pub name: String,
    pub pieces: Vec<PieceData>,
}

/// One level of a chain: display data only.
#[derive(Debug, Clone, Deserialize)]
pub struct PieceData {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_icon() -> String {
    "?".to_string()
}

fn default_color() -> String {
    "#888888".to_string()
}

// ===========================================================================
// Producers
// ===========================================================================

/// A producer definition in a data file. The chain and drop-table entries
/// reference chains by name; the loader resolves them to ids.
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerData {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    pub chain: String,
    pub kind: ProducerKindData,
    #[serde(default = "default_buffer")]
    pub buffer: u32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    pub drop_table: Vec<DropData>,
    #[serde(default)]
    pub unlock_order: u32,
}

fn default_buffer() -> u32 {
    12
}

fn default_cooldown_ms() -> u64 {
    1_200_000
}

/// What makes a producer emit, and what it costs.
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum ProducerKindData {
    Energy { cost: u32 },
    Auto { interval_ms: u64 },
    Consumable { max_uses: u32 },
}

/// A drop-table row, supporting both short tuple form and full form with
/// an optional weight.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DropData {
    /// Short form: `("chain_name", level, weight)`.
    Short(String, u8, u32),
    /// Full form with explicit fields.
    Full {
        chain: String,
        level: u8,
        #[serde(default = "default_weight")]
        weight: u32,
    },
}

fn default_weight() -> u32 {
    1
}

impl DropData {
    pub fn chain(&self) -> &str {
        match self {
            DropData::Short(chain, _, _) => chain,
            DropData::Full { chain, .. } => chain,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            DropData::Short(_, level, _) => *level,
            DropData::Full { level, .. } => *level,
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            DropData::Short(_, _, weight) => *weight,
            DropData::Full { weight, .. } => *weight,
        }
    }
}

// ===========================================================================
// Village areas
// ===========================================================================

/// A village area definition. Areas unlock in file order.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaData {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    pub tasks: Vec<TaskData>,
}

/// One star-priced repair task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskData {
    pub name: String,
    pub star_cost: u64,
}

// ===========================================================================
// Tuning overrides
// ===========================================================================

/// Optional tuning overrides from a data file. Every field is optional;
/// anything absent keeps the built-in default. Fractional knobs are given
/// as f64 in the file and converted to fixed-point at load time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TuningData {
    pub grid_rows: Option<usize>,
    pub grid_cols: Option<usize>,
    pub energy_max: Option<u32>,
    pub energy_regen_interval_ms: Option<u64>,
    pub energy_regen_amount: Option<u32>,
    pub sell_multiplier: Option<f64>,
    pub bubble_duration_ms: Option<u64>,
    pub bubble_base_chance: Option<f64>,
    pub bubble_per_level_chance: Option<f64>,
    pub order_slots: Option<usize>,
    pub order_refresh_interval_ms: Option<u64>,
    pub order_respawn_delay_ms: Option<u64>,
    pub fulfill_poll_ms: Option<u64>,
    pub high_tier_bonus_level: Option<u8>,
    pub high_tier_bonus_coins_per_level: Option<u64>,
    pub inventory_initial_slots: Option<usize>,
    pub inventory_max_slots: Option<usize>,
    pub inventory_expand_base_cost: Option<u64>,
    pub inventory_expand_multiplier: Option<f64>,
    pub active_producer_limit: Option<usize>,
    pub starting_gems: Option<u64>,
    pub starter_piece_count: Option<usize>,
    pub initial_cobwebs: Option<Vec<(usize, usize)>>,
}

// ===========================================================================
// TOML wrappers (TOML does not support top-level arrays)
// ===========================================================================

/// Wrapper for a list of chains in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlChains {
    pub chains: Vec<ChainData>,
}

/// Wrapper for a list of producers in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlProducers {
    pub producers: Vec<ProducerData>,
}

/// Wrapper for a list of areas in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlAreas {
    pub areas: Vec<AreaData>,
}

// ===========================================================================
// Tests
// ===========================================================================
