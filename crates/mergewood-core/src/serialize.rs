//! Versioned persistence for the game session.
//!
//! [`SaveState`] is the full serializable shape of a session. Every field
//! carries a serde default, so loading an older or partially-shaped save
//! deep-merges onto a freshly constructed default — newly introduced
//! fields are always present.
//!
//! Binary snapshots go through `bitcode` with a magic/version header so a
//! foreign or future blob is rejected before anything is interpreted.
//! Human-readable saves go through `serde_json` (feature `json-save`),
//! which is where the lenient merge behaviour matters.

use crate::collection::Collection;
use crate::economy::Economy;
use crate::fixed::Millis;
use crate::id::{AreaId, ProducerId};
use crate::item::Item;
use crate::order::Order;
use crate::producer::ProducerState;
use crate::rng::GameRng;
use crate::session::Stats;
use crate::special::SpecialItems;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a mergewood snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x4D57_4431;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Save state
// ---------------------------------------------------------------------------

fn default_version() -> u32 {
    FORMAT_VERSION
}

fn default_energy() -> u32 {
    100
}

fn default_economy() -> Economy {
    Economy::new(0, 10, 0)
}

fn default_rng() -> GameRng {
    GameRng::new(0)
}

/// The full serializable shape of a game session.
///
/// Field defaults define what a missing value means, which is how partial
/// or older saves stay loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Board cell contents in index order. Locked cells are carried by
    /// `cobwebs`, not here.
    #[serde(default)]
    pub grid: Vec<Option<Item>>,
    /// Remaining locked-cell coordinates.
    #[serde(default)]
    pub cobwebs: Vec<(usize, usize)>,

    #[serde(default = "default_energy")]
    pub energy_current: u32,
    #[serde(default)]
    pub energy_last_regen: Millis,

    #[serde(default = "default_economy")]
    pub economy: Economy,

    #[serde(default)]
    pub producers: BTreeMap<ProducerId, ProducerState>,
    #[serde(default)]
    pub unlocked_producers: Vec<ProducerId>,
    #[serde(default)]
    pub active_producers: Vec<ProducerId>,

    #[serde(default)]
    pub orders: Vec<Option<Order>>,

    #[serde(default)]
    pub inventory_slots: usize,
    #[serde(default)]
    pub inventory_items: Vec<Option<Item>>,

    #[serde(default)]
    pub village_completed: BTreeMap<AreaId, BTreeSet<usize>>,
    #[serde(default)]
    pub unlocked_areas: Vec<AreaId>,

    #[serde(default)]
    pub collection: Collection,
    #[serde(default)]
    pub specials: SpecialItems,
    #[serde(default)]
    pub stats: Stats,

    #[serde(default = "default_rng")]
    pub rng: GameRng,

    #[serde(default)]
    pub saved_at: Millis,
}

impl Default for SaveState {
    fn default() -> Self {
        Self {
            version: default_version(),
            grid: Vec::new(),
            cobwebs: Vec::new(),
            energy_current: default_energy(),
            energy_last_regen: 0,
            economy: default_economy(),
            producers: BTreeMap::new(),
            unlocked_producers: Vec::new(),
            active_producers: Vec::new(),
            orders: Vec::new(),
            inventory_slots: 0,
            inventory_items: Vec::new(),
            village_completed: BTreeMap::new(),
            unlocked_areas: Vec::new(),
            collection: Collection::new(),
            specials: SpecialItems::new(),
            stats: Stats::default(),
            rng: default_rng(),
            saved_at: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Binary snapshots
// ---------------------------------------------------------------------------

/// Header prepended to every binary snapshot. Enables format detection and
/// version checking before the payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    pub saved_at: Millis,
}

impl SnapshotHeader {
    pub fn new(saved_at: Millis) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            saved_at,
        }
    }

    /// Validate the header. Returns `Ok(())` if this build can read the
    /// payload.
    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    header: SnapshotHeader,
    state: SaveState,
}

/// Encode a save state as a headered binary snapshot.
pub fn encode_snapshot(state: &SaveState) -> Result<Vec<u8>, SerializeError> {
    let snapshot = Snapshot {
        header: SnapshotHeader::new(state.saved_at),
        state: state.clone(),
    };
    bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Decode and validate a binary snapshot.
pub fn decode_snapshot(data: &[u8]) -> Result<SaveState, DeserializeError> {
    let snapshot: Snapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    snapshot.header.validate()?;
    Ok(snapshot.state)
}

// ---------------------------------------------------------------------------
// JSON saves (lenient)
// ---------------------------------------------------------------------------

/// Serialize a save state as JSON.
#[cfg(feature = "json-save")]
pub fn to_json(state: &SaveState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Parse a JSON save, defaulting any missing field. `{}` yields
/// `SaveState::default()`.
#[cfg(feature = "json-save")]
pub fn from_json(json: &str) -> Result<SaveState, serde_json::Error> {
    serde_json::from_str(json)
}
