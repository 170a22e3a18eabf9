//! Shared fixtures for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the helpers
//! are available to unit tests, `tests/`, and benches (via the
//! `test-utils` feature).

use crate::fixed::Millis;
use crate::id::{ChainId, ProducerId};
use crate::registry::{
    DropEntry, PieceDef, ProducerDef, ProducerKind, Registry, RegistryBuilder, TaskDef, Tuning,
};
use crate::session::GameSession;

// ===========================================================================
// Ids the fixture registry hands out
// ===========================================================================

pub fn woodland() -> ChainId {
    ChainId(0)
}
pub fn riverside() -> ChainId {
    ChainId(1)
}
pub fn orchard() -> ChainId {
    ChainId(2)
}

pub fn satchel() -> ProducerId {
    ProducerId(0)
}
pub fn sprinkler() -> ProducerId {
    ProducerId(1)
}
pub fn seed_pouch() -> ProducerId {
    ProducerId(2)
}

// ===========================================================================
// Registry fixture
// ===========================================================================

pub fn piece_def(name: &str) -> PieceDef {
    PieceDef {
        name: name.to_string(),
        icon: "?".to_string(),
        color: "#888888".to_string(),
    }
}

fn seven_level_chain(prefix: &str) -> Vec<PieceDef> {
    (1..=7).map(|i| piece_def(&format!("{prefix}{i}"))).collect()
}

/// Three chains and one producer of each kind: an energy-tapped satchel,
/// an auto sprinkler, and a consumable seed pouch. Two village areas.
pub fn test_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let woodland = b.register_chain("woodland", seven_level_chain("wood"));
    let riverside = b.register_chain("riverside", seven_level_chain("river"));
    let orchard = b.register_chain("orchard", seven_level_chain("orchard"));

    b.register_producer(ProducerDef {
        name: "satchel".to_string(),
        icon: "S".to_string(),
        chain: woodland,
        kind: ProducerKind::Energy { cost: 1 },
        buffer: 12,
        cooldown_ms: 1_200_000,
        drop_table: vec![
            DropEntry {
                chain: woodland,
                level: 1,
                weight: 80,
            },
            DropEntry {
                chain: woodland,
                level: 2,
                weight: 20,
            },
        ],
        unlock_order: 0,
    });
    b.register_producer(ProducerDef {
        name: "sprinkler".to_string(),
        icon: "K".to_string(),
        chain: riverside,
        kind: ProducerKind::Auto {
            interval_ms: 60_000,
        },
        buffer: 8,
        cooldown_ms: 600_000,
        drop_table: vec![
            DropEntry {
                chain: riverside,
                level: 1,
                weight: 85,
            },
            DropEntry {
                chain: riverside,
                level: 2,
                weight: 15,
            },
        ],
        unlock_order: 1,
    });
    b.register_producer(ProducerDef {
        name: "seed_pouch".to_string(),
        icon: "P".to_string(),
        chain: orchard,
        kind: ProducerKind::Consumable { max_uses: 20 },
        buffer: 12,
        cooldown_ms: 0,
        drop_table: vec![
            DropEntry {
                chain: orchard,
                level: 1,
                weight: 75,
            },
            DropEntry {
                chain: orchard,
                level: 2,
                weight: 25,
            },
        ],
        unlock_order: 2,
    });

    b.register_area(
        "treehouse",
        "H",
        vec![
            TaskDef {
                name: "mend the roof".to_string(),
                star_cost: 5,
            },
            TaskDef {
                name: "raise the ladder".to_string(),
                star_cost: 10,
            },
        ],
    );
    b.register_area(
        "market",
        "M",
        vec![TaskDef {
            name: "raise the stall".to_string(),
            star_cost: 15,
        }],
    );
    b.build().expect("fixture registry is valid")
}

/// Default tuning without the starting cobweb patch, so board-layout tests
/// start from a fully open grid.
pub fn open_board_tuning() -> Tuning {
    Tuning {
        initial_cobwebs: Vec::new(),
        ..Tuning::default()
    }
}

/// A fresh session on an open board.
pub fn new_session(seed: u64, now: Millis) -> GameSession {
    GameSession::new_game(test_registry(), open_board_tuning(), seed, now)
}
