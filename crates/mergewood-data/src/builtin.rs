//! The built-in default dataset: eight merge chains of seven levels each,
//! eight producers across the three kinds, and six village areas with
//! their star-priced repair tasks.
//!
//! This is the content the game ships with; a data directory loaded via
//! [`crate::load_game_data`] replaces it wholesale.

use crate::loader::GameData;
use mergewood_core::id::ChainId;
use mergewood_core::registry::{
    DropEntry, PieceDef, ProducerDef, ProducerKind, RegistryBuilder, TaskDef, Tuning,
};

fn piece(name: &str, icon: &str, color: &str) -> PieceDef {
    PieceDef {
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
    }
}

fn task(name: &str, star_cost: u64) -> TaskDef {
    TaskDef {
        name: name.to_string(),
        star_cost,
    }
}

/// The standard two-row starter drop table: mostly level 1, a taste of
/// level 2.
fn starter_drops(chain: ChainId, level_one_weight: u32) -> Vec<DropEntry> {
    vec![
        DropEntry {
            chain,
            level: 1,
            weight: level_one_weight,
        },
        DropEntry {
            chain,
            level: 2,
            weight: 100 - level_one_weight,
        },
    ]
}

/// Build the default dataset.
pub fn builtin() -> GameData {
    let mut b = RegistryBuilder::new();

    let adventure = b.register_chain(
        "adventure",
        vec![
            piece("leaf", "\u{1F343}", "#4ade80"),
            piece("twig", "\u{1FAB5}", "#a3e635"),
            piece("plank", "\u{1FA93}", "#d4a574"),
            piece("crate", "\u{1F4E6}", "#c4915e"),
            piece("toolkit", "\u{1F9F0}", "#f59e0b"),
            piece("explorer pack", "\u{1F392}", "#ef4444"),
            piece("golden pack", "\u{1F451}", "#ffd700"),
        ],
    );
    let mushroom = b.register_chain(
        "mushroom",
        vec![
            piece("spore", "\u{1F7E4}", "#a3a3a3"),
            piece("button mushroom", "\u{1F344}", "#f87171"),
            piece("mushroom cluster", "\u{1F344}", "#ef4444"),
            piece("mushroom soup", "\u{1F372}", "#fb923c"),
            piece("mushroom risotto", "\u{1F35B}", "#fbbf24"),
            piece("mushroom feast", "\u{1F389}", "#a78bfa"),
            piece("mushroom king", "\u{1F451}", "#ffd700"),
        ],
    );
    let fish = b.register_chain(
        "fish",
        vec![
            piece("bait", "\u{1FAB1}", "#d4a574"),
            piece("minnow", "\u{1F41F}", "#60a5fa"),
            piece("trout", "\u{1F420}", "#34d399"),
            piece("salmon", "\u{1F421}", "#fb923c"),
            piece("swordfish", "\u{1F5E1}", "#818cf8"),
            piece("golden arowana", "\u{1F409}", "#fbbf24"),
            piece("fish of legend", "\u{1F30A}", "#ffd700"),
        ],
    );
    let flower = b.register_chain(
        "flower",
        vec![
            piece("seed", "\u{1FAD8}", "#a3a3a3"),
            piece("sprout", "\u{1F331}", "#4ade80"),
            piece("bud", "\u{1F337}", "#fb7185"),
            piece("daisy", "\u{1F33C}", "#fde047"),
            piece("rose", "\u{1F339}", "#f43f5e"),
            piece("sunflower", "\u{1F33B}", "#fbbf24"),
            piece("world bloom", "\u{1F490}", "#ffd700"),
        ],
    );
    let fruit = b.register_chain(
        "fruit",
        vec![
            piece("green fruit", "\u{1FAD2}", "#86efac"),
            piece("apple", "\u{1F34E}", "#ef4444"),
            piece("orange", "\u{1F34A}", "#fb923c"),
            piece("grapes", "\u{1F347}", "#a78bfa"),
            piece("fruit basket", "\u{1F9FA}", "#fbbf24"),
            piece("juice", "\u{1F9C3}", "#fb923c"),
            piece("golden jam", "\u{1F36F}", "#ffd700"),
        ],
    );
    let fabric = b.register_chain(
        "fabric",
        vec![
            piece("cotton", "\u{2601}", "#e5e5e5"),
            piece("yarn", "\u{1F9F6}", "#fb7185"),
            piece("cloth", "\u{1F9FB}", "#d4a574"),
            piece("scarf", "\u{1F9E3}", "#f43f5e"),
            piece("cape", "\u{1F9B8}", "#818cf8"),
            piece("kimono", "\u{1F458}", "#c084fc"),
            piece("dragon robe", "\u{1F432}", "#ffd700"),
        ],
    );
    let tool = b.register_chain(
        "tool",
        vec![
            piece("ore", "\u{1FAA8}", "#a3a3a3"),
            piece("iron ingot", "\u{1F9F1}", "#9ca3af"),
            piece("nails", "\u{1F4CC}", "#6b7280"),
            piece("hammer", "\u{1F528}", "#78716c"),
            piece("iron sword", "\u{2694}", "#60a5fa"),
            piece("silver armor", "\u{1F6E1}", "#c0c0c0"),
            piece("relic of legend", "\u{2728}", "#ffd700"),
        ],
    );
    let dessert = b.register_chain(
        "dessert",
        vec![
            piece("milk", "\u{1F95B}", "#f5f5f4"),
            piece("butter", "\u{1F9C8}", "#fde047"),
            piece("ice cream", "\u{1F366}", "#fbcfe8"),
            piece("sundae", "\u{1F368}", "#f9a8d4"),
            piece("cake", "\u{1F382}", "#fbbf24"),
            piece("wedding cake", "\u{1F370}", "#f5f5f4"),
            piece("grand dessert", "\u{1F3C6}", "#ffd700"),
        ],
    );

    b.register_producer(ProducerDef {
        name: "adventure_pack".to_string(),
        icon: "\u{1F392}".to_string(),
        chain: adventure,
        kind: ProducerKind::Energy { cost: 1 },
        buffer: 12,
        cooldown_ms: 1_200_000,
        drop_table: starter_drops(adventure, 80),
        unlock_order: 0,
    });
    b.register_producer(ProducerDef {
        name: "mushroom_farm".to_string(),
        icon: "\u{1F3D5}".to_string(),
        chain: mushroom,
        kind: ProducerKind::Energy { cost: 1 },
        buffer: 12,
        cooldown_ms: 1_200_000,
        drop_table: starter_drops(mushroom, 80),
        unlock_order: 1,
    });
    b.register_producer(ProducerDef {
        name: "fishing_rod".to_string(),
        icon: "\u{1F3A3}".to_string(),
        chain: fish,
        kind: ProducerKind::Energy { cost: 1 },
        buffer: 12,
        cooldown_ms: 1_200_000,
        drop_table: starter_drops(fish, 80),
        unlock_order: 2,
    });
    b.register_producer(ProducerDef {
        name: "watering_can".to_string(),
        icon: "\u{1F6BF}".to_string(),
        chain: flower,
        kind: ProducerKind::Auto {
            interval_ms: 60_000,
        },
        buffer: 8,
        cooldown_ms: 600_000,
        drop_table: starter_drops(flower, 85),
        unlock_order: 3,
    });
    b.register_producer(ProducerDef {
        name: "seed_bag".to_string(),
        icon: "\u{1F330}".to_string(),
        chain: fruit,
        kind: ProducerKind::Consumable { max_uses: 20 },
        buffer: 12,
        cooldown_ms: 0,
        drop_table: starter_drops(fruit, 75),
        unlock_order: 4,
    });
    b.register_producer(ProducerDef {
        name: "loom".to_string(),
        icon: "\u{1F9F5}".to_string(),
        chain: fabric,
        kind: ProducerKind::Energy { cost: 1 },
        buffer: 12,
        cooldown_ms: 1_200_000,
        drop_table: starter_drops(fabric, 80),
        unlock_order: 5,
    });
    b.register_producer(ProducerDef {
        name: "forge".to_string(),
        icon: "\u{2692}".to_string(),
        chain: tool,
        kind: ProducerKind::Energy { cost: 1 },
        buffer: 12,
        cooldown_ms: 1_200_000,
        drop_table: starter_drops(tool, 80),
        unlock_order: 6,
    });
    b.register_producer(ProducerDef {
        name: "ice_cream_truck".to_string(),
        icon: "\u{1F366}".to_string(),
        chain: dessert,
        kind: ProducerKind::Auto {
            interval_ms: 90_000,
        },
        buffer: 8,
        cooldown_ms: 900_000,
        drop_table: starter_drops(dessert, 85),
        unlock_order: 7,
    });

    b.register_area(
        "treehouse",
        "\u{1F3E0}",
        vec![
            task("mend the roof", 5),
            task("fit the windows", 8),
            task("raise the ladder", 10),
            task("place the furniture", 15),
            task("hang the lanterns", 20),
        ],
    );
    b.register_area(
        "mushroom market",
        "\u{1F344}",
        vec![
            task("raise the stalls", 15),
            task("lay the walkway", 20),
            task("hang the sign", 25),
            task("build the pavilion", 30),
            task("set the flower pots", 20),
            task("string the bunting", 35),
        ],
    );
    b.register_area(
        "fishing hut",
        "\u{1F41F}",
        vec![
            task("rebuild the dock", 20),
            task("raise the hut", 25),
            task("mount the rod rack", 15),
            task("place the aquarium", 30),
            task("build the footbridge", 35),
            task("light the campfire", 25),
        ],
    );
    b.register_area(
        "firefly garden",
        "\u{1F338}",
        vec![
            task("clear the weeds", 15),
            task("plant the flower beds", 20),
            task("fit the fountain", 30),
            task("place the benches", 20),
            task("raise the trellis", 35),
            task("hang the garden lights", 40),
            task("build the butterfly house", 50),
        ],
    );
    b.register_area(
        "stargazing tower",
        "\u{1F31F}",
        vec![
            task("repair the foundation", 30),
            task("build the staircase", 35),
            task("mount the telescope", 40),
            task("hang the star charts", 25),
            task("place the crystal orb", 45),
            task("build the top terrace", 50),
        ],
    );
    b.register_area(
        "forest library",
        "\u{1F4DA}",
        vec![
            task("repair the shelves", 25),
            task("fit the desks", 20),
            task("place the candlesticks", 15),
            task("gather the scattered books", 30),
            task("build the reading nook", 35),
            task("install the magic globe", 45),
            task("restore the ancient mural", 55),
        ],
    );

    GameData {
        registry: b.build().expect("builtin dataset is valid"),
        tuning: Tuning::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mergewood_core::registry::ProducerKind;

    #[test]
    fn builtin_builds_and_counts() {
        let data = builtin();
        assert_eq!(data.registry.chain_count(), 8);
        assert_eq!(data.registry.producer_count(), 8);
        assert_eq!(data.registry.area_count(), 6);
    }

    #[test]
    fn every_chain_has_seven_levels() {
        let data = builtin();
        for chain in data.registry.chain_ids() {
            assert_eq!(data.registry.max_level(chain), 7);
        }
    }

    #[test]
    fn first_unlock_is_the_adventure_pack() {
        let data = builtin();
        let first = data.registry.producers_by_unlock_order()[0];
        assert_eq!(first, data.registry.producer_id("adventure_pack").unwrap());
        let def = data.registry.producer(first).unwrap();
        assert!(matches!(def.kind, ProducerKind::Energy { cost: 1 }));
        assert_eq!(def.buffer, 12);
        assert_eq!(def.cooldown_ms, 1_200_000);
    }

    #[test]
    fn producer_kinds_cover_all_three() {
        let data = builtin();
        let mut energy = 0;
        let mut auto = 0;
        let mut consumable = 0;
        for i in 0..data.registry.producer_count() as u32 {
            match data
                .registry
                .producer(mergewood_core::id::ProducerId(i))
                .unwrap()
                .kind
            {
                ProducerKind::Energy { .. } => energy += 1,
                ProducerKind::Auto { .. } => auto += 1,
                ProducerKind::Consumable { .. } => consumable += 1,
            }
        }
        assert_eq!((energy, auto, consumable), (5, 2, 1));
    }

    #[test]
    fn drop_tables_stay_within_their_chain() {
        let data = builtin();
        for i in 0..data.registry.producer_count() as u32 {
            let def = data
                .registry
                .producer(mergewood_core::id::ProducerId(i))
                .unwrap();
            for entry in &def.drop_table {
                assert_eq!(entry.chain, def.chain, "producer {}", def.name);
                assert!(entry.level <= 2);
            }
            let total: u32 = def.drop_table.iter().map(|d| d.weight).sum();
            assert_eq!(total, 100, "producer {}", def.name);
        }
    }

    #[test]
    fn tuning_matches_the_shipped_balance() {
        let data = builtin();
        assert_eq!(data.tuning.grid_rows, 9);
        assert_eq!(data.tuning.grid_cols, 7);
        assert_eq!(data.tuning.initial_cobwebs.len(), 9);
        assert_eq!(data.tuning.active_producer_limit, 5);
    }
}
