//! Resolution pipeline: reads data files, resolves name references, builds
//! the frozen registry and tuning.
//!
//! A data directory holds `chains` and `producers` files (required) plus
//! optional `areas` and `tuning` files, each in RON, JSON, or TOML. Format
//! is detected by extension; two formats for the same base name are a
//! conflict, not a preference.

use crate::schema::{
    AreaData, ChainData, DropData, ProducerData, ProducerKindData, TuningData,
};
use mergewood_core::fixed::f64_to_fixed64;
use mergewood_core::registry::{
    DropEntry, PieceDef, ProducerDef, ProducerKind, Registry, RegistryBuilder, RegistryError,
    TaskDef, Tuning,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The assembled definitions failed registry validation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without
/// extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(
    dir: &Path,
    base_name: &'static str,
) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from
/// extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Toml => toml::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at
/// the given `toml_key` from a top-level table. For RON and JSON,
/// deserializes directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Toml => {
            let table: toml::Value =
                toml::from_str(&content).map_err(|e| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: format!("missing key '{toml_key}' in TOML file"),
                })?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })
        }
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

/// A fully resolved dataset, ready to start a session with.
#[derive(Debug)]
pub struct GameData {
    pub registry: Registry,
    pub tuning: Tuning,
}

/// Load and resolve a data directory into a [`GameData`].
///
/// `chains` and `producers` files are required; `areas` and `tuning` are
/// optional. Chain references in producers and drop tables are resolved by
/// name; the assembled definitions then pass registry validation.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let chains_path = require_data_file(dir, "chains")?;
    let chains: Vec<ChainData> = deserialize_list(&chains_path, "chains")?;

    let producers_path = require_data_file(dir, "producers")?;
    let producers: Vec<ProducerData> = deserialize_list(&producers_path, "producers")?;

    let areas_path = find_data_file(dir, "areas")?;
    let areas: Vec<AreaData> = match &areas_path {
        Some(path) => deserialize_list(path, "areas")?,
        None => Vec::new(),
    };

    let tuning_data: TuningData = match find_data_file(dir, "tuning")? {
        Some(path) => deserialize_file(&path)?,
        None => TuningData::default(),
    };

    let mut builder = RegistryBuilder::new();
    let mut seen_chains: HashMap<String, ()> = HashMap::new();
    for chain in &chains {
        check_duplicate(&seen_chains, &chain.name, &chains_path)?;
        seen_chains.insert(chain.name.clone(), ());
        let pieces = chain
            .pieces
            .iter()
            .map(|p| PieceDef {
                name: p.name.clone(),
                icon: p.icon.clone(),
                color: p.color.clone(),
            })
            .collect();
        builder.register_chain(&chain.name, pieces);
    }

    let mut seen_producers: HashMap<String, ()> = HashMap::new();
    for producer in &producers {
        check_duplicate(&seen_producers, &producer.name, &producers_path)?;
        seen_producers.insert(producer.name.clone(), ());
        let def = resolve_producer(producer, &builder, &producers_path)?;
        builder.register_producer(def);
    }

    let mut seen_areas: HashMap<String, ()> = HashMap::new();
    let areas_err_path = areas_path.clone().unwrap_or_else(|| dir.join("areas"));
    for area in &areas {
        check_duplicate(&seen_areas, &area.name, &areas_err_path)?;
        seen_areas.insert(area.name.clone(), ());
        let tasks = area
            .tasks
            .iter()
            .map(|t| TaskDef {
                name: t.name.clone(),
                star_cost: t.star_cost,
            })
            .collect();
        builder.register_area(&area.name, &area.icon, tasks);
    }

    let registry = builder.build()?;
    let mut tuning = Tuning::default();
    apply_tuning(&tuning_data, &mut tuning);
    Ok(GameData { registry, tuning })
}

fn resolve_producer(
    data: &ProducerData,
    builder: &RegistryBuilder,
    file: &Path,
) -> Result<ProducerDef, DataLoadError> {
    let chain = resolve_chain(builder, &data.chain, file)?;
    let drop_table = data
        .drop_table
        .iter()
        .map(|drop: &DropData| {
            Ok(DropEntry {
                chain: resolve_chain(builder, drop.chain(), file)?,
                level: drop.level(),
                weight: drop.weight(),
            })
        })
        .collect::<Result<Vec<_>, DataLoadError>>()?;
    let kind = match data.kind {
        ProducerKindData::Energy { cost } => ProducerKind::Energy { cost },
        ProducerKindData::Auto { interval_ms } => ProducerKind::Auto { interval_ms },
        ProducerKindData::Consumable { max_uses } => ProducerKind::Consumable { max_uses },
    };
    Ok(ProducerDef {
        name: data.name.clone(),
        icon: data.icon.clone(),
        chain,
        kind,
        buffer: data.buffer,
        cooldown_ms: data.cooldown_ms,
        drop_table,
        unlock_order: data.unlock_order,
    })
}

fn resolve_chain(
    builder: &RegistryBuilder,
    name: &str,
    file: &Path,
) -> Result<mergewood_core::id::ChainId, DataLoadError> {
    builder
        .chain_id(name)
        .ok_or_else(|| DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind: "chain",
        })
}

fn check_duplicate(
    map: &HashMap<String, ()>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Overlay file-provided tuning values onto the defaults.
fn apply_tuning(data: &TuningData, tuning: &mut Tuning) {
    macro_rules! set {
        ($field:ident) => {
            if let Some(v) = data.$field {
                tuning.$field = v;
            }
        };
        ($field:ident, fixed) => {
            if let Some(v) = data.$field {
                tuning.$field = f64_to_fixed64(v);
            }
        };
    }
    set!(grid_rows);
    set!(grid_cols);
    set!(energy_max);
    set!(energy_regen_interval_ms);
    set!(energy_regen_amount);
    set!(sell_multiplier, fixed);
    set!(bubble_duration_ms);
    set!(bubble_base_chance, fixed);
    set!(bubble_per_level_chance, fixed);
    set!(order_slots);
    set!(order_refresh_interval_ms);
    set!(order_respawn_delay_ms);
    set!(fulfill_poll_ms);
    set!(high_tier_bonus_level);
    set!(high_tier_bonus_coins_per_level);
    set!(inventory_initial_slots);
    set!(inventory_max_slots);
    set!(inventory_expand_base_cost);
    set!(inventory_expand_multiplier, fixed);
    set!(active_producer_limit);
    set!(starting_gems);
    set!(starter_piece_count);
    if let Some(cobwebs) = &data.initial_cobwebs {
        tuning.initial_cobwebs = cobwebs.clone();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mergewood_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    fn write_minimal_chains(dir: &Path) {
        fs::write(
            dir.join("chains.ron"),
            r#"[
                (name: "adventure", pieces: [(name: "leaf"), (name: "twig"), (name: "plank")]),
                (name: "flower", pieces: [(name: "seed"), (name: "sprout")]),
            ]"#,
        )
        .unwrap();
    }

    fn write_minimal_producers(dir: &Path) {
        fs::write(
            dir.join("producers.ron"),
            r#"[
                (
                    name: "adventure_pack",
                    chain: "adventure",
                    kind: Energy(cost: 1),
                    drop_table: [("adventure", 1, 80), ("adventure", 2, 20)],
                ),
            ]"#,
        )
        .unwrap();
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("chains.ron")).unwrap(), Format::Ron);
        assert_eq!(
            detect_format(Path::new("chains.toml")).unwrap(),
            Format::Toml
        );
        assert_eq!(
            detect_format(Path::new("chains.json")).unwrap(),
            Format::Json
        );
    }

    #[test]
    fn detect_format_unsupported() {
        assert!(matches!(
            detect_format(Path::new("chains.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("chains")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // find_data_file / require_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_single_format() {
        let dir = make_test_dir("find_single");
        fs::write(dir.join("chains.json"), "[]").unwrap();

        let result = find_data_file(&dir, "chains").unwrap();
        assert_eq!(result, Some(dir.join("chains.json")));

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_missing_is_none() {
        let dir = make_test_dir("find_missing");
        assert_eq!(find_data_file(&dir, "chains").unwrap(), None);
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("chains.ron"), "[]").unwrap();
        fs::write(dir.join("chains.json"), "[]").unwrap();

        assert!(matches!(
            find_data_file(&dir, "chains"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing_fails() {
        let dir = make_test_dir("require_missing");
        assert!(matches!(
            require_data_file(&dir, "chains"),
            Err(DataLoadError::MissingRequired { file: "chains", .. })
        ));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_list
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_ron() {
        let dir = make_test_dir("list_ron");
        write_minimal_chains(&dir);
        let chains: Vec<ChainData> =
            deserialize_list(&dir.join("chains.ron"), "chains").unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].pieces.len(), 3);
        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_extracts_key() {
        let dir = make_test_dir("list_toml");
        fs::write(
            dir.join("chains.toml"),
            r#"
[[chains]]
name = "adventure"
pieces = [{ name = "leaf" }]
"#,
        )
        .unwrap();
        let chains: Vec<ChainData> =
            deserialize_list(&dir.join("chains.toml"), "chains").unwrap();
        assert_eq!(chains.len(), 1);
        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_missing_key() {
        let dir = make_test_dir("list_toml_missing");
        fs::write(dir.join("chains.toml"), r#"foo = "bar""#).unwrap();
        let result: Result<Vec<ChainData>, _> =
            deserialize_list(&dir.join("chains.toml"), "chains");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));
        cleanup(&dir);
    }

    #[test]
    fn deserialize_parse_error() {
        let dir = make_test_dir("parse_err");
        fs::write(dir.join("chains.ron"), "not valid RON {{{").unwrap();
        let result: Result<Vec<ChainData>, _> =
            deserialize_list(&dir.join("chains.ron"), "chains");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_game_data
    // -----------------------------------------------------------------------

    #[test]
    fn load_minimal_directory() {
        let dir = make_test_dir("load_minimal");
        write_minimal_chains(&dir);
        write_minimal_producers(&dir);

        let data = load_game_data(&dir).unwrap();
        assert_eq!(data.registry.chain_count(), 2);
        assert_eq!(data.registry.producer_count(), 1);
        assert_eq!(data.registry.area_count(), 0);
        let pack = data.registry.producer_id("adventure_pack").unwrap();
        let def = data.registry.producer(pack).unwrap();
        assert_eq!(def.chain, data.registry.chain_id("adventure").unwrap());
        assert_eq!(def.drop_table[0].weight, 80);
        // No tuning file: defaults.
        assert_eq!(data.tuning.energy_max, 100);

        cleanup(&dir);
    }

    #[test]
    fn load_with_areas_and_tuning() {
        let dir = make_test_dir("load_full");
        write_minimal_chains(&dir);
        write_minimal_producers(&dir);
        fs::write(
            dir.join("areas.ron"),
            r#"[
                (name: "treehouse", icon: "H", tasks: [(name: "mend the roof", star_cost: 5)]),
            ]"#,
        )
        .unwrap();
        fs::write(
            dir.join("tuning.ron"),
            r#"#![enable(implicit_some)]
(energy_max: 250, grid_rows: 5, initial_cobwebs: [(4, 4)])"#,
        )
        .unwrap();

        let data = load_game_data(&dir).unwrap();
        assert_eq!(data.registry.area_count(), 1);
        assert_eq!(data.tuning.energy_max, 250);
        assert_eq!(data.tuning.grid_rows, 5);
        assert_eq!(data.tuning.initial_cobwebs, vec![(4, 4)]);
        // Untouched knobs keep their defaults.
        assert_eq!(data.tuning.order_slots, 3);

        cleanup(&dir);
    }

    #[test]
    fn load_missing_producers_fails() {
        let dir = make_test_dir("load_no_producers");
        write_minimal_chains(&dir);
        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::MissingRequired {
                file: "producers",
                ..
            })
        ));
        cleanup(&dir);
    }

    #[test]
    fn load_unresolved_chain_fails() {
        let dir = make_test_dir("load_unresolved");
        write_minimal_chains(&dir);
        fs::write(
            dir.join("producers.ron"),
            r#"[
                (
                    name: "mystery_box",
                    chain: "nonexistent",
                    kind: Energy(cost: 1),
                    drop_table: [("nonexistent", 1, 1)],
                ),
            ]"#,
        )
        .unwrap();

        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::UnresolvedRef { ref name, expected_kind: "chain", .. }) if name == "nonexistent"
        ));
        cleanup(&dir);
    }

    #[test]
    fn load_duplicate_chain_fails() {
        let dir = make_test_dir("load_dup");
        fs::write(
            dir.join("chains.ron"),
            r#"[
                (name: "adventure", pieces: [(name: "leaf")]),
                (name: "adventure", pieces: [(name: "leaf")]),
            ]"#,
        )
        .unwrap();
        write_minimal_producers(&dir);

        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "adventure"
        ));
        cleanup(&dir);
    }

    #[test]
    fn load_out_of_range_drop_level_fails_validation() {
        let dir = make_test_dir("load_bad_level");
        write_minimal_chains(&dir);
        fs::write(
            dir.join("producers.ron"),
            // "flower" has 2 levels; a level-9 drop fails registry validation.
            r#"[
                (
                    name: "watering_can",
                    chain: "flower",
                    kind: Auto(interval_ms: 60000),
                    drop_table: [("flower", 9, 1)],
                ),
            ]"#,
        )
        .unwrap();

        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::Registry(RegistryError::InvalidDropLevel {
                level: 9,
                ..
            }))
        ));
        cleanup(&dir);
    }

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "chains",
            dir: PathBuf::from("/data"),
        };
        assert!(format!("{e}").contains("chains"));
        assert!(format!("{e}").contains("/data"));

        let e = DataLoadError::UnresolvedRef {
            file: PathBuf::from("producers.ron"),
            name: "ghost".to_string(),
            expected_kind: "chain",
        };
        let msg = format!("{e}");
        assert!(msg.contains("ghost"));
        assert!(msg.contains("chain"));
    }
}
