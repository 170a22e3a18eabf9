//! The album of every `(chain, level)` the player has ever seen.
//!
//! Grows when a piece is produced or merged and never shrinks; the UI reads
//! it to render the discovery album.

use crate::id::ChainId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    discovered: BTreeMap<ChainId, BTreeSet<u8>>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a discovery. Returns `true` the first time this exact
    /// `(chain, level)` is seen.
    pub fn record(&mut self, chain: ChainId, level: u8) -> bool {
        self.discovered.entry(chain).or_default().insert(level)
    }

    pub fn contains(&self, chain: ChainId, level: u8) -> bool {
        self.discovered
            .get(&chain)
            .is_some_and(|levels| levels.contains(&level))
    }

    /// Distinct discoveries across all chains.
    pub fn total(&self) -> usize {
        self.discovered.values().map(|l| l.len()).sum()
    }

    /// Levels discovered for one chain, ascending.
    pub fn levels(&self, chain: ChainId) -> impl Iterator<Item = u8> + '_ {
        self.discovered
            .get(&chain)
            .into_iter()
            .flat_map(|l| l.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_idempotent() {
        let mut c = Collection::new();
        assert!(c.record(ChainId(0), 1));
        assert!(!c.record(ChainId(0), 1));
        assert!(c.contains(ChainId(0), 1));
        assert_eq!(c.total(), 1);
    }

    #[test]
    fn chains_tracked_separately() {
        let mut c = Collection::new();
        c.record(ChainId(0), 1);
        c.record(ChainId(1), 1);
        c.record(ChainId(1), 3);
        assert_eq!(c.total(), 3);
        assert_eq!(c.levels(ChainId(1)).collect::<Vec<_>>(), vec![1, 3]);
        assert!(!c.contains(ChainId(0), 3));
    }

    #[test]
    fn serde_round_trip() {
        let mut c = Collection::new();
        c.record(ChainId(2), 5);
        let json = serde_json::to_string(&c).unwrap();
        let restored: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(c, restored);
    }
}
