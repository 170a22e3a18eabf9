use serde::{Deserialize, Serialize};

/// Identifies a merge chain in the registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u32);

/// Identifies a producer definition in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProducerId(pub u32);

/// Identifies a village area in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u32);

/// The three consumable power-up kinds. A closed set, not registry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Splits an item into two of the level below.
    Scissors,
    /// Places a wildcard token that merges with anything.
    Wildcard,
    /// Resets a producer's buffer and cooldown.
    Hourglass,
}

/// A spendable currency. Used in error reporting and the economy ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Energy,
    Coins,
    Gems,
    Stars,
    /// Special-item charges (scissors/wildcard/hourglass).
    Charges,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_equality() {
        assert_eq!(ChainId(0), ChainId(0));
        assert_ne!(ChainId(0), ChainId(1));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ChainId(0), "woodland");
        map.insert(ChainId(1), "mushroom");
        assert_eq!(map[&ChainId(0)], "woodland");
    }

    #[test]
    fn producer_id_copy() {
        let a = ProducerId(5);
        let b = a;
        assert_eq!(a, b);
    }
}
