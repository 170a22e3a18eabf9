//! The mergeable entities that occupy grid cells.
//!
//! `Item` is a closed sum: an ordinary chain piece, a producer marker, or a
//! wildcard token. The original flag-and-sentinel encoding (`isProducer`,
//! `level 0`, `chainId = 'special'`) is replaced by explicit variants so
//! that every match site is forced to handle all three.

use crate::fixed::{Fixed64, Millis, scale_floor};
use crate::id::{ChainId, ProducerId};
use serde::{Deserialize, Serialize};

/// Presentation/lifecycle state of a chain piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PieceState {
    #[default]
    Normal,
    /// The piece cannot be dragged or merged until something unlocks it.
    Locked,
    /// A time-limited bonus piece. Behaves like a normal piece until it
    /// expires, at which point it pops into a small coin reward.
    Bubble { expires_at: Millis },
}

/// An entity occupying a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    /// A piece of a merge chain at a 1-indexed level.
    Piece {
        chain: ChainId,
        level: u8,
        state: PieceState,
    },
    /// The tappable marker for a producer. Never merges, never sells.
    ProducerMarker(ProducerId),
    /// A wildcard token that merges with any unlocked piece.
    Wildcard,
}

impl Item {
    /// A normal piece of the given chain and level.
    pub fn piece(chain: ChainId, level: u8) -> Self {
        Item::Piece {
            chain,
            level,
            state: PieceState::Normal,
        }
    }

    /// A bubble piece expiring at the given time.
    pub fn bubble(chain: ChainId, level: u8, expires_at: Millis) -> Self {
        Item::Piece {
            chain,
            level,
            state: PieceState::Bubble { expires_at },
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Item::ProducerMarker(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Item::Wildcard)
    }

    /// The `(chain, level)` of a piece; `None` for markers and wildcards.
    pub fn as_piece(&self) -> Option<(ChainId, u8)> {
        match self {
            Item::Piece { chain, level, .. } => Some((*chain, *level)),
            _ => None,
        }
    }

    /// The producer behind a marker, if this is one.
    pub fn as_marker(&self) -> Option<ProducerId> {
        match self {
            Item::ProducerMarker(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether this is a locked piece (not draggable, not mergeable).
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            Item::Piece {
                state: PieceState::Locked,
                ..
            }
        )
    }

    /// Whether this is a bubble piece whose expiry has passed.
    pub fn bubble_expired(&self, now: Millis) -> bool {
        matches!(
            self,
            Item::Piece {
                state: PieceState::Bubble { expires_at },
                ..
            } if now >= *expires_at
        )
    }

    /// Whether the two items form a valid merge pair, ignoring level caps
    /// (the resolver applies the chain-length check, which needs the
    /// registry).
    ///
    /// Wildcard-on-wildcard is not a pair: the result would be undefined.
    pub fn can_merge_with(&self, other: &Item) -> bool {
        match (self, other) {
            (
                Item::Piece {
                    chain: ca,
                    level: la,
                    state: sa,
                },
                Item::Piece {
                    chain: cb,
                    level: lb,
                    state: sb,
                },
            ) => {
                *sa != PieceState::Locked && *sb != PieceState::Locked && ca == cb && la == lb
            }
            (Item::Wildcard, Item::Piece { state, .. })
            | (Item::Piece { state, .. }, Item::Wildcard) => *state != PieceState::Locked,
            _ => false,
        }
    }

    /// Coins credited when the item is dropped on the sell zone:
    /// `floor(level * multiplier * 2)`. Markers are not sellable; a
    /// wildcard sells for nothing.
    pub fn sell_value(&self, multiplier: Fixed64) -> Option<u64> {
        match self {
            Item::Piece { level, .. } => {
                Some(scale_floor(*level as u32 * 2, multiplier))
            }
            Item::Wildcard => Some(0),
            Item::ProducerMarker(_) => None,
        }
    }
}
