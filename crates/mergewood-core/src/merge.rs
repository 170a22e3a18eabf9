//! Merge resolution: what happens when a dragged item is dropped onto
//! another cell.
//!
//! Two matching pieces (or a wildcard and any piece) combine into the next
//! level of the real operand's chain. The result lands at the *target*
//! index and the source cell empties. A merge can also open adjacent
//! cobwebs, pay a high-tier bonus, and spawn a time-limited bubble piece.
//!
//! The resolver mutates the grid and RNG only; crediting coins, recording
//! the collection, counting stats and emitting events stay with the
//! session so this logic has no reach into the ledger.

use crate::error::ActionError;
use crate::fixed::{Fixed64, Millis};
use crate::grid::Grid;
use crate::id::ChainId;
use crate::item::Item;
use crate::registry::{Registry, Tuning};
use crate::rng::GameRng;

/// A bubble piece spawned as a merge side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleSpawn {
    pub index: usize,
    pub chain: ChainId,
}

/// Everything a successful merge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Cell now holding the merged piece (the drop target).
    pub index: usize,
    pub chain: ChainId,
    pub level: u8,
    /// Cobweb cells opened by this merge.
    pub unlocked: Vec<(usize, usize)>,
    pub bubble: Option<BubbleSpawn>,
    /// Immediate coin bonus for high-tier results; zero below the
    /// threshold.
    pub bonus_coins: u64,
}

/// Validate and apply a merge of `source` onto `target`.
///
/// On any error the grid is untouched.
pub fn resolve_merge(
    grid: &mut Grid,
    registry: &Registry,
    tuning: &Tuning,
    rng: &mut GameRng,
    source: usize,
    target: usize,
    now: Millis,
) -> Result<MergeOutcome, ActionError> {
    if source == target {
        return Err(ActionError::InvalidTarget);
    }
    let source_item = *grid.get(source).ok_or(ActionError::InvalidTarget)?;
    let target_item = *grid.get(target).ok_or(ActionError::InvalidTarget)?;
    if !source_item.can_merge_with(&target_item) {
        return Err(ActionError::InvalidTarget);
    }

    // The real operand names the result chain. With two real pieces they
    // already share chain and level, so the target stands in for both.
    let (chain, level) = target_item
        .as_piece()
        .or_else(|| source_item.as_piece())
        .ok_or(ActionError::InvalidTarget)?;
    if level >= registry.max_level(chain) {
        return Err(ActionError::InvalidTarget);
    }
    let result_level = level + 1;

    grid.take(source);
    grid.set(target, Some(Item::piece(chain, result_level)));

    let (row, col) = grid.row_col(target);
    let unlocked = grid.try_unlock_cobweb(row, col);

    let bonus_coins = if result_level >= tuning.high_tier_bonus_level {
        result_level as u64 * tuning.high_tier_bonus_coins_per_level
    } else {
        0
    };

    let bubble = maybe_spawn_bubble(grid, registry, tuning, rng, result_level, now);

    Ok(MergeOutcome {
        index: target,
        chain,
        level: result_level,
        unlocked,
        bubble,
        bonus_coins,
    })
}

/// Move a dragged item onto an empty, unlocked cell.
pub fn plain_move(grid: &mut Grid, source: usize, target: usize) -> Result<(), ActionError> {
    if source == target || !grid.cell_is_empty(target) {
        return Err(ActionError::InvalidTarget);
    }
    let item = grid.take(source).ok_or(ActionError::InvalidTarget)?;
    grid.set(target, Some(item));
    Ok(())
}

/// Higher-level merges are likelier to leave a bubble behind:
/// `base + result_level * per_level`, a level-1 piece of a uniformly random
/// chain, in the first empty cell. Skipped when the board is full.
fn maybe_spawn_bubble(
    grid: &mut Grid,
    registry: &Registry,
    tuning: &Tuning,
    rng: &mut GameRng,
    result_level: u8,
    now: Millis,
) -> Option<BubbleSpawn> {
    let chance =
        tuning.bubble_base_chance + tuning.bubble_per_level_chance * Fixed64::from_num(result_level);
    if !rng.chance(chance) {
        return None;
    }
    let chain = ChainId(rng.next_below(registry.chain_count() as u32));
    let index = grid.find_empty_cell()?;
    grid.set(
        index,
        Some(Item::bubble(chain, 1, now + tuning.bubble_duration_ms)),
    );
    Some(BubbleSpawn { index, chain })
}
