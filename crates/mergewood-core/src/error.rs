//! The shared failure taxonomy for gameplay operations.
//!
//! Every player-facing operation returns `Result<_, ActionError>`. A failure
//! is always local and non-fatal: the operation either fully applies or
//! fully no-ops, and no error ever crosses a component boundary as a panic.

use crate::fixed::Millis;
use crate::id::Resource;

/// Why a gameplay operation could not be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A currency, energy pool, or charge count was too low.
    #[error("not enough {0:?}")]
    InsufficientResource(Resource),

    /// No empty cell (or inventory slot) was available for the operation.
    #[error("no space available")]
    NoSpace,

    /// The target is the wrong kind of thing for this operation: an
    /// incompatible merge pair, a max-level item, a producer marker where
    /// a piece is required, and so on.
    #[error("invalid target")]
    InvalidTarget,

    /// The producer's buffer is exhausted and its cooldown has not elapsed.
    #[error("still cooling, {remaining_ms} ms remaining")]
    StillCooling { remaining_ms: Millis },

    /// A consumable producer has no uses left.
    #[error("producer is used up")]
    Depleted,
}

impl ActionError {
    /// Remaining cooldown rounded up to whole minutes, for UI messages.
    /// Zero for every other variant.
    pub fn cooldown_minutes(&self) -> u64 {
        match self {
            ActionError::StillCooling { remaining_ms } => remaining_ms.div_ceil(60_000),
            _ => 0,
        }
    }
}
