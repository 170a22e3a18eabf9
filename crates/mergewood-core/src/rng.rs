//! Deterministic PRNG for game logic (drop rolls, order generation,
//! bubble spawns).
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable with the save.

use crate::fixed::Fixed64;

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms, so a replayed input sequence against the
/// same seed reproduces the same game.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, bound)`. `bound` of 0 returns 0.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Multiply-shift reduction. The modulo bias is < 2^-32, irrelevant
        // for drop tables and order generation.
        ((self.next_u64() >> 32).wrapping_mul(bound as u64) >> 32) as u32
    }

    /// Returns `true` with the given probability (Fixed64 in [0, 1]).
    ///
    /// - probability <= 0 always returns false
    /// - probability >= 1 always returns true
    pub fn chance(&mut self, probability: Fixed64) -> bool {
        if probability <= Fixed64::ZERO {
            return false;
        }
        if probability >= Fixed64::from_num(1) {
            return true;
        }
        // Fixed64 is Q32.32: for p in (0,1) the raw bits hold the fractional
        // value scaled to [0, 2^32). Compare a uniform u32 against it.
        let upper = self.next_u64() >> 32;
        upper < probability.to_bits() as u64
    }

    /// Cumulative-weight roll over `weights`. Returns the index of the first
    /// entry whose subtraction drives the running remainder to zero or below,
    /// falling back to index 0 on the rounding edge case. Empty input
    /// returns 0.
    pub fn weighted_index(&mut self, weights: &[u32]) -> usize {
        let total: u64 = weights.iter().map(|&w| w as u64).sum();
        if total == 0 {
            return 0;
        }
        let mut roll = ((self.next_u64() >> 32).wrapping_mul(total) >> 32) as i64;
        for (i, &w) in weights.iter().enumerate() {
            roll -= w as i64;
            if roll < 0 {
                return i;
            }
        }
        0
    }

    /// Get the internal state (for diagnostics).
    pub fn state(&self) -> u64 {
        self.state
    }
}
