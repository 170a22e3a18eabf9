use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for probabilities and price multipliers so outcomes are
/// bit-reproducible across platforms. Never use `f64` in game logic.
pub type Fixed64 = I32F32;

/// Milliseconds of wall-clock time as reported by the host.
///
/// The engine never reads a clock itself; every time-sensitive operation
/// takes `now: Millis` from the caller, which keeps tests deterministic
/// and makes offline catch-up a plain subtraction.
pub type Millis = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in game logic.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in game logic.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Multiply an integer level by a fixed-point multiplier and floor the result.
#[inline]
pub fn scale_floor(value: u32, multiplier: Fixed64) -> u64 {
    (Fixed64::from_num(value) * multiplier).to_num::<u64>()
}
