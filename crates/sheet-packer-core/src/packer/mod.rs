pub mod growing;

pub use growing::{GrowLimits, GrowingPacker};

/// Smallest power of two that is `>= v` (1 for `v <= 1`).
pub fn next_pow2(v: u32) -> u32 {
    if v <= 1 {
        return 1;
    }
    v.checked_next_power_of_two().unwrap_or(1 << 31)
}
