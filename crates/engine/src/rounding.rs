//! Currency rounding helpers shared by the allocator and the planner.

/// Tolerance below which a currency value is treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Looser tolerance for checking that a full allocation sums back to the
/// expense amount: individual 2-decimal roundings can stack.
pub const SUM_TOLERANCE: f64 = 1e-5;

/// Rounds a currency value to 2 decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
