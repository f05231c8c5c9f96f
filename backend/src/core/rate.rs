//! Fixed-point rates
//!
//! Rates arrive as `f64` at the configuration boundary and are converted
//! exactly once into parts-per-billion integers. Every downstream quantity
//! (ending target, termination floors, hire ceilings, guard comparisons) is
//! then computed with integer arithmetic, so there is no floating-point
//! drift anywhere in the pipeline.
//!
//! # Critical Invariants
//!
//! 1. A `Rate` is an `i64` count of billionths; `Rate::ONE` is `1_000_000_000`
//! 2. Conversion from `f64` rounds to the nearest billionth and happens once
//! 3. All products with population counts are carried out in `i128`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fixed-point units in `1.0`.
pub const RATE_SCALE: i64 = 1_000_000_000;

/// Exact fixed-point rate in parts per billion.
///
/// # Example
/// ```
/// use workforce_transition_core_rs::core::rate::Rate;
///
/// let rate = Rate::from_f64(0.25).unwrap();
/// assert_eq!(rate.ppb(), 250_000_000);
/// assert_eq!(rate.floor_of(7000), 1750);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(i64);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const ONE: Rate = Rate(RATE_SCALE);

    /// Convert a real-valued rate to fixed point.
    ///
    /// Returns `None` for NaN, infinities, and magnitudes that do not fit
    /// in the fixed-point range.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * RATE_SCALE as f64).round();
        if scaled.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Rate(scaled as i64))
    }

    pub const fn from_ppb(ppb: i64) -> Self {
        Rate(ppb)
    }

    pub fn ppb(self) -> i64 {
        self.0
    }

    /// Lossy view for display and serialization of configs.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / RATE_SCALE as f64
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Rate {
        Rate(self.0.saturating_abs())
    }

    /// `1 - self`
    pub fn complement(self) -> Rate {
        Rate(RATE_SCALE.saturating_sub(self.0))
    }

    /// `1 + self`
    pub fn one_plus(self) -> Rate {
        Rate(RATE_SCALE.saturating_add(self.0))
    }

    /// `floor(count * self)`
    pub fn floor_of(self, count: u64) -> i128 {
        floor_div(count as i128 * self.0 as i128, RATE_SCALE as i128)
    }

    /// `round_half_even(count * self)`
    pub fn round_half_even_of(self, count: u64) -> i128 {
        round_half_even_div(count as i128 * self.0 as i128, RATE_SCALE as i128)
    }

    /// `ceil(numerator / self)`, or `None` when the rate is not positive.
    pub fn ceil_divide(self, numerator: i128) -> Option<i128> {
        if self.0 <= 0 {
            return None;
        }
        Some(ceil_div(numerator * RATE_SCALE as i128, self.0 as i128))
    }

    /// Whether `value <= count * self`, compared exactly.
    pub fn admits(self, value: i128, count: u64) -> bool {
        value * RATE_SCALE as i128 <= count as i128 * self.0 as i128
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

// ============================================================================
// Integer rounding helpers
// ============================================================================

/// Floor division for a positive divisor.
pub fn floor_div(numerator: i128, divisor: i128) -> i128 {
    debug_assert!(divisor > 0);
    let quotient = numerator / divisor;
    if numerator % divisor < 0 {
        quotient - 1
    } else {
        quotient
    }
}

/// Ceiling division for a positive divisor.
pub fn ceil_div(numerator: i128, divisor: i128) -> i128 {
    -floor_div(-numerator, divisor)
}

/// Division rounded to nearest, ties to even, for a positive divisor.
pub fn round_half_even_div(numerator: i128, divisor: i128) -> i128 {
    let quotient = floor_div(numerator, divisor);
    let twice_remainder = 2 * (numerator - quotient * divisor);
    if twice_remainder > divisor || (twice_remainder == divisor && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}
