//! Indicator library: stateless rolling-window computations.
//!
//! Every function takes an ordered series of N values and returns N values
//! aligned index-for-index with the input. Positions without enough history
//! are `f64::NAN`; a window containing NaN yields NaN (min-periods = window).
//! Boolean series treat undefined inputs as `false`, which is what every
//! comparison against NaN evaluates to.

pub mod atr;
pub mod confirm;
pub mod momentum;
pub mod quantile;
pub mod sma;

pub use atr::{atr, true_range};
pub use confirm::confirm_bars;
pub use momentum::{pct_change, ratio, shift, slope};
pub use quantile::{quantile_sorted, rolling_quantile};
pub use sma::sma;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
