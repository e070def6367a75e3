//! PriceBar: one trading-period observation for a single ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV observation.
///
/// Volume is a real number so fractional-share and adjusted volumes survive
/// the trip from the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Returns true if any OHLCV field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: high >= max(open, close, low), low <= min(...),
    /// positive prices and non-negative volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// Violations of the input shape contract.
///
/// These are the only hard failures in the crate; everything the numerical
/// core can tolerate degrades to a WAIT result instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("duplicate bar for date {0}")]
    DuplicateDate(NaiveDate),

    #[error("dates are not ascending at index {index} ({date})")]
    Unsorted { index: usize, date: NaiveDate },

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
