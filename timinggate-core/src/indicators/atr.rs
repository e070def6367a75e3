//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR is the simple moving average of true range over `window` bars.
//! Lookback: window - 1 (the first bar's TR is high-low, so no extra bar is lost).

use super::sma::sma;

/// Compute the True Range series from OHLC columns.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
///
/// Candidates that are NaN are skipped; TR is NaN only when all three are.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = vec![f64::NAN; n];

    for i in 0..n {
        let h = high[i];
        let l = low[i];
        let candidates = if i == 0 {
            [(h - l).abs(), f64::NAN, f64::NAN]
        } else {
            let pc = close[i - 1];
            [(h - l).abs(), (h - pc).abs(), (l - pc).abs()]
        };
        tr[i] = candidates
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(f64::NAN, f64::max);
    }

    tr
}

/// ATR over `window` bars: SMA of the true range.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Vec<f64> {
    sma(&true_range(high, low, close), window)
}
