//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the trailing `window` values.
//! Lookback: window - 1 (first valid value at index window-1).
//!
//! Each window is summed from scratch rather than rolled forward, so a window
//! of identical values reproduces that value exactly and no drift accumulates
//! across long series.

pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window == 0 || n < window {
        return result;
    }

    for (i, win) in values.windows(window).enumerate() {
        // NaN anywhere in the window propagates through the sum.
        result[i + window - 1] = win.iter().sum::<f64>() / window as f64;
    }

    result
}
