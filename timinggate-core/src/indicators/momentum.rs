//! Lagged-difference series: shift, ratio, momentum (percent change) and slope.

/// Value from `lag` bars earlier; NaN for the first `lag` positions.
pub fn shift(values: &[f64], lag: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in lag..n {
        result[i] = values[i - lag];
    }
    result
}

/// Element-wise `num / den`. A zero or NaN denominator yields NaN, never infinity.
pub fn ratio(num: &[f64], den: &[f64]) -> Vec<f64> {
    num.iter()
        .zip(den)
        .map(|(&n, &d)| if d == 0.0 || d.is_nan() { f64::NAN } else { n / d })
        .collect()
}

/// Momentum: `values[t] / values[t - lookback] - 1`.
pub fn pct_change(values: &[f64], lookback: usize) -> Vec<f64> {
    ratio(values, &shift(values, lookback))
        .into_iter()
        .map(|r| r - 1.0)
        .collect()
}

/// Per-bar slope over `lookback` bars: `(values[t] - values[t - lookback]) / lookback`.
pub fn slope(values: &[f64], lookback: usize) -> Vec<f64> {
    if lookback == 0 {
        return vec![f64::NAN; values.len()];
    }
    values
        .iter()
        .zip(shift(values, lookback))
        .map(|(&cur, prev)| (cur - prev) / lookback as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn shift_pads_with_nan() {
        let result = shift(&[1.0, 2.0, 3.0], 1);
        assert!(result[0].is_nan());
        assert_eq!(&result[1..], &[1.0, 2.0]);
        assert!(shift(&[1.0], 3)[0].is_nan());
    }

    #[test]
    fn ratio_zero_denominator_is_undefined() {
        let result = ratio(&[1.0, 2.0, 3.0], &[2.0, 0.0, f64::NAN]);
        assert_approx(result[0], 0.5, DEFAULT_EPSILON);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
    }

    #[test]
    fn pct_change_basic() {
        let result = pct_change(&[100.0, 105.0, 110.0, 99.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 0.10, DEFAULT_EPSILON);
        assert_approx(result[3], 99.0 / 105.0 - 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn pct_change_from_zero_price_is_undefined() {
        let result = pct_change(&[0.0, 10.0], 1);
        assert!(result[1].is_nan());
    }

    #[test]
    fn slope_basic() {
        let result = slope(&[f64::NAN, 10.0, 12.0, 16.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // (12 - NaN) / 2
        assert!(result[2].is_nan());
        // (16 - 10) / 2 = 3
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn slope_zero_lookback_is_undefined() {
        assert!(slope(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }
}
