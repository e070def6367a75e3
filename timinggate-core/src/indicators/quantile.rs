//! Rolling quantile.
//!
//! The q-quantile of the trailing `window` values, interpolated linearly
//! between the two nearest order statistics. Undefined until `window` values
//! have been observed, and for any window containing NaN.
//! Lookback: window - 1.

/// Linear-interpolation quantile of an already sorted slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let pos = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let idx = pos.floor() as usize;
            let frac = pos - idx as f64;
            let next = (idx + 1).min(len - 1);
            sorted[idx] + frac * (sorted[next] - sorted[idx])
        }
    }
}

pub fn rolling_quantile(values: &[f64], window: usize, q: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window == 0 || n < window {
        return result;
    }

    let mut scratch = Vec::with_capacity(window);
    for (i, win) in values.windows(window).enumerate() {
        if win.iter().any(|v| v.is_nan()) {
            continue;
        }
        scratch.clear();
        scratch.extend_from_slice(win);
        scratch.sort_by(f64::total_cmp);
        result[i + window - 1] = quantile_sorted(&scratch, q);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn quantile_sorted_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_approx(quantile_sorted(&sorted, 0.0), 1.0, DEFAULT_EPSILON);
        assert_approx(quantile_sorted(&sorted, 1.0), 4.0, DEFAULT_EPSILON);
        // pos = 0.5 * 3 = 1.5 → 2.5
        assert_approx(quantile_sorted(&sorted, 0.5), 2.5, DEFAULT_EPSILON);
        // pos = 0.9 * 3 = 2.7 → 3.7
        assert_approx(quantile_sorted(&sorted, 0.9), 3.7, DEFAULT_EPSILON);
    }

    #[test]
    fn quantile_sorted_edge_sizes() {
        assert!(quantile_sorted(&[], 0.5).is_nan());
        assert_eq!(quantile_sorted(&[7.0], 0.9), 7.0);
    }

    #[test]
    fn rolling_quantile_window_3() {
        let result = rolling_quantile(&[5.0, 1.0, 3.0, 10.0, 2.0], 3, 0.5);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // median(5,1,3) = 3
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        // median(1,3,10) = 3
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        // median(3,10,2) = 3
        assert_approx(result[4], 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_quantile_high_q_tracks_upper_tail() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let result = rolling_quantile(&values, 10, 0.9);
        // pos = 0.9 * 9 = 8.1 → 9 + 0.1 * (10 - 9) = 9.1
        assert_approx(result[9], 9.1, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_quantile_nan_in_window() {
        let result = rolling_quantile(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2, 0.5);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_quantile_insufficient_history() {
        let result = rolling_quantile(&[1.0, 2.0], 252, 0.9);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
