//! Confidence scoring for the multi-gate strategy.
//!
//! Four sub-scores, each clamped to [0, 1] with undefined values counted as 0,
//! are weighted and summed; the sum is clamped to [0, 1] again.

use serde::{Deserialize, Serialize};

use super::frame::GateFrame;
use crate::config::{ConfidenceWeights, HorizonRule};

/// Floor for `vol_mult - 1` so a degenerate multiplier cannot divide by zero.
const MIN_SURGE_SPAN: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub ma_gap: f64,
    pub trend_strength: f64,
    pub vol_strength: f64,
    pub vol_penalty: f64,
}

impl ScoreInputs {
    /// Sub-scores at one bar of a computed frame.
    pub fn at(frame: &GateFrame, index: usize, rule: &HorizonRule) -> Self {
        let value = |series: &[f64]| series.get(index).copied().unwrap_or(f64::NAN);

        let ma_long = value(&frame.ma_long);
        let ma_gap = divide((value(&frame.ma_short) - ma_long).abs(), ma_long);
        let trend_strength = divide(value(&frame.slope).abs(), ma_long);

        // Only event bars earn volume strength.
        let vol_strength = if frame.is_event_at(index) {
            (value(&frame.vol_ratio) - 1.0) / (rule.vol_mult - 1.0).max(MIN_SURGE_SPAN)
        } else {
            0.0
        };

        let q = value(&frame.atr_pct_q);
        let vol_penalty = divide(value(&frame.atr_pct) - q, q);

        Self {
            ma_gap: unit(ma_gap),
            trend_strength: unit(trend_strength),
            vol_strength: unit(vol_strength),
            vol_penalty: unit(vol_penalty),
        }
    }
}

/// Weighted confidence in [0, 1].
pub fn score(inputs: &ScoreInputs, weights: &ConfidenceWeights) -> f64 {
    let raw = weights.ma_gap * inputs.ma_gap
        + weights.trend_strength * inputs.trend_strength
        + weights.vol_strength * inputs.vol_strength
        + weights.vol_penalty * inputs.vol_penalty;
    unit(raw)
}

/// Clamp to [0, 1]; NaN becomes 0.
pub(crate) fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// `num / den`, NaN when the denominator is zero or undefined.
pub(crate) fn divide(num: f64, den: f64) -> f64 {
    if den == 0.0 || den.is_nan() {
        f64::NAN
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_clamps_and_zeroes_nan() {
        assert_eq!(unit(f64::NAN), 0.0);
        assert_eq!(unit(-0.3), 0.0);
        assert_eq!(unit(1.7), 1.0);
        assert_eq!(unit(f64::INFINITY), 1.0);
        assert_eq!(unit(0.25), 0.25);
    }

    #[test]
    fn divide_by_zero_is_undefined() {
        assert!(divide(1.0, 0.0).is_nan());
        assert!(divide(1.0, f64::NAN).is_nan());
        assert_eq!(divide(1.0, 4.0), 0.25);
    }

    #[test]
    fn default_weights_combine_sub_scores() {
        let inputs = ScoreInputs {
            ma_gap: 0.5,
            trend_strength: 0.2,
            vol_strength: 1.0,
            vol_penalty: 0.0,
        };
        // 0.45*0.5 + 0.35*0.2 + 0.20*1.0 = 0.225 + 0.07 + 0.2 = 0.495
        let confidence = score(&inputs, &ConfidenceWeights::default());
        assert!((confidence - 0.495).abs() < 1e-12);
    }

    #[test]
    fn penalty_can_drive_confidence_to_zero() {
        let inputs = ScoreInputs {
            ma_gap: 0.1,
            trend_strength: 0.0,
            vol_strength: 0.0,
            vol_penalty: 1.0,
        };
        assert_eq!(score(&inputs, &ConfidenceWeights::default()), 0.0);
    }

    #[test]
    fn large_weights_are_clamped() {
        let weights = ConfidenceWeights {
            ma_gap: 10.0,
            trend_strength: 10.0,
            vol_strength: 10.0,
            vol_penalty: 0.0,
        };
        let inputs = ScoreInputs {
            ma_gap: 1.0,
            trend_strength: 1.0,
            vol_strength: 1.0,
            vol_penalty: 0.0,
        };
        assert_eq!(score(&inputs, &weights), 1.0);
    }

    #[test]
    fn zero_inputs_score_zero() {
        assert_eq!(
            score(&ScoreInputs::default(), &ConfidenceWeights::default()),
            0.0
        );
    }
}
