//! ATR-based target price band, scaled by a fundamentals factor.
//!
//! The technical band spans `close - 1.5·ATR` to `close + 2.0·ATR`. Its width on
//! each side is scaled by a factor in [0.7, 1.3] derived from ROE and debt
//! ratio, and both bounds are rounded to the nearest 10 (KRW tick).

use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;

pub const TARGET_BASIS: &str = "mixed_atr_roe_debt";

const ATR_LOOKBACK: usize = 14;
const DOWNSIDE_ATR: f64 = 1.5;
const UPSIDE_ATR: f64 = 2.0;
const PRICE_TICK: f64 = 10.0;

/// Latest reported fundamentals for a ticker, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FundamentalRatios {
    pub roe: Option<f64>,
    pub debt_ratio: Option<f64>,
}

impl FundamentalRatios {
    /// Band scale: strong ROE and low leverage widen it, weak ROE and high leverage narrow it.
    pub fn factor(&self) -> f64 {
        let mut factor: f64 = 1.0;
        match self.roe.filter(|v| v.is_finite()) {
            Some(roe) if roe >= 15.0 => factor += 0.1,
            Some(roe) if roe <= 5.0 => factor -= 0.1,
            _ => {}
        }
        match self.debt_ratio.filter(|v| v.is_finite()) {
            Some(debt) if debt >= 200.0 => factor -= 0.1,
            Some(debt) if debt <= 100.0 => factor += 0.05,
            _ => {}
        }
        factor.clamp(0.7, 1.3)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub low: f64,
    pub high: f64,
    pub basis: String,
    /// ATR used, rounded to 2 decimals.
    pub atr: f64,
    /// Fundamentals factor applied, rounded to 2 decimals.
    pub factor: f64,
}

/// Target band for the latest bar, or `None` when no positive close or ATR exists.
///
/// Bars with a missing close are skipped; a missing high or low is replaced
/// by the close of the same bar.
pub fn target_range(bars: &[PriceBar], ratios: Option<FundamentalRatios>) -> Option<TargetRange> {
    let mut sorted: Vec<&PriceBar> = bars.iter().filter(|b| b.close.is_finite()).collect();
    sorted.sort_by_key(|b| b.date);

    let latest_close = sorted.last()?.close;
    if latest_close <= 0.0 {
        return None;
    }

    let mut true_ranges = Vec::with_capacity(sorted.len());
    let mut prev_close: Option<f64> = None;
    for bar in &sorted {
        let high = if bar.high.is_finite() { bar.high } else { bar.close };
        let low = if bar.low.is_finite() { bar.low } else { bar.close };
        let tr = match prev_close {
            None => high - low,
            Some(pc) => (high - low).max((high - pc).abs()).max((low - pc).abs()),
        };
        true_ranges.push(tr);
        prev_close = Some(bar.close);
    }

    let lookback = ATR_LOOKBACK.min(true_ranges.len());
    let atr = true_ranges[true_ranges.len() - lookback..].iter().sum::<f64>() / lookback as f64;
    if atr.is_nan() || atr <= 0.0 {
        return None;
    }

    let factor = ratios.unwrap_or_default().factor();
    let low = latest_close - DOWNSIDE_ATR * atr * factor;
    let high = latest_close + UPSIDE_ATR * atr * factor;

    Some(TargetRange {
        low: round_to_tick(low),
        high: round_to_tick(high),
        basis: TARGET_BASIS.to_string(),
        atr: round2(atr),
        factor: round2(factor),
    })
}

fn round_to_tick(price: f64) -> f64 {
    (price / PRICE_TICK).round() * PRICE_TICK
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
