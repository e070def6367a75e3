//! Whole-table indicator and gate series for the multi-gate strategy.
//!
//! Every series is aligned with the input table. Gates are plain booleans:
//! a comparison that touches an undefined (NaN) input is `false`, so missing
//! history and zero denominators can only ever close a gate, never open one.

use crate::config::{HorizonRule, FALLBACK_WINDOW};
use crate::domain::{Column, PriceTable, Signal, WaitReason};
use crate::indicators::{self, atr, confirm_bars, pct_change, ratio, rolling_quantile, sma};

/// Which ceiling the volatility gate compared against at a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeilingSource {
    /// Rolling `vol_q` quantile of ATR% over `vol_q_window` bars.
    Quantile,
    /// 60-bar SMA of ATR%, used until the quantile window fills.
    Fallback,
    /// Neither ceiling defined; the gate is closed.
    None,
}

impl CeilingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CeilingSource::Quantile => "quantile",
            CeilingSource::Fallback => "fallback",
            CeilingSource::None => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateFrame {
    pub close: Vec<f64>,
    pub ma_short: Vec<f64>,
    pub ma_long: Vec<f64>,
    pub momentum: Vec<f64>,
    /// Per-bar slope of the long MA over `slope_lb` bars.
    pub slope: Vec<f64>,
    pub vol_ma: Vec<f64>,
    pub vol_ratio: Vec<f64>,
    pub atr_pct: Vec<f64>,
    pub atr_pct_q: Vec<f64>,
    pub atr_pct_fallback: Vec<f64>,
    pub ceiling_source: Vec<CeilingSource>,

    pub buy_base: Vec<bool>,
    pub sell_base: Vec<bool>,
    pub buy_trend: Vec<bool>,
    pub sell_trend: Vec<bool>,
    pub atr_gate: Vec<bool>,
    pub buy_event: Vec<bool>,
    pub sell_event: Vec<bool>,
    pub buy_volume_gate: Vec<bool>,
    pub sell_volume_gate: Vec<bool>,
    pub buy_raw: Vec<bool>,
    pub sell_raw: Vec<bool>,
    pub buy_confirmed: Vec<bool>,
    pub sell_confirmed: Vec<bool>,
}

impl GateFrame {
    /// Compute every series over the whole table.
    ///
    /// Fails only when a column the gates read is absent.
    pub fn compute(table: &PriceTable, rule: &HorizonRule) -> Result<Self, WaitReason> {
        let column = |c: Column| table.column(c).ok_or(WaitReason::MissingColumn(c));
        let high = column(Column::High)?;
        let low = column(Column::Low)?;
        let close = column(Column::Close)?;
        let volume = column(Column::Volume)?;

        let ma_short = sma(close, rule.short);
        let ma_long = sma(close, rule.long);
        let momentum = pct_change(close, rule.mom);
        let slope = indicators::slope(&ma_long, rule.slope_lb);

        let vol_ma = sma(volume, rule.vol_n);
        let vol_ratio = ratio(volume, &vol_ma);

        let atr_pct = ratio(&atr(high, low, close, rule.atr_n), close);
        let atr_pct_q = rolling_quantile(&atr_pct, rule.vol_q_window, rule.vol_q);
        let atr_pct_fallback = sma(&atr_pct, FALLBACK_WINDOW);

        let n = close.len();
        let mut frame = GateFrame {
            close: close.to_vec(),
            ma_short,
            ma_long,
            momentum,
            slope,
            vol_ma,
            vol_ratio,
            atr_pct,
            atr_pct_q,
            atr_pct_fallback,
            ceiling_source: Vec::with_capacity(n),
            buy_base: Vec::with_capacity(n),
            sell_base: Vec::with_capacity(n),
            buy_trend: Vec::with_capacity(n),
            sell_trend: Vec::with_capacity(n),
            atr_gate: Vec::with_capacity(n),
            buy_event: Vec::with_capacity(n),
            sell_event: Vec::with_capacity(n),
            buy_volume_gate: Vec::with_capacity(n),
            sell_volume_gate: Vec::with_capacity(n),
            buy_raw: Vec::with_capacity(n),
            sell_raw: Vec::with_capacity(n),
            buy_confirmed: Vec::new(),
            sell_confirmed: Vec::new(),
        };

        for t in 0..n {
            frame.push_gates(t, rule);
        }

        frame.buy_confirmed = confirm_bars(&frame.buy_raw, rule.confirm);
        frame.sell_confirmed = confirm_bars(&frame.sell_raw, rule.confirm);
        Ok(frame)
    }

    fn push_gates(&mut self, t: usize, rule: &HorizonRule) {
        let close = self.close[t];
        let ma_s = self.ma_short[t];
        let ma_l = self.ma_long[t];
        let mom = self.momentum[t];
        let slope = self.slope[t];

        let buy_base = ma_s > ma_l && mom > 0.0;
        let sell_base = ma_s < ma_l && mom < 0.0;

        let buy_trend = close > ma_l && slope > 0.0;
        let sell_trend = close < ma_l && slope < 0.0;

        let atr_pct = self.atr_pct[t];
        let (atr_gate, source) = if !self.atr_pct_q[t].is_nan() {
            (atr_pct <= self.atr_pct_q[t], CeilingSource::Quantile)
        } else if !self.atr_pct_fallback[t].is_nan() {
            (atr_pct <= self.atr_pct_fallback[t], CeilingSource::Fallback)
        } else {
            (false, CeilingSource::None)
        };

        // Event bars compare against the previous bar's close/short-MA
        // relationship. At t = 0 the previous values are NaN and the
        // comparison is false, so the first bar is never an event.
        let (prev_close, prev_ma_s) = if t > 0 {
            (self.close[t - 1], self.ma_short[t - 1])
        } else {
            (f64::NAN, f64::NAN)
        };
        let buy_event = close > ma_s && prev_close <= prev_ma_s;
        let sell_event = close < ma_s && prev_close >= prev_ma_s;

        let vol_ratio = self.vol_ratio[t];
        let relaxed = vol_ratio >= 1.0;
        let surge = vol_ratio >= rule.vol_mult;
        let buy_volume_gate = if buy_event { surge } else { relaxed };
        let sell_volume_gate = if sell_event { surge } else { relaxed };

        self.ceiling_source.push(source);
        self.buy_base.push(buy_base);
        self.sell_base.push(sell_base);
        self.buy_trend.push(buy_trend);
        self.sell_trend.push(sell_trend);
        self.atr_gate.push(atr_gate);
        self.buy_event.push(buy_event);
        self.sell_event.push(sell_event);
        self.buy_volume_gate.push(buy_volume_gate);
        self.sell_volume_gate.push(sell_volume_gate);
        self.buy_raw.push(buy_base && buy_trend && atr_gate && buy_volume_gate);
        self.sell_raw.push(sell_base && sell_trend && atr_gate && sell_volume_gate);
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Published decision at `index`: BUY only if the confirmed BUY condition
    /// holds and the confirmed SELL condition does not, SELL mirrored, WAIT
    /// otherwise (both confirmed included). Out-of-range indices are WAIT.
    pub fn decision_at(&self, index: usize) -> Signal {
        let buy = self.buy_confirmed.get(index).copied().unwrap_or(false);
        let sell = self.sell_confirmed.get(index).copied().unwrap_or(false);
        match (buy, sell) {
            (true, false) => Signal::Buy,
            (false, true) => Signal::Sell,
            _ => Signal::Wait,
        }
    }

    pub fn is_event_at(&self, index: usize) -> bool {
        self.buy_event.get(index).copied().unwrap_or(false)
            || self.sell_event.get(index).copied().unwrap_or(false)
    }

    /// First last-bar quantity the gates need that is undefined at `index`.
    pub fn undefined_at(&self, index: usize) -> Option<&'static str> {
        let value = |series: &[f64]| series.get(index).copied().unwrap_or(f64::NAN);
        if !value(&self.close).is_finite() {
            Some("close")
        } else if !value(&self.ma_long).is_finite() || value(&self.ma_long) == 0.0 {
            Some("ma_long")
        } else if !value(&self.atr_pct).is_finite() {
            Some("atr_pct")
        } else if !value(&self.vol_ratio).is_finite() {
            Some("vol_ma")
        } else {
            None
        }
    }
}
