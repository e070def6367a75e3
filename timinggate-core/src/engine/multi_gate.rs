//! Multi-gate strategy (`simple_ma_v2_gate3`).
//!
//! Base, trend, volatility and volume gates are ANDed per direction, then
//! each raw condition must persist for `confirm` bars before it is published.

use std::collections::BTreeMap;
use tracing::trace;

use super::frame::{CeilingSource, GateFrame};
use super::scoring::{score, ScoreInputs};
use super::{base_debug, screen, SignalStrategy};
use crate::config::{ConfidenceWeights, EngineKind, Horizon, HorizonRule, FALLBACK_WINDOW};
use crate::domain::{DebugValue, PriceTable, Signal, SignalResult, WaitReason};

/// Trigger emitted for every WAIT decision.
pub const GATES_NOT_SATISFIED: &str = "Gates not satisfied";

#[derive(Debug, Clone, Copy, Default)]
pub struct MultiGateStrategy;

impl SignalStrategy for MultiGateStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::MultiGate
    }

    fn evaluate(
        &self,
        table: &PriceTable,
        horizon: Horizon,
        rule: &HorizonRule,
        weights: &ConfidenceWeights,
    ) -> SignalResult {
        if let Some(early) = screen(table, horizon, self.kind(), self.min_history(rule)) {
            return early;
        }
        let frame = match GateFrame::compute(table, rule) {
            Ok(frame) => frame,
            Err(reason) => return SignalResult::wait(reason),
        };

        let last = frame.len() - 1;
        let signal = frame.decision_at(last);
        let inputs = ScoreInputs::at(&frame, last, rule);
        let confidence = score(&inputs, weights);

        trace!(
            horizon = %horizon,
            buy_raw = frame.buy_raw[last],
            sell_raw = frame.sell_raw[last],
            atr_gate = frame.atr_gate[last],
            vol_ratio = frame.vol_ratio[last],
            ma_gap = inputs.ma_gap,
            trend_strength = inputs.trend_strength,
            vol_strength = inputs.vol_strength,
            vol_penalty = inputs.vol_penalty,
            "gate detail"
        );

        let mut result = SignalResult {
            signal,
            confidence,
            triggers: triggers(&frame, last, signal, rule),
            debug: gate_debug(&frame, last, horizon),
            reason: None,
        };

        if signal == Signal::Wait {
            if let Some(quantity) = frame.undefined_at(last) {
                result.confidence = 0.0;
                result.set_reason(WaitReason::Undefined(quantity.to_string()));
            }
        }
        result
    }
}

fn triggers(frame: &GateFrame, index: usize, signal: Signal, rule: &HorizonRule) -> Vec<String> {
    let (cmp, event) = match signal {
        Signal::Buy => (">", frame.buy_event[index]),
        Signal::Sell => ("<", frame.sell_event[index]),
        Signal::Wait => return vec![GATES_NOT_SATISFIED.to_string()],
    };

    let ceiling = match frame.ceiling_source[index] {
        CeilingSource::Fallback => format!("ATR{}% <= SMA{}", rule.atr_n, FALLBACK_WINDOW),
        _ => format!("ATR{}% <= Q{}", rule.atr_n, (rule.vol_q * 100.0).round()),
    };
    let volume = if event {
        format!("VolumeSurge x{:.2}", rule.vol_mult)
    } else {
        "VolumeGate".to_string()
    };

    let mut out = vec![
        format!("MA{} {cmp} MA{}", rule.short, rule.long),
        format!("Mom{}d {cmp} 0", rule.mom),
        format!("Close {cmp} MA{}, Slope{} {cmp} 0", rule.long, rule.slope_lb),
        ceiling,
        volume,
    ];
    if rule.confirm > 1 {
        out.push(format!("Confirm{}", rule.confirm));
    }
    out
}

fn gate_debug(
    frame: &GateFrame,
    index: usize,
    horizon: Horizon,
) -> BTreeMap<String, DebugValue> {
    let mut debug = base_debug(EngineKind::MultiGate, horizon);
    let flags = [
        ("buy_base", frame.buy_base[index]),
        ("sell_base", frame.sell_base[index]),
        ("buy_trend", frame.buy_trend[index]),
        ("sell_trend", frame.sell_trend[index]),
        ("atr_gate", frame.atr_gate[index]),
        ("buy_event", frame.buy_event[index]),
        ("sell_event", frame.sell_event[index]),
        ("buy_volume_gate", frame.buy_volume_gate[index]),
        ("sell_volume_gate", frame.sell_volume_gate[index]),
        ("buy_raw", frame.buy_raw[index]),
        ("sell_raw", frame.sell_raw[index]),
    ];
    for (key, value) in flags {
        debug.insert(key.to_string(), DebugValue::Bool(value));
    }
    debug.insert(
        "atr_gate_source".to_string(),
        DebugValue::from(frame.ceiling_source[index].as_str()),
    );
    debug.insert("vol_ratio".to_string(), DebugValue::number(frame.vol_ratio[index]));
    debug.insert("atr_pct".to_string(), DebugValue::number(frame.atr_pct[index]));
    debug.insert("atr_pct_q".to_string(), DebugValue::number(frame.atr_pct_q[index]));
    debug
}
