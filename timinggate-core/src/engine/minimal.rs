//! MA cross + momentum baseline (`simple_ma_v1`).

use super::scoring::{divide, unit};
use super::{base_debug, screen, SignalStrategy};
use crate::config::{ConfidenceWeights, EngineKind, Horizon, HorizonRule};
use crate::domain::{Column, DebugValue, PriceTable, Signal, SignalResult, WaitReason};
use crate::indicators::{pct_change, sma};

/// BUY when the short MA is above the long MA and momentum is positive, SELL
/// on the mirror condition, WAIT otherwise. Confidence is the relative MA gap.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalStrategy;

impl SignalStrategy for MinimalStrategy {
    fn kind(&self) -> EngineKind {
        EngineKind::Minimal
    }

    fn evaluate(
        &self,
        table: &PriceTable,
        horizon: Horizon,
        rule: &HorizonRule,
        _weights: &ConfidenceWeights,
    ) -> SignalResult {
        if let Some(early) = screen(table, horizon, self.kind(), self.min_history(rule)) {
            return early;
        }
        let Some(close) = table.column(Column::Close) else {
            return SignalResult::wait(WaitReason::MissingColumn(Column::Close));
        };

        let last = close.len() - 1;
        let ma_short = sma(close, rule.short)[last];
        let ma_long = sma(close, rule.long)[last];
        let momentum = pct_change(close, rule.mom)[last];

        let (signal, triggers) = if ma_short > ma_long && momentum > 0.0 {
            (
                Signal::Buy,
                vec![
                    format!("MA{} > MA{}", rule.short, rule.long),
                    format!("Mom{}d > 0", rule.mom),
                ],
            )
        } else if ma_short < ma_long && momentum < 0.0 {
            (
                Signal::Sell,
                vec![
                    format!("MA{} < MA{}", rule.short, rule.long),
                    format!("Mom{}d < 0", rule.mom),
                ],
            )
        } else {
            (
                Signal::Wait,
                vec![
                    format!("MA{} ~ MA{}", rule.short, rule.long),
                    format!("Mom{}d mixed", rule.mom),
                ],
            )
        };

        let mut result = SignalResult {
            signal,
            confidence: unit(divide((ma_short - ma_long).abs(), ma_long)),
            triggers,
            debug: base_debug(self.kind(), horizon),
            reason: None,
        };
        result
            .debug
            .insert("ma_short".into(), DebugValue::number(ma_short));
        result
            .debug
            .insert("ma_long".into(), DebugValue::number(ma_long));
        result
            .debug
            .insert("momentum".into(), DebugValue::number(momentum));

        if signal == Signal::Wait {
            let undefined = if !close[last].is_finite() {
                Some("close")
            } else if !ma_long.is_finite() || ma_long == 0.0 {
                Some("ma_long")
            } else {
                None
            };
            if let Some(quantity) = undefined {
                result.confidence = 0.0;
                result.set_reason(WaitReason::Undefined(quantity.to_string()));
            }
        }
        result
    }
}
