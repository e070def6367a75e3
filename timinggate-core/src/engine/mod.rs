//! Signal engine: turns a price table into a BUY/WAIT/SELL decision for its last bar.
//!
//! Two strategies share one contract:
//!
//! - `MinimalStrategy` (`simple_ma_v1`): MA cross + momentum
//! - `MultiGateStrategy` (`simple_ma_v2_gate3`): base, trend, volatility and
//!   volume gates with confirm bars, scored by `scoring`
//!
//! Evaluation is a pure function of the table and configuration. Every
//! data-quality problem degrades to WAIT with a `WaitReason`; the engine never
//! panics or returns an error for a well-shaped table.

pub mod frame;
pub mod minimal;
pub mod multi_gate;
pub mod scoring;

use std::collections::BTreeMap;
use tracing::debug;

pub use frame::{CeilingSource, GateFrame};
pub use minimal::MinimalStrategy;
pub use multi_gate::{MultiGateStrategy, GATES_NOT_SATISFIED};
pub use scoring::{score, ScoreInputs};

use crate::config::{ConfidenceWeights, EngineConfig, EngineKind, Horizon, HorizonRule};
use crate::domain::{DebugValue, PriceTable, SignalResult, WaitReason};

/// A gating strategy.
///
/// # Contract
/// `evaluate` reads only the rows of `table` and always returns a result.
/// Tables that are empty, lack a column or are shorter than `min_history`
/// resolve to WAIT with the matching reason before any indicator is computed.
pub trait SignalStrategy: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Bars required before the last-bar decision is defined.
    fn min_history(&self, rule: &HorizonRule) -> usize {
        rule.min_history(self.kind())
    }

    fn evaluate(
        &self,
        table: &PriceTable,
        horizon: Horizon,
        rule: &HorizonRule,
        weights: &ConfidenceWeights,
    ) -> SignalResult;
}

static MINIMAL: MinimalStrategy = MinimalStrategy;
static MULTI_GATE: MultiGateStrategy = MultiGateStrategy;

pub fn strategy_for(kind: EngineKind) -> &'static dyn SignalStrategy {
    match kind {
        EngineKind::Minimal => &MINIMAL,
        EngineKind::MultiGate => &MULTI_GATE,
    }
}

/// Evaluate the configured strategy for `horizon` on the last bar of `table`.
pub fn evaluate(table: &PriceTable, horizon: Horizon, config: &EngineConfig) -> SignalResult {
    let strategy = strategy_for(config.engine);
    let result = strategy.evaluate(table, horizon, config.rule(horizon), &config.weights);

    debug!(
        horizon = %horizon,
        engine = %config.engine,
        bars = table.len(),
        signal = %result.signal,
        confidence = result.confidence,
        reason = ?result.reason,
        "signal evaluated"
    );
    result
}

/// Edge checks shared by both strategies, in order: missing column, no data,
/// insufficient history. `None` means the table is fit for evaluation.
pub(crate) fn screen(
    table: &PriceTable,
    horizon: Horizon,
    kind: EngineKind,
    min_history: usize,
) -> Option<SignalResult> {
    let early = |reason: WaitReason| {
        let mut result = SignalResult::wait(reason);
        result.debug.extend(base_debug(kind, horizon));
        result
    };

    if let Some(column) = table.first_missing_column() {
        return Some(early(WaitReason::MissingColumn(column)));
    }
    if table.is_empty() || !table.has_observations() {
        return Some(early(WaitReason::NoData));
    }
    if table.len() < min_history {
        return Some(
            early(WaitReason::InsufficientHistory)
                .with_debug("required_bars", min_history)
                .with_debug("available_bars", table.len()),
        );
    }
    None
}

pub(crate) fn base_debug(kind: EngineKind, horizon: Horizon) -> BTreeMap<String, DebugValue> {
    BTreeMap::from([
        ("engine".to_string(), DebugValue::from(kind.as_str())),
        ("horizon".to_string(), DebugValue::from(horizon.label())),
    ])
}
