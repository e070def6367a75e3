//! Batch evaluation across a ticker universe.
//!
//! Each ticker is evaluated independently against one shared, read-only
//! `EngineConfig`, so the fan-out is a plain `rayon` parallel map.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use timinggate_core::{
    evaluate, target_range, DebugValue, EngineConfig, FundamentalRatios, Horizon,
    PriceTable, Signal, SignalResult, TargetRange, WaitReason,
};

pub const NO_PRICE_DATA: &str = "NO_PRICE_DATA";
pub const INSUFFICIENT_HISTORY: &str = "INSUFFICIENT_HISTORY";

/// One row of a batch run, shaped like a published timing signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSignal {
    pub ticker: String,
    /// Date of the last bar evaluated.
    pub as_of: Option<NaiveDate>,
    pub horizon: Horizon,
    pub model_version: String,
    pub signal: Signal,
    pub confidence: f64,
    pub triggers: Vec<String>,
    pub risk_flags: Vec<String>,
    pub target: Option<TargetRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<WaitReason>,
    pub debug: BTreeMap<String, DebugValue>,
}

/// Risk flags for a result's wait reason. A table missing a price or volume
/// column counts as having no usable price data.
pub fn risk_flags(result: &SignalResult) -> Vec<String> {
    match &result.reason {
        Some(WaitReason::NoData | WaitReason::MissingColumn(_)) => {
            vec![NO_PRICE_DATA.to_string()]
        }
        Some(WaitReason::InsufficientHistory) => vec![INSUFFICIENT_HISTORY.to_string()],
        _ => Vec::new(),
    }
}

/// Evaluate one ticker and attach risk flags and the target band.
///
/// The target band is computed whenever price data exists, including on an
/// insufficient-history WAIT.
pub fn evaluate_ticker(
    ticker: &str,
    table: &PriceTable,
    horizon: Horizon,
    config: &EngineConfig,
    ratios: Option<FundamentalRatios>,
) -> TickerSignal {
    let result = evaluate(table, horizon, config);
    let risk_flags = risk_flags(&result);
    let target = if risk_flags.iter().any(|f| f == NO_PRICE_DATA) {
        None
    } else {
        target_range(&table.bars(), ratios)
    };

    TickerSignal {
        ticker: ticker.to_string(),
        as_of: table.last_date(),
        horizon,
        model_version: config.engine.as_str().to_string(),
        signal: result.signal,
        confidence: result.confidence,
        triggers: result.triggers,
        risk_flags,
        target,
        reason: result.reason,
        debug: result.debug,
    }
}

/// Evaluate every ticker in parallel. Results are ordered by ticker.
pub fn evaluate_batch(
    universe: &BTreeMap<String, PriceTable>,
    horizon: Horizon,
    config: &EngineConfig,
    ratios: &BTreeMap<String, FundamentalRatios>,
) -> Vec<TickerSignal> {
    let entries: Vec<(&String, &PriceTable)> = universe.iter().collect();
    let signals: Vec<TickerSignal> = entries
        .par_iter()
        .map(|(ticker, table)| {
            evaluate_ticker(ticker, table, horizon, config, ratios.get(*ticker).copied())
        })
        .collect();

    let summary = BatchSummary::from_signals(&signals);
    tracing::info!(
        horizon = %horizon,
        engine = %config.engine,
        tickers = signals.len(),
        buy = summary.buy,
        wait = summary.wait,
        sell = summary.sell,
        flagged = summary.flagged,
        "batch evaluated"
    );
    signals
}

/// BUY/WAIT/SELL counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub buy: usize,
    pub wait: usize,
    pub sell: usize,
    /// Rows carrying at least one risk flag.
    pub flagged: usize,
}

impl BatchSummary {
    pub fn from_signals(signals: &[TickerSignal]) -> Self {
        signals.iter().fold(Self::default(), |mut acc, s| {
            match s.signal {
                Signal::Buy => acc.buy += 1,
                Signal::Wait => acc.wait += 1,
                Signal::Sell => acc.sell += 1,
            }
            if !s.risk_flags.is_empty() {
                acc.flagged += 1;
            }
            acc
        })
    }
}
