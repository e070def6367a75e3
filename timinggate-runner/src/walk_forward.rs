//! Walk-forward evaluation: the engine replayed bar by bar.
//!
//! For every bar `i >= start` the engine sees only `table[..=i]`, exactly as a
//! live caller would have on that date. Prefixes are independent, so they are
//! evaluated in parallel; output order follows the bars.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use timinggate_core::{evaluate, EngineConfig, Horizon, PriceTable, Signal};

/// Signal on one prefix of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkPoint {
    pub index: usize,
    pub date: NaiveDate,
    pub signal: Signal,
    pub confidence: f64,
    /// True when the evaluation degraded on data quality rather than gates.
    pub insufficient: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardReport {
    pub horizon: Horizon,
    pub engine: String,
    pub start: usize,
    pub points: Vec<WalkPoint>,
    pub buy: usize,
    pub wait: usize,
    pub sell: usize,
}

impl WalkForwardReport {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Share of evaluated bars that ended in WAIT; 0 when nothing was evaluated.
    pub fn wait_rate(&self) -> f64 {
        if self.points.is_empty() {
            0.0
        } else {
            self.wait as f64 / self.points.len() as f64
        }
    }

    /// Number of times the published signal changed between consecutive bars.
    pub fn flips(&self) -> usize {
        self.points
            .windows(2)
            .filter(|pair| pair[0].signal != pair[1].signal)
            .count()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.points.iter().map(|p| p.signal).collect()
    }
}

/// Evaluate every prefix `table[..=i]` for `i` in `start..table.len()`.
pub fn walk_forward(
    table: &PriceTable,
    horizon: Horizon,
    config: &EngineConfig,
    start: usize,
) -> WalkForwardReport {
    let points: Vec<WalkPoint> = (start..table.len())
        .into_par_iter()
        .map(|index| {
            let result = evaluate(&table.truncate(index + 1), horizon, config);
            WalkPoint {
                index,
                date: table.dates()[index],
                signal: result.signal,
                confidence: result.confidence,
                insufficient: result.is_insufficient_data(),
            }
        })
        .collect();

    let count = |signal: Signal| points.iter().filter(|p| p.signal == signal).count();
    let report = WalkForwardReport {
        horizon,
        engine: config.engine.as_str().to_string(),
        start,
        buy: count(Signal::Buy),
        wait: count(Signal::Wait),
        sell: count(Signal::Sell),
        points,
    };

    tracing::debug!(
        horizon = %horizon,
        engine = %report.engine,
        bars = report.len(),
        wait_rate = report.wait_rate(),
        flips = report.flips(),
        "walk-forward complete"
    );
    report
}
