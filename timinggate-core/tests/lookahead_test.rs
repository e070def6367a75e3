//! Look-ahead contamination tests for indicators and gates.
//!
//! Invariant: no value at bar t may depend on data from bar t+1 or later.
//!
//! Method: compute on a truncated table (bars 0..150) and on the full table
//! (bars 0..300). Bars 0..150 must be identical between both runs. Any
//! difference means a series is leaking future data into past values.

use chrono::NaiveDate;
use timinggate_core::engine::GateFrame;
use timinggate_core::indicators::*;
use timinggate_core::{evaluate, EngineConfig, Horizon, HorizonRule, PriceBar, PriceTable};

const FULL: usize = 300;
const TRUNCATED: usize = 150;

/// Deterministic pseudo-random walk with realistic OHLCV variation.
fn make_test_table(n: usize) -> PriceTable {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut price = 100.0;
    let bars = (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.02;
            price = (price + change).max(10.0);

            let open = price - 0.4;
            let close = price + 0.2;
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.5,
                low: open.min(close) - 1.5,
                close,
                volume: 1000.0 + ((seed >> 7) % 900) as f64,
            }
        })
        .collect();
    PriceTable::from_bars(bars).unwrap()
}

fn assert_prefix_equal(name: &str, truncated: &[f64], full: &[f64]) {
    assert_eq!(truncated.len(), TRUNCATED, "{name}: truncated length");
    assert_eq!(full.len(), FULL, "{name}: full length");
    for i in 0..TRUNCATED {
        let (t, f) = (truncated[i], full[i]);
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            (t - f).abs() < 1e-12,
            "{name}: mismatch at bar {i} (truncated={t}, full={f})"
        );
    }
}

fn assert_prefix_equal_bool(name: &str, truncated: &[bool], full: &[bool]) {
    assert_eq!(truncated, &full[..TRUNCATED], "{name}: boolean mismatch");
}

#[test]
fn indicators_have_no_lookahead() {
    let full = make_test_table(FULL);
    let short = full.truncate(TRUNCATED);
    let cols = |t: &PriceTable| {
        (
            t.column(timinggate_core::Column::High).unwrap().to_vec(),
            t.column(timinggate_core::Column::Low).unwrap().to_vec(),
            t.column(timinggate_core::Column::Close).unwrap().to_vec(),
        )
    };
    let (fh, fl, fc) = cols(&full);
    let (sh, sl, sc) = cols(&short);

    assert_prefix_equal("sma_20", &sma(&sc, 20), &sma(&fc, 20));
    assert_prefix_equal("atr_14", &atr(&sh, &sl, &sc, 14), &atr(&fh, &fl, &fc, 14));
    assert_prefix_equal("mom_5", &pct_change(&sc, 5), &pct_change(&fc, 5));
    assert_prefix_equal("slope_10", &slope(&sc, 10), &slope(&fc, 10));
    assert_prefix_equal(
        "quantile_60",
        &rolling_quantile(&sc, 60, 0.9),
        &rolling_quantile(&fc, 60, 0.9),
    );
}

#[test]
fn gate_series_have_no_lookahead() {
    let full_table = make_test_table(FULL);
    let short_table = full_table.truncate(TRUNCATED);

    for horizon in Horizon::ALL {
        let mut rule = HorizonRule::default_for(horizon);
        // Short enough for the quantile ceiling to be defined inside the prefix.
        rule.vol_q_window = 100;

        let full = GateFrame::compute(&full_table, &rule).unwrap();
        let short = GateFrame::compute(&short_table, &rule).unwrap();

        assert_prefix_equal("ma_long", &short.ma_long, &full.ma_long);
        assert_prefix_equal("vol_ratio", &short.vol_ratio, &full.vol_ratio);
        assert_prefix_equal("atr_pct_q", &short.atr_pct_q, &full.atr_pct_q);
        assert_prefix_equal_bool("atr_gate", &short.atr_gate, &full.atr_gate);
        assert_prefix_equal_bool("buy_event", &short.buy_event, &full.buy_event);
        assert_prefix_equal_bool("buy_raw", &short.buy_raw, &full.buy_raw);
        assert_prefix_equal_bool("sell_raw", &short.sell_raw, &full.sell_raw);
        assert_prefix_equal_bool("buy_confirmed", &short.buy_confirmed, &full.buy_confirmed);
        assert_prefix_equal_bool("sell_confirmed", &short.sell_confirmed, &full.sell_confirmed);
    }
}

#[test]
fn last_bar_decision_matches_whole_table_frame() {
    let table = make_test_table(FULL);
    let config = EngineConfig::default();
    let rule = config.rule(Horizon::OneDay);
    let frame = GateFrame::compute(&table, rule).unwrap();

    let start = rule.min_history(config.engine);
    for i in (start..FULL).step_by(7) {
        let result = evaluate(&table.truncate(i + 1), Horizon::OneDay, &config);
        assert_eq!(result.signal, frame.decision_at(i), "bar {i}");
    }
}
