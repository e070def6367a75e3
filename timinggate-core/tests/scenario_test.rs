//! Scenario tests for the two strategies on synthetic daily series.
//!
//! Series are shaped like a typical daily feed: open = 0.999·close,
//! high = 1.01·close, low = 0.99·close, volume 1000 unless stated.
//!
//! Scenarios:
//! 1. Whipsaw: on a trendless sine wave the multi-gate engine waits at least as often
//! 2. Uptrend with rising volume ends in BUY
//! 3. Downtrend with rising volume (high = low = close) ends in SELL
//! 4. A widened high/low range on the last bars vetoes entry
//! 5. Confirm bars: one qualifying bar is not enough, two are
//! 6. Event-bar boundary at the first bars of a table

use chrono::NaiveDate;
use timinggate_core::engine::GateFrame;
use timinggate_core::{
    evaluate, EngineConfig, EngineKind, Horizon, HorizonRule, PriceBar, PriceTable, Signal,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(closes: &[f64], volumes: Option<&[f64]>) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close * 0.999,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: volumes.map_or(1000.0, |v| v[i]),
        })
        .collect()
}

fn make_table(closes: &[f64], volumes: Option<&[f64]>) -> PriceTable {
    PriceTable::from_bars(make_bars(closes, volumes)).unwrap()
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

fn config(kind: EngineKind) -> EngineConfig {
    EngineConfig {
        engine: kind,
        ..EngineConfig::default()
    }
}

fn walk_signals(table: &PriceTable, kind: EngineKind) -> Vec<Signal> {
    let config = config(kind);
    (30..table.len())
        .map(|i| evaluate(&table.truncate(i + 1), Horizon::OneDay, &config).signal)
        .collect()
}

fn count_waits(signals: &[Signal]) -> usize {
    signals.iter().filter(|s| **s == Signal::Wait).count()
}

// ── 1. Whipsaw ───────────────────────────────────────────────────────

#[test]
fn whipsaw_wait_rate_is_higher_for_multi_gate() {
    let closes: Vec<f64> = linspace(0.0, 20.0 * std::f64::consts::PI, 160)
        .into_iter()
        .map(|x| 100.0 + x.sin())
        .collect();
    let table = make_table(&closes, None);

    let minimal = walk_signals(&table, EngineKind::Minimal);
    let multi = walk_signals(&table, EngineKind::MultiGate);

    assert_eq!(minimal.len(), multi.len());
    assert!(
        count_waits(&multi) >= count_waits(&minimal),
        "multi-gate waited {} times, minimal {}",
        count_waits(&multi),
        count_waits(&minimal)
    );
}

#[test]
fn multi_gate_direction_implies_minimal_direction() {
    let closes: Vec<f64> = linspace(0.0, 12.0 * std::f64::consts::PI, 300)
        .into_iter()
        .enumerate()
        .map(|(i, x)| 100.0 + 5.0 * x.sin() + i as f64 * 0.05)
        .collect();
    let volumes: Vec<f64> = (0..300).map(|i| 1000.0 + (i % 7) as f64 * 150.0).collect();
    let table = make_table(&closes, Some(&volumes));

    for (multi, minimal) in walk_signals(&table, EngineKind::MultiGate)
        .into_iter()
        .zip(walk_signals(&table, EngineKind::Minimal))
    {
        if multi.is_directional() {
            assert_eq!(multi, minimal);
        }
    }
}

// ── 2-3. Directional confirmation ────────────────────────────────────

#[test]
fn uptrend_with_volume_is_buy() {
    let mut closes = vec![100.0; 220];
    closes.extend(linspace(101.0, 140.0, 40));
    let mut volumes = vec![1000.0; 220];
    volumes.extend(vec![1800.0; 40]);

    let result = evaluate(
        &make_table(&closes, Some(&volumes)),
        Horizon::OneDay,
        &EngineConfig::default(),
    );
    assert_eq!(result.signal, Signal::Buy, "debug: {:?}", result.debug);
    assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    assert!(result.reason.is_none());
}

#[test]
fn downtrend_with_volume_is_sell() {
    let mut closes = vec![140.0; 200];
    closes.extend(
        linspace(0.0, 1.0, 60)
            .into_iter()
            .map(|t| 139.0 - 19.0 * t.sqrt()),
    );
    let mut volumes = vec![1000.0; 200];
    volumes.extend(vec![2000.0; 60]);

    let bars: Vec<PriceBar> = make_bars(&closes, Some(&volumes))
        .into_iter()
        .map(|b| PriceBar {
            high: b.close,
            low: b.close,
            ..b
        })
        .collect();

    let result = evaluate(
        &PriceTable::from_bars(bars).unwrap(),
        Horizon::OneDay,
        &EngineConfig::default(),
    );
    assert_eq!(result.signal, Signal::Sell, "debug: {:?}", result.debug);
    assert_eq!(result.triggers[0], "MA5 < MA20");
    assert_eq!(result.triggers[2], "Close < MA20, Slope10 < 0");
}

// ── 4. Volatility veto ───────────────────────────────────────────────

#[test]
fn widened_range_blocks_entry() {
    let mut closes = linspace(100.0, 160.0, 240);
    closes.extend(linspace(161.0, 170.0, 20));
    let volumes = linspace(1000.0, 1500.0, closes.len());

    let mut bars = make_bars(&closes, Some(&volumes));
    let n = bars.len();
    for bar in &mut bars[n - 5..] {
        bar.high = bar.close * 1.4;
        bar.low = bar.close * 0.6;
    }

    let result = evaluate(
        &PriceTable::from_bars(bars).unwrap(),
        Horizon::OneDay,
        &EngineConfig::default(),
    );
    assert_eq!(result.signal, Signal::Wait);
    assert_eq!(result.debug_bool("atr_gate"), Some(false));
    assert_eq!(result.debug_bool("buy_base"), Some(true));
    assert_eq!(result.triggers, vec!["Gates not satisfied"]);
}

// ── 5. Confirm bars ──────────────────────────────────────────────────

fn confirm_scenario(last_two_volumes: [f64; 2]) -> Signal {
    let mut closes = vec![100.0; 200];
    closes.extend(linspace(101.0, 120.0, 30));
    closes.extend([121.0, 122.0]);
    let mut volumes = vec![1000.0; 200];
    volumes.extend(vec![1200.0; 30]);
    volumes.extend(last_two_volumes);

    evaluate(
        &make_table(&closes, Some(&volumes)),
        Horizon::OneDay,
        &EngineConfig::default(),
    )
    .signal
}

#[test]
fn single_qualifying_bar_is_not_confirmed() {
    assert_eq!(confirm_scenario([500.0, 2000.0]), Signal::Wait);
}

#[test]
fn two_qualifying_bars_confirm_buy() {
    assert_eq!(confirm_scenario([2000.0, 2000.0]), Signal::Buy);
}

// ── 6. Event-bar boundary ────────────────────────────────────────────

#[test]
fn prior_bar_nan_comparison_is_not_an_event() {
    let rule = HorizonRule {
        short: 2,
        long: 3,
        mom: 1,
        slope_lb: 1,
        vol_n: 1,
        vol_mult: 1.2,
        atr_n: 1,
        vol_q_window: 2,
        vol_q: 0.9,
        confirm: 1,
    };
    // ma_short = [NaN, 11, 12, 11, 11.5]
    let table = make_table(&[10.0, 12.0, 12.0, 10.0, 13.0], None);
    let frame = GateFrame::compute(&table, &rule).unwrap();

    // Bar 1 closes above its short MA, but the previous short MA is undefined.
    assert!(frame.close[1] > frame.ma_short[1]);
    assert!(!frame.buy_event[1]);
    assert!(!frame.buy_event[0] && !frame.sell_event[0]);

    // Bar 3 crosses below from an equal prior relationship; bar 4 crosses back above.
    assert!(frame.sell_event[3]);
    assert!(frame.buy_event[4]);

    for t in 0..frame.len() {
        assert!(!(frame.buy_event[t] && frame.sell_event[t]), "bar {t}");
    }
}
