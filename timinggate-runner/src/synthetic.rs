//! Deterministic synthetic price series.
//!
//! Used by tests, benchmarks and the `synth` command. Every generator emits
//! weekday-only dates and derives the rest of the bar from the close:
//! `high = 1.01·close`, `low = 0.99·close`, `open = 0.999·close`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use timinggate_core::PriceBar;

pub const BASE_VOLUME: f64 = 1000.0;

/// Bar derived from a close and volume.
pub fn bar_from_close(date: NaiveDate, close: f64, volume: f64) -> PriceBar {
    PriceBar {
        date,
        open: close * 0.999,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume,
    }
}

/// `n` consecutive weekdays starting at or after `start`.
pub fn trading_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut current = start;
    while days.len() < n {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        current += Duration::days(1);
    }
    days
}

/// Trendless oscillation: `100 + amplitude·sin(x)` over `cycles` full periods.
pub fn sine_wave(start: NaiveDate, bars: usize, cycles: f64, amplitude: f64) -> Vec<PriceBar> {
    let span = 2.0 * std::f64::consts::PI * cycles;
    let step = if bars > 1 {
        span / (bars - 1) as f64
    } else {
        0.0
    };
    trading_days(start, bars)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let close = 100.0 + amplitude * (step * i as f64).sin();
            bar_from_close(date, close, BASE_VOLUME)
        })
        .collect()
}

/// A flat stretch at `from`, then a linear ramp to `to` on raised volume.
pub fn flat_then_ramp(
    start: NaiveDate,
    flat: usize,
    ramp: usize,
    from: f64,
    to: f64,
) -> Vec<PriceBar> {
    let step = if ramp > 1 {
        (to - from) / (ramp - 1) as f64
    } else {
        0.0
    };
    trading_days(start, flat + ramp)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            if i < flat {
                bar_from_close(date, from, BASE_VOLUME)
            } else {
                let close = if ramp == 1 { to } else { from + step * (i - flat) as f64 };
                bar_from_close(date, close, BASE_VOLUME * 1.8)
            }
        })
        .collect()
}

/// Random walk seeded from the symbol name, so each symbol is reproducible.
pub fn random_walk(symbol: &str, start: NaiveDate, bars: usize) -> Vec<PriceBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut price = 100.0_f64;
    trading_days(start, bars)
        .into_iter()
        .map(|date| {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price = (price * (1.0 + daily_return)).max(1.0);
            let volume = rng.gen_range(500.0..5_000.0_f64).round();
            bar_from_close(date, price, volume)
        })
        .collect()
}
