//! Criterion benchmarks for runner fan-out.
//!
//! Run with: `cargo bench -p timinggate-runner`
//!
//! - Batch evaluation across universes of increasing size
//! - Walk-forward replay over one table
//! - CSV parsing of a universe file

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;
use timinggate_core::{EngineConfig, Horizon, PriceTable};
use timinggate_runner::synthetic::random_walk;
use timinggate_runner::{evaluate_batch, read_universe_csv, walk_forward};

fn start() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
}

fn make_universe(tickers: usize, bars: usize) -> BTreeMap<String, PriceTable> {
    (0..tickers)
        .map(|i| {
            let ticker = format!("T{i:04}");
            let table = PriceTable::from_bars(random_walk(&ticker, start(), bars)).unwrap();
            (ticker, table)
        })
        .collect()
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_evaluate");
    let config = EngineConfig::default();
    let ratios = BTreeMap::new();

    for tickers in [10, 100, 500] {
        let universe = make_universe(tickers, 300);
        group.bench_with_input(
            BenchmarkId::from_parameter(tickers),
            &universe,
            |b, universe| {
                b.iter(|| evaluate_batch(black_box(universe), Horizon::OneDay, &config, &ratios));
            },
        );
    }

    group.finish();
}

fn bench_walk_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk_forward");
    group.sample_size(10);
    let config = EngineConfig::default();

    for bars in [300, 600] {
        let table = PriceTable::from_bars(random_walk("WALK", start(), bars)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(bars), &table, |b, table| {
            b.iter(|| walk_forward(black_box(table), Horizon::OneDay, &config, 30));
        });
    }

    group.finish();
}

fn bench_csv(c: &mut Criterion) {
    let mut text = String::from("ticker,date,open,high,low,close,volume\n");
    for (ticker, table) in make_universe(50, 300) {
        for bar in table.bars() {
            text.push_str(&format!(
                "{ticker},{},{},{},{},{},{}\n",
                bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
            ));
        }
    }

    c.bench_function("read_universe_csv_50x300", |b| {
        b.iter(|| read_universe_csv(black_box(text.as_bytes())).unwrap());
    });
}

criterion_group!(benches, bench_batch, bench_walk_forward, bench_csv);
criterion_main!(benches);
