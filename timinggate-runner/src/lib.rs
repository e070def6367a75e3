//! TimingGate Runner: the caller side of the signal engine.
//!
//! This crate builds on `timinggate-core` to provide:
//! - CSV loading of single-ticker tables and multi-ticker universes
//! - The engine configuration store (file load/save, shared snapshot)
//! - Parallel batch evaluation with risk flags and target bands
//! - Walk-forward replay of the engine over every prefix of a table
//! - Deterministic synthetic series and result export

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod synthetic;
pub mod walk_forward;

pub use batch::{evaluate_batch, evaluate_ticker, BatchSummary, TickerSignal};
pub use config::{
    load_engine_config, save_engine_config, ConfigMode, LoadedConfig, SharedConfig, StoreError,
};
pub use data_loader::{
    dataset_hash, insane_bar_dates, load_price_csv, load_universe_csv, read_price_csv,
    read_universe_csv, LoadError,
};
pub use export::{
    export_bars, export_signals, write_bars_csv, write_signals_csv, write_signals_jsonl,
    ExportError,
};
pub use walk_forward::{walk_forward, WalkForwardReport, WalkPoint};
