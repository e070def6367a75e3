//! TimingGate Core: multi-gate technical timing signals.
//!
//! This crate turns a per-ticker OHLCV table into a BUY/WAIT/SELL decision
//! with a bounded confidence score:
//! - Domain types (bars, columnar price tables, signal results)
//! - Indicator library (SMA, ATR, rolling quantile, momentum, confirm bars)
//! - Engine configuration with per-horizon rules and normalization
//! - Two strategies behind one trait (minimal MA/momentum, multi-gate)
//! - Confidence scoring and the ATR target-price band
//!
//! Everything here is pure and synchronous: no I/O, no shared mutable state.

pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod target;

pub use config::{
    ConfidenceWeights, ConfigError, EngineConfig, EngineKind, Horizon, HorizonRule, HorizonRules,
};
pub use domain::{
    BarError, Column, DebugValue, PriceBar, PriceTable, Signal, SignalResult, WaitReason,
};
pub use engine::{evaluate, strategy_for, GateFrame, SignalStrategy};
pub use target::{target_range, FundamentalRatios, TargetRange};
