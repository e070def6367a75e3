//! Engine configuration: strategy choice, per-horizon rules, confidence weights.
//!
//! An `EngineConfig` is never partially invalid. Every load path goes through
//! `normalize`, which replaces missing or out-of-range fields with defaults.
//! Callers that change configuration at runtime swap the whole value; the
//! engine only ever borrows it immutably.

mod normalize;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use normalize::normalize_value;

/// Window of the ATR% moving average used as a volatility ceiling before the
/// quantile window has filled.
pub const FALLBACK_WINDOW: usize = 60;

/// Extra bars callers should fetch beyond the longest indicator window.
pub const LOOKBACK_MARGIN: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config serialization error: {0}")]
    Serialize(String),

    #[error("unknown horizon '{0}' (expected 1D, 3D or 1W)")]
    UnknownHorizon(String),

    #[error("unknown engine '{0}' (expected simple_ma_v1 or simple_ma_v2_gate3)")]
    UnknownEngine(String),
}

// ─── Engine kind ─────────────────────────────────────────────────────

/// Which gating strategy produces the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineKind {
    /// MA cross + momentum only.
    #[serde(rename = "simple_ma_v1")]
    Minimal,
    /// Base, trend, volatility and volume gates with confirm bars.
    #[default]
    #[serde(rename = "simple_ma_v2_gate3")]
    MultiGate,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Minimal, EngineKind::MultiGate];

    /// Name recorded as the model version of every result.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Minimal => "simple_ma_v1",
            EngineKind::MultiGate => "simple_ma_v2_gate3",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EngineKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownEngine(s.to_string()))
    }
}

// ─── Horizon ─────────────────────────────────────────────────────────

/// Intended holding / review period of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "3D")]
    ThreeDay,
    #[serde(rename = "1W")]
    OneWeek,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::OneDay, Horizon::ThreeDay, Horizon::OneWeek];

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::OneDay => "1D",
            Horizon::ThreeDay => "3D",
            Horizon::OneWeek => "1W",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Horizon {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Horizon::ALL
            .into_iter()
            .find(|h| h.label() == wanted)
            .ok_or_else(|| ConfigError::UnknownHorizon(s.to_string()))
    }
}

// ─── Horizon rule ────────────────────────────────────────────────────

/// Indicator windows and thresholds for one horizon. Window lengths are in bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonRule {
    pub short: usize,
    pub long: usize,
    pub mom: usize,
    pub slope_lb: usize,
    pub vol_n: usize,
    /// Volume-surge multiplier required on event bars (> 1.0).
    pub vol_mult: f64,
    pub atr_n: usize,
    pub vol_q_window: usize,
    /// ATR% quantile used as the volatility ceiling, in (0, 1).
    pub vol_q: f64,
    pub confirm: usize,
}

impl HorizonRule {
    /// Built-in rule for a horizon.
    pub fn default_for(horizon: Horizon) -> Self {
        match horizon {
            Horizon::OneDay => Self {
                short: 5,
                long: 20,
                mom: 5,
                slope_lb: 10,
                vol_n: 20,
                vol_mult: 1.20,
                atr_n: 14,
                vol_q_window: 252,
                vol_q: 0.90,
                confirm: 2,
            },
            Horizon::ThreeDay => Self {
                short: 10,
                long: 30,
                mom: 10,
                slope_lb: 15,
                vol_n: 20,
                vol_mult: 1.15,
                atr_n: 14,
                vol_q_window: 252,
                vol_q: 0.85,
                confirm: 2,
            },
            Horizon::OneWeek => Self {
                short: 20,
                long: 60,
                mom: 20,
                slope_lb: 20,
                vol_n: 20,
                vol_mult: 1.10,
                atr_n: 14,
                vol_q_window: 252,
                vol_q: 0.80,
                confirm: 1,
            },
        }
    }

    /// Smallest table length for which the strategy's last-bar inputs can all
    /// be defined. Shorter tables resolve to `insufficient_history`.
    pub fn min_history(&self, kind: EngineKind) -> usize {
        match kind {
            EngineKind::Minimal => self.long.max(self.short).max(self.mom + 1),
            EngineKind::MultiGate => {
                let atr_ceiling = self.atr_n.saturating_sub(1) + self.vol_q_window.min(FALLBACK_WINDOW);
                let gates = (self.long + self.slope_lb)
                    .max(self.mom + 1)
                    .max(self.vol_n)
                    .max(atr_ceiling);
                gates + self.confirm.max(1) - 1
            }
        }
    }

    /// Bars a caller should fetch so every gate runs on its full windows,
    /// the volatility quantile included.
    pub fn recommended_lookback(&self) -> usize {
        [
            self.long,
            self.mom,
            self.slope_lb,
            self.vol_q_window,
            self.vol_n,
            self.atr_n,
            FALLBACK_WINDOW,
        ]
        .into_iter()
        .max()
        .unwrap_or(FALLBACK_WINDOW)
            + LOOKBACK_MARGIN
    }
}

/// One rule per horizon. All three are always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonRules {
    #[serde(rename = "1D")]
    pub one_day: HorizonRule,
    #[serde(rename = "3D")]
    pub three_day: HorizonRule,
    #[serde(rename = "1W")]
    pub one_week: HorizonRule,
}

impl HorizonRules {
    pub fn get(&self, horizon: Horizon) -> &HorizonRule {
        match horizon {
            Horizon::OneDay => &self.one_day,
            Horizon::ThreeDay => &self.three_day,
            Horizon::OneWeek => &self.one_week,
        }
    }

    pub fn get_mut(&mut self, horizon: Horizon) -> &mut HorizonRule {
        match horizon {
            Horizon::OneDay => &mut self.one_day,
            Horizon::ThreeDay => &mut self.three_day,
            Horizon::OneWeek => &mut self.one_week,
        }
    }
}

impl Default for HorizonRules {
    fn default() -> Self {
        Self {
            one_day: HorizonRule::default_for(Horizon::OneDay),
            three_day: HorizonRule::default_for(Horizon::ThreeDay),
            one_week: HorizonRule::default_for(Horizon::OneWeek),
        }
    }
}

// ─── Weights ─────────────────────────────────────────────────────────

/// Weights of the four confidence sub-scores. `vol_penalty` is a penalty,
/// so its weight is negative by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub ma_gap: f64,
    pub trend_strength: f64,
    pub vol_strength: f64,
    pub vol_penalty: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            ma_gap: 0.45,
            trend_strength: 0.35,
            vol_strength: 0.20,
            vol_penalty: -0.40,
        }
    }
}

// ─── EngineConfig ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub engine: EngineKind,
    pub horizons: HorizonRules,
    pub weights: ConfidenceWeights,
}

impl EngineConfig {
    /// Normalize an arbitrary JSON value into a valid config.
    pub fn normalize_value(value: &serde_json::Value) -> Self {
        normalize_value(value)
    }

    /// Re-run normalization on an in-memory config (e.g. one edited field by field).
    pub fn normalized(&self) -> Self {
        match serde_json::to_value(self) {
            Ok(value) => normalize_value(&value),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(normalize_value(&value))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(normalize_value(&value))
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn rule(&self, horizon: Horizon) -> &HorizonRule {
        self.horizons.get(horizon)
    }

    /// BLAKE3 of the canonical JSON encoding.
    ///
    /// Field order is fixed by the struct layout, so equal configs hash equally.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_string(self).expect("EngineConfig must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
