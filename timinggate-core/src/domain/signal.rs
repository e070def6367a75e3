//! Signal output types.
//!
//! A `SignalResult` is produced fresh on every evaluation and never persisted
//! by the core. Every data-quality problem resolves to WAIT with a `reason`;
//! only shape-contract violations (`BarError`) are hard failures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::table::Column;

/// Published timing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Wait,
    Sell,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Wait => "WAIT",
            Signal::Sell => "SELL",
        }
    }

    pub fn is_directional(&self) -> bool {
        !matches!(self, Signal::Wait)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an evaluation degraded to WAIT without a full gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WaitReason {
    /// Empty table, or no finite close at all.
    NoData,
    /// A required column is absent from the record shape.
    MissingColumn(Column),
    /// Fewer bars than the horizon's minimum history.
    InsufficientHistory,
    /// A last-bar quantity the decision depends on was undefined
    /// (zero denominator or NaN input).
    Undefined(String),
}

impl fmt::Display for WaitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitReason::NoData => f.write_str("no_data"),
            WaitReason::MissingColumn(column) => write!(f, "missing:{column}"),
            WaitReason::InsufficientHistory => f.write_str("insufficient_history"),
            WaitReason::Undefined(quantity) => write!(f, "undefined:{quantity}"),
        }
    }
}

impl FromStr for WaitReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_data" => return Ok(WaitReason::NoData),
            "insufficient_history" => return Ok(WaitReason::InsufficientHistory),
            _ => {}
        }
        if let Some(name) = s.strip_prefix("missing:") {
            return Column::from_header(name)
                .map(WaitReason::MissingColumn)
                .ok_or_else(|| format!("unknown column in reason: {s}"));
        }
        if let Some(quantity) = s.strip_prefix("undefined:") {
            return Ok(WaitReason::Undefined(quantity.to_string()));
        }
        Err(format!("unknown wait reason: {s}"))
    }
}

impl From<WaitReason> for String {
    fn from(reason: WaitReason) -> Self {
        reason.to_string()
    }
}

impl TryFrom<String> for WaitReason {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One diagnostic value in `SignalResult::debug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebugValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl DebugValue {
    /// Finite numbers become `Number`; NaN and infinities become `Null`.
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            DebugValue::Number(value)
        } else {
            DebugValue::Null
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DebugValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DebugValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for DebugValue {
    fn from(value: bool) -> Self {
        DebugValue::Bool(value)
    }
}

impl From<&str> for DebugValue {
    fn from(value: &str) -> Self {
        DebugValue::Text(value.to_string())
    }
}

impl From<String> for DebugValue {
    fn from(value: String) -> Self {
        DebugValue::Text(value)
    }
}

impl From<usize> for DebugValue {
    fn from(value: usize) -> Self {
        DebugValue::Number(value as f64)
    }
}

/// Engine output for the last bar of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub signal: Signal,
    /// Always within [0, 1].
    pub confidence: f64,
    /// Human-readable condition labels, in gate order.
    pub triggers: Vec<String>,
    pub debug: BTreeMap<String, DebugValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<WaitReason>,
}

impl SignalResult {
    /// WAIT / zero confidence with an explanatory reason.
    pub fn wait(reason: WaitReason) -> Self {
        let mut result = Self {
            signal: Signal::Wait,
            confidence: 0.0,
            triggers: Vec::new(),
            debug: BTreeMap::new(),
            reason: None,
        };
        result.set_reason(reason);
        result
    }

    /// Record `reason` both as the result field and as `debug["reason"]`.
    pub fn set_reason(&mut self, reason: WaitReason) {
        self.debug
            .insert("reason".to_string(), DebugValue::from(reason.to_string()));
        self.reason = Some(reason);
    }

    /// The distinguished insufficient-data outcome: any evaluation that carries a reason.
    pub fn is_insufficient_data(&self) -> bool {
        self.reason.is_some()
    }

    pub fn with_debug(mut self, key: &str, value: impl Into<DebugValue>) -> Self {
        self.debug.insert(key.to_string(), value.into());
        self
    }

    pub fn debug_bool(&self, key: &str) -> Option<bool> {
        self.debug.get(key).and_then(DebugValue::as_bool)
    }

    pub fn debug_f64(&self, key: &str) -> Option<f64> {
        self.debug.get(key).and_then(DebugValue::as_f64)
    }
}
