//! Field-by-field normalization of untrusted configuration values.
//!
//! Anything missing, mistyped or out of range is replaced by its default.
//! Nothing is rejected. Running the result through again changes nothing.

use serde_json::{Map, Value};
use tracing::debug;

use super::{ConfidenceWeights, EngineConfig, EngineKind, Horizon, HorizonRule, HorizonRules};

/// Upper bound on any window length. Larger values fall back to the default.
const MAX_WINDOW: usize = 10_000;

pub fn normalize_value(value: &Value) -> EngineConfig {
    let Some(root) = value.as_object() else {
        debug!("config is not an object; using defaults");
        return EngineConfig::default();
    };

    EngineConfig {
        engine: normalize_engine(root.get("engine")),
        horizons: normalize_horizons(root.get("horizons")),
        weights: normalize_weights(root.get("weights")),
    }
}

fn normalize_engine(value: Option<&Value>) -> EngineKind {
    match value.and_then(Value::as_str) {
        Some(name) => name.parse().unwrap_or_else(|_| {
            debug!(engine = name, "unknown engine name; using default");
            EngineKind::default()
        }),
        None => EngineKind::default(),
    }
}

fn normalize_horizons(value: Option<&Value>) -> HorizonRules {
    let mut rules = HorizonRules::default();
    let Some(map) = value.and_then(Value::as_object) else {
        return rules;
    };

    for horizon in Horizon::ALL {
        if let Some(raw) = lookup_horizon(map, horizon) {
            *rules.get_mut(horizon) = normalize_rule(raw, HorizonRule::default_for(horizon));
        }
    }
    rules
}

/// Horizon keys are matched case-insensitively ("1d" and "1D" are the same rule).
fn lookup_horizon<'a>(map: &'a Map<String, Value>, horizon: Horizon) -> Option<&'a Map<String, Value>> {
    map.iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(horizon.label()))
        .and_then(|(_, v)| v.as_object())
}

fn normalize_rule(raw: &Map<String, Value>, default: HorizonRule) -> HorizonRule {
    let mut rule = HorizonRule {
        short: window(raw, "short", default.short, 1),
        long: window(raw, "long", default.long, 2),
        mom: window(raw, "mom", default.mom, 1),
        slope_lb: window(raw, "slope_lb", default.slope_lb, 1),
        vol_n: window(raw, "vol_n", default.vol_n, 1),
        vol_mult: real(raw, "vol_mult", default.vol_mult, |v| v > 1.0),
        atr_n: window(raw, "atr_n", default.atr_n, 1),
        vol_q_window: window(raw, "vol_q_window", default.vol_q_window, 2),
        vol_q: real(raw, "vol_q", default.vol_q, |v| v > 0.0 && v < 1.0),
        confirm: window(raw, "confirm", default.confirm, 1),
    };

    if rule.short >= rule.long {
        debug!(
            short = rule.short,
            long = rule.long,
            "short window not below long window; resetting both"
        );
        rule.short = default.short;
        rule.long = default.long;
    }
    rule
}

fn normalize_weights(value: Option<&Value>) -> ConfidenceWeights {
    let default = ConfidenceWeights::default();
    let Some(raw) = value.and_then(Value::as_object) else {
        return default;
    };
    ConfidenceWeights {
        ma_gap: real(raw, "ma_gap", default.ma_gap, |_| true),
        trend_strength: real(raw, "trend_strength", default.trend_strength, |_| true),
        vol_strength: real(raw, "vol_strength", default.vol_strength, |_| true),
        vol_penalty: real(raw, "vol_penalty", default.vol_penalty, |_| true),
    }
}

/// Integer window field. Integral floats (`20.0`) are accepted.
fn window(raw: &Map<String, Value>, key: &str, default: usize, min: usize) -> usize {
    let parsed = raw.get(key).and_then(|v| match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        _ => None,
    });

    match parsed.and_then(|n| usize::try_from(n).ok()) {
        Some(n) if (min..=MAX_WINDOW).contains(&n) => n,
        Some(n) => {
            debug!(field = key, value = n, "window out of range; using default");
            default
        }
        None => default,
    }
}

/// Finite real field satisfying `valid`.
fn real(raw: &Map<String, Value>, key: &str, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
    match raw.get(key).and_then(Value::as_f64) {
        Some(v) if v.is_finite() && valid(v) => v,
        Some(v) => {
            debug!(field = key, value = v, "value out of range; using default");
            default
        }
        None => default,
    }
}
