//! Engine configuration store.
//!
//! The store owns where a configuration lives; the engine only ever sees the
//! normalized value. Reloads build a fresh `EngineConfig` and swap it in
//! whole, so concurrent evaluations keep the snapshot they started with.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use timinggate_core::{ConfigError, EngineConfig};

/// Errors from reading or writing a configuration file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMode {
    /// Built-in defaults; no stored override exists.
    Default,
    /// A stored override, normalized on load.
    Custom,
}

/// A normalized configuration plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedConfig {
    pub config: EngineConfig,
    pub mode: ConfigMode,
    /// BLAKE3 fingerprint of the normalized configuration.
    pub hash: String,
}

impl LoadedConfig {
    fn new(config: EngineConfig, mode: ConfigMode) -> Self {
        let hash = config.config_hash();
        Self { config, mode, hash }
    }

    pub fn defaults() -> Self {
        Self::new(EngineConfig::default(), ConfigMode::Default)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Load the engine configuration.
///
/// No path, or a path that does not exist, yields the defaults. Otherwise the
/// file is parsed by extension (`.toml`, anything else as JSON) and normalized.
pub fn load_engine_config(path: Option<&Path>) -> Result<LoadedConfig, StoreError> {
    let Some(path) = path else {
        return Ok(LoadedConfig::defaults());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no stored config, using defaults");
        return Ok(LoadedConfig::defaults());
    }

    let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let config = if is_toml(path) {
        EngineConfig::from_toml_str(&text)?
    } else {
        EngineConfig::from_json_str(&text)?
    };
    let loaded = LoadedConfig::new(config, ConfigMode::Custom);
    tracing::info!(
        path = %path.display(),
        engine = %loaded.config.engine,
        hash = %&loaded.hash[..12],
        "loaded custom engine config"
    );
    Ok(loaded)
}

/// Write a configuration, normalized, replacing any existing file atomically.
pub fn save_engine_config(path: &Path, config: &EngineConfig) -> Result<(), StoreError> {
    let normalized = config.normalized();
    let text = if is_toml(path) {
        normalized.to_toml_string()?
    } else {
        normalized.to_json_pretty()?
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(text.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    tracing::info!(path = %path.display(), "saved engine config");
    Ok(())
}

/// Process-wide configuration slot.
///
/// Readers take an `Arc` snapshot and evaluate against it; writers replace the
/// whole value. A poisoned lock still holds a complete config, so it is used as is.
#[derive(Debug)]
pub struct SharedConfig {
    inner: RwLock<Arc<EngineConfig>>,
}

impl SharedConfig {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: RwLock::new(Arc::new(config.normalized())),
        }
    }

    pub fn snapshot(&self) -> Arc<EngineConfig> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in a new configuration and return the previous one.
    pub fn replace(&self, config: EngineConfig) -> Arc<EngineConfig> {
        let next = Arc::new(config.normalized());
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Reload from `path` and swap the result in.
    pub fn reload(&self, path: Option<&Path>) -> Result<LoadedConfig, StoreError> {
        let loaded = load_engine_config(path)?;
        self.replace(loaded.config);
        Ok(loaded)
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
