//! TOML-based configuration.
//!
//! Stores:
//! - Device backend location and request timeout
//! - Number of step slots on the form and the tick period
//! - Channels the device exposes
//! - Recipe presets
//!
//! Configuration is stored at `~/.config/uvseq/config.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::data_dir;
use crate::channels::DEFAULT_CHANNELS;
use crate::error::{ConfigError, PresetError};
use crate::procedure::{builtin_presets, Preset, DEFAULT_STEP_COUNT};

/// Where the device backend service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Form and countdown settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureConfig {
    #[serde(default = "default_step_count")]
    pub step_count: usize,
    /// Milliseconds between sequencer ticks. Each tick counts as one second.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default = "default_channels")]
    pub available: Vec<u8>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/uvseq/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub procedure: ProcedureConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default = "builtin_presets")]
    pub presets: BTreeMap<String, Preset>,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_step_count() -> usize {
    DEFAULT_STEP_COUNT
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_channels() -> Vec<u8> {
    DEFAULT_CHANNELS.to_vec()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ProcedureConfig {
    fn default() -> Self {
        Self {
            step_count: default_step_count(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            available: default_channels(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            procedure: ProcedureConfig::default(),
            channels: ChannelsConfig::default(),
            presets: builtin_presets(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there on first use.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
                cfg.validate()?;
                debug!(path = %path.display(), "loaded configuration");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                info!(path = %path.display(), "wrote default configuration");
                Ok(cfg)
            }
            Err(e) => Err(load_failed(e.to_string())),
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Reject settings the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        };
        if self.procedure.step_count == 0 {
            return Err(invalid("procedure.step_count", "must be at least 1"));
        }
        if self.procedure.tick_interval_ms == 0 {
            return Err(invalid("procedure.tick_interval_ms", "must be at least 1"));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(invalid("backend.request_timeout_secs", "must be at least 1"));
        }
        if self.channels.available.is_empty() {
            return Err(invalid("channels.available", "must list at least one channel"));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.procedure.tick_interval_ms)
    }

    pub fn preset(&self, key: &str) -> Result<&Preset, PresetError> {
        self.presets
            .get(key)
            .ok_or_else(|| PresetError::NotFound(key.to_string()))
    }

    /// Get a config value as string by dot-separated key, e.g. `backend.base_url`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match lookup(&json, key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key in memory. The new value is parsed
    /// as the type the key already holds.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        assign(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// [`apply`](Self::apply) then persist to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    key.split('.').try_fold(root, |node, part| node.get(part))
}

fn assign(root: &mut Value, key: &str, raw: &str) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let (parent, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", key),
    };
    let mut node = root;
    if !parent.is_empty() {
        for part in parent.split('.') {
            node = node.get_mut(part).ok_or_else(unknown)?;
        }
    }
    let slot = node
        .as_object_mut()
        .and_then(|obj| obj.get_mut(leaf))
        .ok_or_else(unknown)?;

    *slot = match &*slot {
        Value::Bool(_) => Value::Bool(raw.parse().map_err(|_| invalid(format!("'{raw}' is not a bool")))?),
        Value::Number(_) => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| invalid(format!("'{raw}' is not a non-negative integer")))?,
        Value::Array(_) | Value::Object(_) => {
            serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?
        }
        _ => Value::String(raw.to_string()),
    };
    Ok(())
}
