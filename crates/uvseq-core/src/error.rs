//! Core error types for uvseq-core.
//!
//! Only boundary operations fail: parsing text into durations, loading
//! configuration and presets, and talking to the device backend. The
//! sequencer itself never returns errors; its conditions surface as
//! [`Event`](crate::events::Event)s.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for uvseq-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Preset lookup or decoding errors
    #[error("Preset error: {0}")]
    Preset(#[from] PresetError),

    /// A step outside the device's limits
    #[error("Step error: {0}")]
    Step(#[from] StepError),

    /// Duration text could not be decoded
    #[error("Duration error: {0}")]
    Duration(#[from] DurationError),

    /// The sequencer runtime task is gone
    #[error("Sequencer runtime is not running")]
    SequencerGone,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be prepared
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Errors talking to the device backend service.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Network failure, timeout, or malformed URL
    #[error("Could not reach device backend: {0}")]
    Transport(#[from] reqwest::Error),

    /// Base URL in configuration is not usable
    #[error("Invalid backend URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Backend answered with a non-2xx status
    #[error("Device backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend answered 2xx but refused the request in its body
    #[error("Device backend rejected the request: {message}")]
    Rejected { message: String },

    /// Backend answered 2xx with a body that is not JSON
    #[error("Device backend sent an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Errors decoding a preset record.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PresetError {
    /// No preset with this key
    #[error("Preset '{0}' not found")]
    NotFound(String),

    /// A `step_N_time` / `step_N_value` field is absent
    #[error("Preset '{preset}' is missing field '{field}'")]
    MissingField { preset: String, field: String },

    /// A field is present but has the wrong shape
    #[error("Preset '{preset}' has invalid field '{field}': {message}")]
    InvalidField {
        preset: String,
        field: String,
        message: String,
    },
}

/// Errors building a procedure step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("Intensity {0} is out of range 0-100")]
    IntensityOutOfRange(u8),
}

/// Errors decoding duration text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Input is neither `HH:MM:SS` nor a 6-digit numeral
    #[error("Unrecognized duration '{0}': expected HH:MM:SS or six digits")]
    Format(String),

    /// A field is not a non-negative integer
    #[error("Invalid duration field '{field}' in '{input}'")]
    Field { input: String, field: String },

    /// A field does not fit in two digits
    #[error("Duration field '{field}' in '{input}' exceeds two digits")]
    FieldTooWide { input: String, field: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
