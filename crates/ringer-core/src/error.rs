//! Core error types for ringer-core.
//!
//! This module defines the error hierarchy using thiserror. Most runtime
//! faults (malformed records, delivery failures) are logged and absorbed;
//! only caller mistakes and I/O problems surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ringer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Durable store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Delivery collaborator errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine task is no longer running
    #[error("Alarm engine has shut down")]
    EngineStopped,
}

/// Durable store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read the alarm list
    #[error("Failed to read alarms from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the alarm list
    #[error("Failed to write alarms to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Top-level document is not a JSON array
    #[error("Alarm store is not a JSON array: {0}")]
    NotAnArray(String),

    /// File content is not valid JSON
    #[error("Failed to parse alarms in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode alarms: {0}")]
    Encode(#[from] serde_json::Error),

    /// Failed to access data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
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
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Countdown and snooze durations must be positive
    #[error("Invalid duration: {millis} ms (must be greater than zero)")]
    NonPositiveDuration { millis: i64 },

    /// Adding the duration to the current time leaves the calendar range
    #[error("Duration out of range: {millis} ms")]
    DurationOutOfRange { millis: i64 },

    /// Time of day string could not be parsed
    #[error("Invalid time of day '{0}': expected HH:MM")]
    InvalidTimeOfDay(String),

    /// Weekday tag could not be parsed
    #[error("Invalid weekday tag '{0}'")]
    InvalidWeekday(String),

    /// Referenced alarm does not exist
    #[error("Alarm '{0}' not found")]
    UnknownAlarm(String),
}

/// Errors reported by a delivery collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Notification permission was not granted
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The adapter does not support this channel (e.g. no vibration motor)
    #[error("Delivery channel unsupported: {0}")]
    Unsupported(&'static str),

    /// Platform reported a failure
    #[error("Delivery failed: {0}")]
    Failed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
