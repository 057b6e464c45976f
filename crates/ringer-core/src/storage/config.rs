//! TOML-based engine configuration.
//!
//! Stores the timing constants of the alert engine:
//! - Cooldown window and evaluation cadence
//! - Auto-expire timeout and default snooze delay
//! - One-shot alarm policy
//! - Default sounds and vibration patterns
//!
//! Configuration is stored at `~/.config/ringer/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::alarm::DEFAULT_SOUND_ID;
use crate::error::ConfigError;

const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;
const MAX_SNOOZE_MINUTES: u64 = 24 * 60;
const MAX_INTERVAL_MS: u64 = 60_000;

/// What happens to a one-shot alarm (empty repeat set) after it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneShotPolicy {
    /// Disable the alarm as soon as it fires.
    #[default]
    Disable,
    /// Leave it enabled; it fires again the next day.
    Keep,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/ringer/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum gap between two triggers of the same source.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Unacknowledged alerts are dismissed after this long.
    #[serde(default = "default_auto_expire_secs")]
    pub auto_expire_secs: u64,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u64,
    #[serde(default = "default_1000")]
    pub evaluate_interval_ms: u64,
    #[serde(default = "default_1000")]
    pub countdown_interval_ms: u64,
    #[serde(default = "default_stopwatch_interval_ms")]
    pub stopwatch_interval_ms: u64,
    #[serde(default)]
    pub one_shot_policy: OneShotPolicy,
    #[serde(default = "default_sound")]
    pub default_sound: String,
    /// Sound used for countdown completion alerts.
    #[serde(default = "default_countdown_sound")]
    pub countdown_sound: String,
    /// Vibration pattern sent with a normal delivery (on/off milliseconds).
    #[serde(default = "default_vibration_pattern")]
    pub vibration_pattern_ms: Vec<u64>,
    /// Pattern used when sound/notification delivery fails.
    #[serde(default = "default_fallback_vibration_pattern")]
    pub fallback_vibration_pattern_ms: Vec<u64>,
}

// Default functions
fn default_cooldown_secs() -> u64 {
    60
}
fn default_auto_expire_secs() -> u64 {
    120
}
fn default_snooze_minutes() -> u64 {
    5
}
fn default_1000() -> u64 {
    1000
}
fn default_stopwatch_interval_ms() -> u64 {
    10
}
fn default_sound() -> String {
    DEFAULT_SOUND_ID.into()
}
fn default_countdown_sound() -> String {
    "alarm301729.mp3".into()
}
fn default_vibration_pattern() -> Vec<u64> {
    vec![1000, 500, 1000, 500, 1000, 500, 1000]
}
fn default_fallback_vibration_pattern() -> Vec<u64> {
    vec![1000, 500, 1000]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            auto_expire_secs: default_auto_expire_secs(),
            snooze_minutes: default_snooze_minutes(),
            evaluate_interval_ms: default_1000(),
            countdown_interval_ms: default_1000(),
            stopwatch_interval_ms: default_stopwatch_interval_ms(),
            one_shot_policy: OneShotPolicy::default(),
            default_sound: default_sound(),
            countdown_sound: default_countdown_sound(),
            vibration_pattern_ms: default_vibration_pattern(),
            fallback_vibration_pattern_ms: default_fallback_vibration_pattern(),
        }
    }
}

impl EngineConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Path of the alarm list next to the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn alarms_path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("alarms.json"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from a specific path, writing the default there when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the default cannot
    /// be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: EngineConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default engine config");
            Self::default()
        })
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero-length intervals or
    /// windows, and for values above their upper bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounded = [
            ("cooldown_secs", self.cooldown_secs, MAX_WINDOW_SECS),
            ("auto_expire_secs", self.auto_expire_secs, MAX_WINDOW_SECS),
            ("snooze_minutes", self.snooze_minutes, MAX_SNOOZE_MINUTES),
            ("evaluate_interval_ms", self.evaluate_interval_ms, MAX_INTERVAL_MS),
            ("countdown_interval_ms", self.countdown_interval_ms, MAX_INTERVAL_MS),
            ("stopwatch_interval_ms", self.stopwatch_interval_ms, MAX_INTERVAL_MS),
        ];
        for (key, value, max) in bounded {
            if value == 0 || value > max {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("must be between 1 and {max}"),
                });
            }
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Cooldown window, capped at one day.
    pub fn cooldown(&self) -> chrono::Duration {
        bounded_seconds(self.cooldown_secs, MAX_WINDOW_SECS)
    }

    /// Auto-expire timeout, capped at one day.
    pub fn auto_expire(&self) -> chrono::Duration {
        bounded_seconds(self.auto_expire_secs, MAX_WINDOW_SECS)
    }

    /// Default snooze delay, capped at one day.
    pub fn snooze_delay(&self) -> chrono::Duration {
        bounded_seconds(
            self.snooze_minutes.min(MAX_SNOOZE_MINUTES).saturating_mul(60),
            MAX_WINDOW_SECS,
        )
    }
}

fn bounded_seconds(secs: u64, max: u64) -> chrono::Duration {
    i64::try_from(secs.min(max))
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or_else(|| chrono::Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = EngineConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: EngineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.cooldown_secs, 60);
        assert_eq!(cfg.auto_expire_secs, 120);
        assert_eq!(cfg.snooze_minutes, 5);
        assert_eq!(cfg.evaluate_interval_ms, 1000);
        assert_eq!(cfg.stopwatch_interval_ms, 10);
        assert_eq!(cfg.one_shot_policy, OneShotPolicy::Disable);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            snooze_minutes = 10
            one_shot_policy = "keep"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.snooze_minutes, 10);
        assert_eq!(cfg.one_shot_policy, OneShotPolicy::Keep);
        assert_eq!(cfg.cooldown_secs, 60);
    }

    #[test]
    fn get_supports_keys() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.get("cooldown_secs").as_deref(), Some("60"));
        assert_eq!(cfg.get("one_shot_policy").as_deref(), Some("disable"));
        assert!(cfg.get("missing_key").is_none());
    }

    #[test]
    fn load_from_writes_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = EngineConfig::load_from(&path).unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_zero_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "evaluate_interval_ms = 0\n").unwrap();
        let err = EngineConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn load_from_rejects_oversized_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        for line in [
            "snooze_minutes = 9223372036854775807",
            "auto_expire_secs = 9223372036854775807",
            "cooldown_secs = 86401",
            "stopwatch_interval_ms = 60001",
        ] {
            std::fs::write(&path, format!("{line}\n")).unwrap();
            let err = EngineConfig::load_from(&path).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{line}");
        }

        std::fs::write(&path, "snooze_minutes = 1440\ncooldown_secs = 86400\n").unwrap();
        let cfg = EngineConfig::load_from(&path).unwrap();
        assert_eq!(cfg.snooze_delay(), chrono::Duration::days(1));
    }

    #[test]
    fn accessors_cap_unvalidated_values() {
        let cfg = EngineConfig {
            cooldown_secs: u64::MAX,
            auto_expire_secs: u64::MAX,
            snooze_minutes: u64::MAX,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert_eq!(cfg.cooldown(), chrono::Duration::days(1));
        assert_eq!(cfg.auto_expire(), chrono::Duration::days(1));
        assert_eq!(cfg.snooze_delay(), chrono::Duration::days(1));
    }
}
