//! Durable alarm storage.
//!
//! The engine treats persistence as a collaborator: it loads a list of raw
//! records once and writes the whole list back after each change. Records
//! stay as `serde_json::Value` until [`ScheduleStore`](super::ScheduleStore)
//! parses them, so one malformed record cannot poison the whole load.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::alarm::Alarm;
use crate::error::StoreError;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Key-value style durable store holding the alarm list.
pub trait DurableStore: Send + Sync {
    /// Return every stored record, unparsed.
    fn load(&self) -> Result<Vec<serde_json::Value>>;

    /// Replace the stored list.
    fn save(&self, alarms: &[Alarm]) -> Result<()>;
}

/// Alarm list kept as a JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the store at `~/.config/ringer/alarms.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        crate::storage::EngineConfig::alarms_path()
            .map(Self::new)
            .map_err(|e| StoreError::DataDir(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableStore for JsonFileStore {
    fn load(&self) -> Result<Vec<serde_json::Value>> {
        // Missing file is a fresh install, not an error.
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            StoreError::ReadFailed {
                path: self.path.clone(),
                source,
            }
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Array(records)) => Ok(records),
            Ok(other) => Err(StoreError::NotAnArray(kind_of(&other).into())),
            Err(source) => Err(StoreError::Parse {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, alarms: &[Alarm]) -> Result<()> {
        let content = serde_json::to_string_pretty(alarms)?;
        let write_failed = |source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        // Write then rename so a crash never leaves a truncated list.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(write_failed)?;
        std::fs::rename(&tmp, &self.path).map_err(write_failed)?;
        Ok(())
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// In-memory store, shareable between the engine and a test.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with raw records, malformed ones included.
    pub fn with_records(records: Vec<serde_json::Value>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn records(&self) -> Vec<serde_json::Value> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DurableStore for MemoryStore {
    fn load(&self) -> Result<Vec<serde_json::Value>> {
        Ok(self.records())
    }

    fn save(&self, alarms: &[Alarm]) -> Result<()> {
        let values = alarms
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        *self.records.lock().unwrap_or_else(|e| e.into_inner()) = values;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{NewAlarm, TimeOfDay, Weekday};
    use chrono::Utc;

    fn sample() -> Alarm {
        NewAlarm::new(TimeOfDay::new(6, 30).unwrap())
            .label("Wake up")
            .repeat(Weekday::WORKDAYS)
            .into_alarm("1".into(), Utc::now())
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("alarms.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("alarms.json"));

        store.save(&[sample()]).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.len(), 1);
        let alarm: Alarm = serde_json::from_value(loaded[0].clone()).unwrap();
        assert_eq!(alarm, sample_with_created(&alarm));
        assert_eq!(loaded[0]["time"], "06:30");
    }

    fn sample_with_created(loaded: &Alarm) -> Alarm {
        let mut expected = sample();
        expected.created_at = loaded.created_at;
        expected
    }

    #[test]
    fn non_array_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.json");
        std::fs::write(&path, r#"{"id": "1"}"#).unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::NotAnArray(_)));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.json");
        std::fs::write(&path, "[{\"id\": ").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse alarms in"));
    }

    #[test]
    fn memory_store_keeps_saved_list() {
        let store = MemoryStore::new();
        store.save(&[sample()]).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
