//! In-memory alarm collection.
//!
//! Pure data access: no timing logic lives here. Every mutation marks the
//! store dirty; the owner takes a snapshot with [`ScheduleStore::take_dirty`]
//! and hands it to a [`DurableStore`] without blocking the next tick.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::DurableStore;
use crate::alarm::{Alarm, NewAlarm};
use crate::error::ValidationError;

#[derive(Debug, Clone, Default)]
pub struct ScheduleStore {
    alarms: Vec<Alarm>,
    dirty: bool,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a durable store. Never fails: a store error yields an
    /// empty schedule and malformed records are skipped.
    pub fn load_from(store: &dyn DurableStore) -> Self {
        match store.load() {
            Ok(records) => Self::from_records(records),
            Err(e) => {
                tracing::warn!(error = %e, "could not read alarm store, starting empty");
                Self::new()
            }
        }
    }

    /// Parse raw records, logging and skipping any that are malformed or
    /// reuse an id already seen.
    pub fn from_records(records: Vec<serde_json::Value>) -> Self {
        let mut seen = HashSet::new();
        let mut alarms = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Alarm>(record) {
                Ok(alarm) if alarm.id.trim().is_empty() => {
                    tracing::warn!(index, "skipping alarm record with blank id");
                }
                Ok(alarm) => {
                    if seen.insert(alarm.id.clone()) {
                        alarms.push(alarm);
                    } else {
                        tracing::warn!(index, id = %alarm.id, "skipping duplicate alarm id");
                    }
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed alarm record");
                }
            }
        }
        Self {
            alarms,
            dirty: false,
        }
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.iter().filter(|a| a.enabled)
    }

    pub fn get(&self, id: &str) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Create an alarm with a fresh id. Newest alarms come first.
    pub fn add(&mut self, new: NewAlarm, created_at: DateTime<Utc>) -> Alarm {
        let alarm = new.into_alarm(uuid::Uuid::new_v4().to_string(), created_at);
        self.alarms.insert(0, alarm.clone());
        self.dirty = true;
        alarm
    }

    /// Edit time, label, repeat days and sound of an existing alarm.
    pub fn update(&mut self, id: &str, edit: NewAlarm) -> Result<Alarm, ValidationError> {
        let alarm = self.get_mut(id)?;
        alarm.apply(edit);
        let updated = alarm.clone();
        self.dirty = true;
        Ok(updated)
    }

    pub fn remove(&mut self, id: &str) -> Option<Alarm> {
        let index = self.alarms.iter().position(|a| a.id == id)?;
        self.dirty = true;
        Some(self.alarms.remove(index))
    }

    /// Returns whether the flag actually changed.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<bool, ValidationError> {
        let alarm = self.get_mut(id)?;
        if alarm.enabled == enabled {
            return Ok(false);
        }
        alarm.enabled = enabled;
        self.dirty = true;
        Ok(true)
    }

    /// Flip the enabled flag; returns the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool, ValidationError> {
        let enabled = !self.get_mut(id)?.enabled;
        self.set_enabled(id, enabled)?;
        Ok(enabled)
    }

    /// Snapshot of the list if it changed since the last call.
    pub fn take_dirty(&mut self) -> Option<Vec<Alarm>> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.alarms.clone())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Alarm, ValidationError> {
        self.alarms
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ValidationError::UnknownAlarm(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::TimeOfDay;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn new_alarm(time: &str) -> NewAlarm {
        NewAlarm::new(time.parse::<TimeOfDay>().unwrap())
    }

    #[test]
    fn malformed_records_are_skipped() {
        let store = MemoryStore::with_records(vec![
            json!({"id": "1", "time": "06:30", "label": "ok", "enabled": true, "repeat": [], "sound": "s"}),
            json!({"id": "2", "time": "25:99", "label": "bad time"}),
            json!({"id": "3", "label": "no time"}),
            json!({"id": "4", "time": "07:00", "repeat": ["mon", "someday"]}),
            json!("not an object"),
            json!({"id": "", "time": "07:00"}),
            json!({"id": "1", "time": "08:00"}),
            json!({"id": "5", "time": "07:45"}),
        ]);

        let schedule = ScheduleStore::load_from(&store);

        let ids: Vec<_> = schedule.alarms().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
        // missing fields take their defaults
        let five = schedule.get("5").unwrap();
        assert!(five.enabled);
        assert!(five.is_one_shot());
    }

    #[test]
    fn load_does_not_mark_dirty() {
        let store = MemoryStore::with_records(vec![json!({"id": "1", "time": "06:30"})]);
        let mut schedule = ScheduleStore::load_from(&store);
        assert!(schedule.take_dirty().is_none());
    }

    #[test]
    fn add_puts_newest_first_and_marks_dirty() {
        let mut schedule = ScheduleStore::new();
        let first = schedule.add(new_alarm("06:00"), Utc::now());
        let second = schedule.add(new_alarm("07:00"), Utc::now());
        assert_ne!(first.id, second.id);
        assert_eq!(schedule.alarms()[0].id, second.id);

        let snapshot = schedule.take_dirty().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(schedule.take_dirty().is_none());
    }

    #[test]
    fn toggle_and_set_enabled() {
        let mut schedule = ScheduleStore::new();
        let id = schedule.add(new_alarm("06:00"), Utc::now()).id;
        schedule.take_dirty();

        assert!(!schedule.toggle(&id).unwrap());
        assert_eq!(schedule.enabled().count(), 0);
        assert!(!schedule.set_enabled(&id, false).unwrap());
        assert!(schedule.take_dirty().is_some());

        assert!(schedule.set_enabled(&id, true).unwrap());
        assert!(matches!(
            schedule.toggle("missing"),
            Err(ValidationError::UnknownAlarm(_))
        ));
    }

    #[test]
    fn update_keeps_identity() {
        let mut schedule = ScheduleStore::new();
        let original = schedule.add(new_alarm("06:00").label("old"), Utc::now());
        let updated = schedule
            .update(&original.id, new_alarm("09:15").label("new"))
            .unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.time_of_day.to_string(), "09:15");
        assert_eq!(updated.label, "new");
    }

    #[test]
    fn remove_returns_alarm() {
        let mut schedule = ScheduleStore::new();
        let id = schedule.add(new_alarm("06:00"), Utc::now()).id;
        assert!(schedule.remove(&id).is_some());
        assert!(schedule.remove(&id).is_none());
        assert!(schedule.is_empty());
    }
}
