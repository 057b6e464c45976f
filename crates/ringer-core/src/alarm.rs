//! Alarm records.
//!
//! An [`Alarm`] is the durable, user-defined entity the trigger engine
//! matches against. Times have minute resolution; repeat days are a set so
//! duplicates cannot be represented.
//!
//! The serialized shape is the flat record list the durable store keeps:
//!
//! ```text
//! {"id": "...", "time": "07:00", "label": "Wake up", "enabled": true,
//!  "repeat": ["mon", "tue"], "sound": "alarm327234.mp3",
//!  "createdAt": "2024-05-06T06:00:00Z"}
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Label used when the user leaves the label blank.
pub const DEFAULT_LABEL: &str = "Alarm";

/// Sound used when a record does not name one.
pub const DEFAULT_SOUND_ID: &str = "alarm327234.mp3";

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock time of day with minute resolution.
///
/// Always holds a valid minute-of-day (`0..1440`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::InvalidTimeOfDay(format!("{hour}:{minute:02}")));
        }
        Ok(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    pub fn from_minute_of_day(minutes: u16) -> Result<Self, ValidationError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ValidationError::InvalidTimeOfDay(minutes.to_string()));
        }
        Ok(Self(minutes))
    }

    /// Truncates seconds and sub-seconds.
    pub fn from_time(time: NaiveTime) -> Self {
        // hour() < 24 and minute() < 60, so this is always in range.
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    pub fn minute_of_day(self) -> u16 {
        self.0
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Parses `HH:MM` (a single-digit hour is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeOfDay(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Weekday tag stored in an alarm's repeat set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub const WORKDAYS: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidWeekday(s.to_string()))
    }
}

/// A user-defined alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: String,
    #[serde(rename = "time")]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Empty means one-shot.
    #[serde(rename = "repeat", default)]
    pub repeat_days: BTreeSet<Weekday>,
    #[serde(rename = "sound", default = "default_sound_id")]
    pub sound_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

fn default_sound_id() -> String {
    DEFAULT_SOUND_ID.to_string()
}

impl Alarm {
    pub fn is_one_shot(&self) -> bool {
        self.repeat_days.is_empty()
    }

    /// Whether the alarm is eligible to fire on `day`.
    pub fn fires_on(&self, day: Weekday) -> bool {
        self.repeat_days.is_empty() || self.repeat_days.contains(&day)
    }

    /// Exact match of a minute-truncated time and weekday against this alarm.
    pub fn matches(&self, time: TimeOfDay, day: Weekday) -> bool {
        self.enabled && self.time_of_day == time && self.fires_on(day)
    }

    /// Next wall-clock time strictly after `after` at which the alarm is
    /// eligible to fire. `None` when the alarm is disabled.
    pub fn next_occurrence(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        if !self.enabled {
            return None;
        }
        let time = self.time_of_day.to_naive_time();
        (0..=7)
            .map(|offset| after.date() + Duration::days(offset))
            .map(|date| date.and_time(time))
            .find(|candidate| *candidate > after && self.fires_on(candidate.weekday().into()))
    }

    /// Time remaining until [`next_occurrence`](Self::next_occurrence).
    pub fn time_until(&self, now: NaiveDateTime) -> Option<Duration> {
        self.next_occurrence(now).map(|next| next - now)
    }

    /// Replace the user-editable fields, keeping identity and audit data.
    pub fn apply(&mut self, edit: NewAlarm) {
        self.time_of_day = edit.time_of_day;
        self.label = normalize_label(&edit.label);
        self.repeat_days = edit.repeat_days;
        self.sound_id = edit.sound_id;
    }
}

/// User input for creating or editing an alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlarm {
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub repeat_days: BTreeSet<Weekday>,
    #[serde(default = "default_sound_id")]
    pub sound_id: String,
}

impl NewAlarm {
    pub fn new(time_of_day: TimeOfDay) -> Self {
        Self {
            time_of_day,
            label: String::new(),
            repeat_days: BTreeSet::new(),
            sound_id: default_sound_id(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn repeat(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.repeat_days = days.into_iter().collect();
        self
    }

    pub fn sound(mut self, sound_id: impl Into<String>) -> Self {
        self.sound_id = sound_id.into();
        self
    }

    /// Build an enabled alarm with the given identity.
    pub fn into_alarm(self, id: String, created_at: DateTime<Utc>) -> Alarm {
        Alarm {
            id,
            time_of_day: self.time_of_day,
            label: normalize_label(&self.label),
            enabled: true,
            repeat_days: self.repeat_days,
            sound_id: self.sound_id,
            created_at,
        }
    }
}

fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}
