//! Trigger engine.
//!
//! A periodic evaluator that matches the current wall-clock minute against
//! the alarm list. Evaluation runs every second while alarms have minute
//! resolution, so without the cooldown record an alarm would re-fire on
//! every tick of its minute. The cooldown is what makes "exactly once per
//! occurrence" hold.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TriggerEngine::new(Duration::seconds(60));
//! // Once per second:
//! for event in engine.evaluate(now, schedule.alarms()) {
//!     pipeline.accept(event, now);
//! }
//! ```

use chrono::{Datelike, Duration, NaiveDateTime};

use super::cooldown::CooldownRecord;
use crate::alarm::{Alarm, TimeOfDay, Weekday};
use crate::events::{TriggerEvent, TriggerOrigin};

#[derive(Debug, Clone)]
pub struct TriggerEngine {
    cooldown: CooldownRecord,
}

impl TriggerEngine {
    pub fn new(cooldown_window: Duration) -> Self {
        Self {
            cooldown: CooldownRecord::new(cooldown_window),
        }
    }

    pub fn cooldown(&self) -> &CooldownRecord {
        &self.cooldown
    }

    /// Emit one event per alarm due at `now` that is not cooling down.
    ///
    /// Every simultaneous match is returned; none are dropped.
    pub fn evaluate<'a>(
        &mut self,
        now: NaiveDateTime,
        alarms: impl IntoIterator<Item = &'a Alarm>,
    ) -> Vec<TriggerEvent> {
        let minute = TimeOfDay::from_time(now.time());
        let day = Weekday::from(now.weekday());
        self.cooldown.prune(now);

        let mut fired = Vec::new();
        for alarm in alarms {
            if alarm.id.trim().is_empty() {
                tracing::warn!(time = %alarm.time_of_day, "skipping alarm with blank id");
                continue;
            }
            if !alarm.matches(minute, day) {
                continue;
            }
            if self.cooldown.is_cooling(&alarm.id, now) {
                continue;
            }
            tracing::info!(alarm_id = %alarm.id, label = %alarm.label, %now, "alarm fired");
            self.cooldown.mark(&alarm.id, now);
            fired.push(TriggerEvent {
                source_id: alarm.id.clone(),
                origin: TriggerOrigin::Alarm,
                label: alarm.label.clone(),
                sound_id: alarm.sound_id.clone(),
                fired_at: now,
            });
        }
        fired
    }

    /// Mark a source as just handled so it is not re-fired this window.
    /// Used on dismiss and snooze; idempotent with the engine's own record.
    pub fn acknowledge(&mut self, source_id: &str, now: NaiveDateTime) {
        self.cooldown.mark(source_id, now);
    }

    /// Drop cooldown state for a deleted alarm.
    pub fn forget(&mut self, source_id: &str) {
        self.cooldown.forget(source_id);
    }
}
