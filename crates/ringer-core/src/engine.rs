//! Alarm engine.
//!
//! Single owner of every piece of mutable state: the alarm schedule, the
//! cooldown record, the alert slot and its queue, pending snoozes and both
//! session timers. Nothing here reads the clock or touches the disk; the
//! caller passes `now` in and collects saves and observer events out.
//!
//! ## Tick order
//!
//! ```text
//! snooze jobs due -> trigger evaluation -> auto-expire -> countdown
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = AlarmEngine::new(config, Box::new(LogDelivery::new()), Box::new(StaticPermission::granted()));
//! engine.load(&JsonFileStore::open_default()?);
//! // Once per second:
//! engine.tick(clock.now());
//! for event in engine.drain_events() {
//!     publish(event);
//! }
//! if let Some(snapshot) = engine.take_pending_save() {
//!     store.save(&snapshot)?;
//! }
//! ```

use chrono::{Duration, NaiveDateTime, Utc};

use crate::alarm::{Alarm, NewAlarm};
use crate::alert::{ActiveAlert, AlertDelivery, AlertPipeline, JobHandle, PermissionProvider, SnoozeScheduler};
use crate::error::ValidationError;
use crate::events::{Event, TriggerEvent, TriggerOrigin};
use crate::storage::{DurableStore, EngineConfig, OneShotPolicy, ScheduleStore};
use crate::timer::{Countdown, SessionState, Stopwatch};
use crate::trigger::TriggerEngine;

#[derive(Debug)]
pub struct AlarmEngine {
    config: EngineConfig,
    schedule: ScheduleStore,
    trigger: TriggerEngine,
    pipeline: AlertPipeline,
    snoozes: SnoozeScheduler,
    stopwatch: Stopwatch,
    countdown: Countdown,
    outbox: Vec<Event>,
    shut_down: bool,
}

impl AlarmEngine {
    pub fn new(
        config: EngineConfig,
        delivery: Box<dyn AlertDelivery>,
        permissions: Box<dyn PermissionProvider>,
    ) -> Self {
        let pipeline = AlertPipeline::new(delivery, permissions, config.auto_expire()).with_vibration(
            config.vibration_pattern_ms.clone(),
            config.fallback_vibration_pattern_ms.clone(),
        );
        Self {
            trigger: TriggerEngine::new(config.cooldown()),
            countdown: Countdown::new(config.countdown_sound.clone()),
            schedule: ScheduleStore::new(),
            pipeline,
            snoozes: SnoozeScheduler::new(),
            stopwatch: Stopwatch::new(),
            outbox: Vec::new(),
            shut_down: false,
            config,
        }
    }

    /// Replace the schedule with the contents of `store`. Returns the number
    /// of alarms loaded.
    pub fn load(&mut self, store: &dyn DurableStore) -> usize {
        self.schedule = ScheduleStore::load_from(store);
        tracing::info!(count = self.schedule.len(), "alarms loaded");
        self.schedule.len()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn alarms(&self) -> &[Alarm] {
        self.schedule.alarms()
    }

    pub fn alarm(&self, id: &str) -> Option<&Alarm> {
        self.schedule.get(id)
    }

    /// The enabled alarm that fires soonest after `now`.
    pub fn next_alarm(&self, now: NaiveDateTime) -> Option<(&Alarm, NaiveDateTime)> {
        self.schedule
            .enabled()
            .filter_map(|alarm| alarm.next_occurrence(now).map(|at| (alarm, at)))
            .min_by_key(|(_, at)| *at)
    }

    pub fn active_alert(&self) -> Option<&ActiveAlert> {
        self.pipeline.active()
    }

    pub fn queued_alerts(&self) -> impl Iterator<Item = &TriggerEvent> {
        self.pipeline.queued()
    }

    pub fn snoozed_until(&self, source_id: &str) -> Option<NaiveDateTime> {
        self.snoozes.pending_until(source_id)
    }

    pub fn pending_snoozes(&self) -> usize {
        self.snoozes.len()
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Take the observer events produced since the last call, in order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.pump();
        std::mem::take(&mut self.outbox)
    }

    /// Snapshot of the alarm list if it changed since the last call.
    pub fn take_pending_save(&mut self) -> Option<Vec<Alarm>> {
        self.schedule.take_dirty()
    }

    // ── Schedule ─────────────────────────────────────────────────────

    pub fn add_alarm(&mut self, new: NewAlarm) -> Alarm {
        let alarm = self.schedule.add(new, Utc::now());
        tracing::info!(alarm_id = %alarm.id, time = %alarm.time_of_day, "alarm added");
        alarm
    }

    /// Edit an alarm. Moving it to another time clears its cooldown; any
    /// other edit keeps it, so an occurrence that already fired stays fired.
    pub fn update_alarm(&mut self, id: &str, edit: NewAlarm) -> Result<Alarm, ValidationError> {
        let previous_time = self.schedule.get(id).map(|alarm| alarm.time_of_day);
        let alarm = self.schedule.update(id, edit)?;
        if previous_time != Some(alarm.time_of_day) {
            self.trigger.forget(id);
        }
        tracing::info!(alarm_id = %id, time = %alarm.time_of_day, "alarm updated");
        Ok(alarm)
    }

    /// Delete an alarm together with its pending snooze and cooldown entry.
    pub fn remove_alarm(&mut self, id: &str) -> Result<Alarm, ValidationError> {
        let alarm = self
            .schedule
            .remove(id)
            .ok_or_else(|| ValidationError::UnknownAlarm(id.to_string()))?;
        self.cancel_snooze(id);
        self.trigger.forget(id);
        tracing::info!(alarm_id = %id, "alarm removed");
        Ok(alarm)
    }

    /// Enable or disable an alarm. Disabling cancels its pending snooze.
    /// Returns whether the flag changed.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<bool, ValidationError> {
        let changed = self.schedule.set_enabled(id, enabled)?;
        if !enabled {
            self.cancel_snooze(id);
        }
        if changed {
            tracing::info!(alarm_id = %id, enabled, "alarm toggled");
        }
        Ok(changed)
    }

    /// Flip the enabled flag; returns the new value. Disabling cancels the
    /// pending snooze.
    pub fn toggle_alarm(&mut self, id: &str) -> Result<bool, ValidationError> {
        let enabled = self.schedule.toggle(id)?;
        if !enabled {
            self.cancel_snooze(id);
        }
        tracing::info!(alarm_id = %id, enabled, "alarm toggled");
        Ok(enabled)
    }

    // ── Ticks ────────────────────────────────────────────────────────

    /// One evaluation pass. Call about once per second.
    pub fn tick(&mut self, now: NaiveDateTime) {
        if self.shut_down {
            return;
        }

        for event in self.snoozes.due(now) {
            tracing::debug!(source_id = %event.source_id, "snooze elapsed");
            self.pipeline.accept(event, now);
        }

        let fired = self.trigger.evaluate(now, self.schedule.alarms());
        for event in fired {
            self.apply_one_shot_policy(&event);
            self.pipeline.accept(event, now);
        }

        if let Some(expired) = self.pipeline.tick(now) {
            self.trigger.acknowledge(&expired.source_id, now);
        }

        self.tick_countdown(now);
        self.pump();
    }

    /// Advance the countdown, ringing when it reaches zero.
    pub fn tick_countdown(&mut self, now: NaiveDateTime) {
        if self.shut_down {
            return;
        }
        if let Some(done) = self.countdown.tick(now) {
            self.pipeline.accept(done, now);
            self.pump();
        }
    }

    /// Advance the stopwatch. Returns the elapsed milliseconds.
    pub fn tick_stopwatch(&mut self, now: NaiveDateTime) -> u64 {
        self.stopwatch.tick(now)
    }

    // ── Alert ────────────────────────────────────────────────────────

    /// Dismiss the ringing alert. `None` when nothing is ringing.
    pub fn dismiss(&mut self, now: NaiveDateTime) -> Option<TriggerEvent> {
        let event = self.pipeline.dismiss(now)?;
        self.trigger.acknowledge(&event.source_id, now);
        self.pump();
        Some(event)
    }

    /// Snooze the ringing alert for `delay`. `Ok(None)` when nothing is
    /// ringing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDuration`] for a zero or
    /// negative delay and [`ValidationError::DurationOutOfRange`] when
    /// `now + delay` is not a representable time. The alert keeps ringing
    /// in both cases.
    pub fn snooze(
        &mut self,
        delay: Duration,
        now: NaiveDateTime,
    ) -> Result<Option<JobHandle>, ValidationError> {
        let millis = delay.num_milliseconds();
        if delay <= Duration::zero() {
            return Err(ValidationError::NonPositiveDuration { millis });
        }
        if now.checked_add_signed(delay).is_none() {
            return Err(ValidationError::DurationOutOfRange { millis });
        }
        let Some(event) = self.pipeline.snooze(delay, now) else {
            return Ok(None);
        };
        self.trigger.acknowledge(&event.source_id, now);
        let handle = self.snoozes.arm(event, delay, now);
        self.pump();
        Ok(Some(handle))
    }

    /// Snooze with the configured delay.
    pub fn snooze_default(&mut self, now: NaiveDateTime) -> Option<JobHandle> {
        let delay = self.config.snooze_delay();
        self.snooze(delay, now).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "configured snooze delay rejected");
            None
        })
    }

    /// Ring immediately without waiting for the schedule. With an alarm id
    /// the alert borrows that alarm's label and sound.
    pub fn trigger_test(
        &mut self,
        alarm_id: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<TriggerEvent, ValidationError> {
        let (label, sound_id) = match alarm_id {
            Some(id) => {
                let alarm = self
                    .schedule
                    .get(id)
                    .ok_or_else(|| ValidationError::UnknownAlarm(id.to_string()))?;
                (alarm.label.clone(), alarm.sound_id.clone())
            }
            None => ("Test alarm".to_string(), self.config.default_sound.clone()),
        };
        let event = TriggerEvent {
            source_id: format!("test-{}", now.and_utc().timestamp_millis()),
            origin: TriggerOrigin::Test,
            label,
            sound_id,
            fired_at: now,
        };
        tracing::info!(source_id = %event.source_id, "test alert requested");
        self.pipeline.accept(event.clone(), now);
        self.pump();
        Ok(event)
    }

    // ── Countdown ────────────────────────────────────────────────────

    pub fn start_countdown(
        &mut self,
        duration: Duration,
        now: NaiveDateTime,
    ) -> Result<SessionState, ValidationError> {
        let changed = self.countdown.start(duration, now)?;
        self.outbox.extend(changed);
        Ok(self.countdown.state())
    }

    pub fn pause_countdown(&mut self, now: NaiveDateTime) -> SessionState {
        let changed = self.countdown.pause(now);
        self.outbox.extend(changed);
        self.countdown.state()
    }

    pub fn resume_countdown(&mut self, now: NaiveDateTime) -> SessionState {
        let changed = self.countdown.resume(now);
        self.outbox.extend(changed);
        self.countdown.state()
    }

    pub fn reset_countdown(&mut self, now: NaiveDateTime) -> SessionState {
        let changed = self.countdown.reset(now);
        self.outbox.extend(changed);
        self.countdown.state()
    }

    // ── Stopwatch ────────────────────────────────────────────────────

    pub fn start_stopwatch(&mut self, now: NaiveDateTime) -> SessionState {
        let changed = self.stopwatch.start(now);
        self.outbox.extend(changed);
        self.stopwatch.state()
    }

    pub fn pause_stopwatch(&mut self, now: NaiveDateTime) -> SessionState {
        let changed = self.stopwatch.pause(now);
        self.outbox.extend(changed);
        self.stopwatch.state()
    }

    pub fn reset_stopwatch(&mut self, now: NaiveDateTime) -> SessionState {
        let changed = self.stopwatch.reset(now);
        self.outbox.extend(changed);
        self.stopwatch.state()
    }

    /// Record a lap. `None` unless the stopwatch is running.
    pub fn lap_stopwatch(&mut self, now: NaiveDateTime) -> Option<u64> {
        self.stopwatch.lap(now)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Stop the current delivery and drop every queued alert and pending
    /// snooze. The engine ignores ticks afterwards. Repeat calls are no-ops.
    pub fn shutdown(&mut self, now: NaiveDateTime) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.pipeline.shutdown(now);
        self.snoozes.clear();
        self.pump();
        tracing::info!("alarm engine shut down");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_one_shot_policy(&mut self, event: &TriggerEvent) {
        if self.config.one_shot_policy != OneShotPolicy::Disable {
            return;
        }
        let one_shot = self
            .schedule
            .get(&event.source_id)
            .is_some_and(Alarm::is_one_shot);
        if !one_shot {
            return;
        }
        if let Ok(true) = self.schedule.set_enabled(&event.source_id, false) {
            tracing::info!(alarm_id = %event.source_id, "one-shot alarm disabled after firing");
            self.outbox.push(Event::AlarmAutoDisabled {
                alarm_id: event.source_id.clone(),
            });
        }
    }

    fn cancel_snooze(&mut self, source_id: &str) {
        if self.snoozes.cancel_all(source_id) {
            tracing::debug!(%source_id, "pending snooze cancelled");
            self.outbox.push(Event::SnoozeCancelled {
                source_id: source_id.to_string(),
            });
        }
    }

    /// Move pipeline events into the engine outbox, keeping order.
    fn pump(&mut self) {
        self.outbox.extend(self.pipeline.drain_events());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Weekday;
    use crate::alert::{AlertState, LogDelivery, StaticPermission};
    use crate::events::DismissReason;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    // 2024-05-06 is a Monday.
    fn monday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn engine_with(config: EngineConfig) -> AlarmEngine {
        AlarmEngine::new(
            config,
            Box::new(LogDelivery::new()),
            Box::new(StaticPermission::granted()),
        )
    }

    fn engine() -> AlarmEngine {
        engine_with(EngineConfig::default())
    }

    fn at(time: &str) -> NewAlarm {
        NewAlarm::new(time.parse().unwrap())
    }

    fn ringing_source(engine: &AlarmEngine) -> Option<String> {
        engine
            .active_alert()
            .filter(|alert| alert.state == AlertState::Ringing)
            .map(|alert| alert.event.source_id.clone())
    }

    #[test]
    fn alarm_rings_once_per_minute() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::WORKDAYS)).id;

        for s in 0..60 {
            engine.tick(monday(7, 0, s));
        }
        let rung = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Event::AlertRinging { .. }))
            .count();
        assert_eq!(rung, 1);
        assert_eq!(ringing_source(&engine), Some(id));
    }

    #[test]
    fn snooze_rerings_after_delay() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));

        let handle = engine.snooze_default(monday(7, 0, 10));
        assert!(handle.is_some());
        assert!(engine.active_alert().is_none());
        assert_eq!(engine.snoozed_until(&id), Some(monday(7, 5, 10)));

        for s in 11..60 {
            engine.tick(monday(7, 0, s));
        }
        assert!(engine.active_alert().is_none());

        engine.tick(monday(7, 5, 10));
        assert_eq!(ringing_source(&engine), Some(id));
        assert_eq!(engine.pending_snoozes(), 0);
    }

    #[test]
    fn wrong_state_commands_are_noops() {
        let mut engine = engine();
        assert!(engine.dismiss(monday(7, 0, 0)).is_none());
        assert_eq!(engine.snooze(Duration::minutes(5), monday(7, 0, 0)), Ok(None));
        assert!(engine.snooze(Duration::zero(), monday(7, 0, 0)).is_err());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn one_shot_alarm_disables_after_firing() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00")).id;
        engine.take_pending_save();

        engine.tick(monday(7, 0, 0));
        assert!(!engine.alarm(&id).unwrap().enabled);
        assert!(engine
            .drain_events()
            .contains(&Event::AlarmAutoDisabled { alarm_id: id.clone() }));
        let saved = engine.take_pending_save().unwrap();
        assert!(!saved[0].enabled);
        // still rings this time
        assert_eq!(ringing_source(&engine), Some(id));
    }

    #[test]
    fn keep_policy_leaves_one_shot_enabled() {
        let mut engine = engine_with(EngineConfig {
            one_shot_policy: OneShotPolicy::Keep,
            ..EngineConfig::default()
        });
        let id = engine.add_alarm(at("07:00")).id;
        engine.tick(monday(7, 0, 0));
        assert!(engine.alarm(&id).unwrap().enabled);
    }

    #[test]
    fn removing_alarm_cancels_snooze() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));
        engine.snooze_default(monday(7, 0, 5));

        engine.remove_alarm(&id).unwrap();
        assert!(engine
            .drain_events()
            .contains(&Event::SnoozeCancelled { source_id: id.clone() }));
        engine.tick(monday(7, 5, 5));
        assert!(engine.active_alert().is_none());
        assert!(matches!(
            engine.remove_alarm(&id),
            Err(ValidationError::UnknownAlarm(_))
        ));
    }

    #[test]
    fn disabling_alarm_cancels_snooze() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));
        engine.snooze_default(monday(7, 0, 5));

        assert!(engine.set_enabled(&id, false).unwrap());
        assert_eq!(engine.pending_snoozes(), 0);
    }

    #[test]
    fn simultaneous_alarms_queue_in_order() {
        let mut engine = engine();
        let first = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        let second = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));

        // newest alarm is listed first, so it is presented first
        assert_eq!(ringing_source(&engine), Some(second.clone()));
        assert_eq!(engine.queued_alerts().count(), 1);

        engine.dismiss(monday(7, 0, 20)).unwrap();
        assert_eq!(ringing_source(&engine), Some(first));
        assert_eq!(engine.queued_alerts().count(), 0);
    }

    #[test]
    fn unacknowledged_alert_expires() {
        let mut engine = engine();
        engine.add_alarm(at("07:00").repeat(Weekday::ALL));
        engine.tick(monday(7, 0, 0));
        engine.tick(monday(7, 1, 59));
        assert!(engine.active_alert().is_some());

        engine.tick(monday(7, 2, 0));
        assert!(engine.active_alert().is_none());
        assert!(engine.drain_events().iter().any(|e| matches!(
            e,
            Event::AlertDismissed {
                reason: DismissReason::Expired,
                ..
            }
        )));
    }

    #[test]
    fn countdown_completion_rings_timer_alert() {
        let mut engine = engine();
        engine.start_countdown(Duration::seconds(3), monday(9, 0, 0)).unwrap();
        for s in 1..=3 {
            engine.tick(monday(9, 0, s));
        }
        let alert = engine.active_alert().unwrap();
        assert_eq!(alert.event.origin, TriggerOrigin::Countdown);
        assert_eq!(alert.event.sound_id, engine.config().countdown_sound);
        assert_eq!(engine.countdown().state(), SessionState::Idle);
    }

    #[test]
    fn test_trigger_uses_alarm_details() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").label("Gym").sound("bell.mp3")).id;
        let event = engine.trigger_test(Some(&id), monday(12, 0, 0)).unwrap();
        assert_eq!(event.origin, TriggerOrigin::Test);
        assert_eq!(event.label, "Gym");
        assert_eq!(event.sound_id, "bell.mp3");
        assert!(engine.trigger_test(Some("missing"), monday(12, 0, 0)).is_err());
    }

    #[test]
    fn shutdown_drops_everything_once() {
        let mut engine = engine();
        engine.add_alarm(at("07:00").repeat(Weekday::ALL));
        engine.add_alarm(at("07:00").repeat(Weekday::ALL));
        engine.tick(monday(7, 0, 0));
        engine.drain_events();

        engine.shutdown(monday(7, 0, 30));
        assert!(engine.active_alert().is_none());
        assert_eq!(engine.queued_alerts().count(), 0);
        assert_eq!(engine.drain_events().len(), 1);

        engine.shutdown(monday(7, 0, 31));
        assert!(engine.drain_events().is_empty());
        engine.tick(monday(7, 0, 40));
        assert!(engine.active_alert().is_none());
    }

    #[test]
    fn next_alarm_skips_disabled() {
        let mut engine = engine();
        let store = MemoryStore::with_records(vec![
            json!({"id": "early", "time": "06:00", "enabled": false}),
            json!({"id": "late", "time": "08:00"}),
        ]);
        assert_eq!(engine.load(&store), 2);
        let (alarm, when) = engine.next_alarm(monday(5, 0, 0)).unwrap();
        assert_eq!(alarm.id, "late");
        assert_eq!(when, monday(8, 0, 0));
    }

    #[test]
    fn out_of_range_snooze_is_rejected_and_keeps_ringing() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));

        assert!(matches!(
            engine.snooze(Duration::MAX, monday(7, 0, 5)),
            Err(ValidationError::DurationOutOfRange { .. })
        ));
        assert_eq!(ringing_source(&engine), Some(id));
        assert_eq!(engine.pending_snoozes(), 0);
        assert!(engine.snooze_default(monday(7, 0, 6)).is_some());
    }

    #[test]
    fn relabel_during_ringing_minute_does_not_refire() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));
        engine.update_alarm(&id, at("07:00").label("Renamed")).unwrap();

        for s in 1..60 {
            engine.tick(monday(7, 0, s));
        }
        let rung = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Event::AlertRinging { .. }))
            .count();
        assert_eq!(rung, 1);
        assert_eq!(engine.queued_alerts().count(), 0);
    }

    #[test]
    fn moving_alarm_clears_cooldown() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));
        engine.dismiss(monday(7, 0, 30)).unwrap();

        engine.update_alarm(&id, at("07:01").repeat(Weekday::ALL)).unwrap();
        engine.tick(monday(7, 1, 0));
        assert_eq!(ringing_source(&engine), Some(id));
    }

    #[test]
    fn toggling_off_cancels_snooze() {
        let mut engine = engine();
        let id = engine.add_alarm(at("07:00").repeat(Weekday::ALL)).id;
        engine.tick(monday(7, 0, 0));
        engine.snooze_default(monday(7, 0, 5));

        assert!(!engine.toggle_alarm(&id).unwrap());
        assert_eq!(engine.pending_snoozes(), 0);
        assert!(engine.toggle_alarm(&id).unwrap());
        assert!(engine.toggle_alarm("missing").is_err());
    }
}
