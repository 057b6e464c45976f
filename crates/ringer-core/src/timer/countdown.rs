//! Countdown session.
//!
//! Counts a configured duration down to zero. On completion it stops
//! itself and yields a synthetic [`TriggerEvent`] so timer alerts go
//! through the same pipeline as scheduled alarms.
//!
//! ## Usage
//!
//! ```ignore
//! let mut countdown = Countdown::new("alarm301729.mp3");
//! countdown.start(Duration::minutes(5), now)?;
//! // Once per second:
//! if let Some(trigger) = countdown.tick(now) {
//!     pipeline.accept(trigger, now);
//! }
//! ```

use chrono::{Duration, NaiveDateTime};

use super::{elapsed_ms, SessionState};
use crate::error::ValidationError;
use crate::events::{Event, TriggerEvent, TriggerOrigin};

#[derive(Debug, Clone)]
pub struct Countdown {
    state: SessionState,
    /// Duration given to the last `start` from Idle.
    configured_ms: u64,
    remaining_ms: u64,
    last_tick: Option<NaiveDateTime>,
    sound_id: String,
}

impl Countdown {
    /// Quick-pick durations offered to the user, in minutes.
    pub const PRESETS_MIN: [u64; 3] = [5, 10, 25];

    /// `sound_id` is used for the completion alert.
    pub fn new(sound_id: impl Into<String>) -> Self {
        Self {
            state: SessionState::Idle,
            configured_ms: 0,
            remaining_ms: 0,
            last_tick: None,
            sound_id: sound_id.into(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn configured_ms(&self) -> u64 {
        self.configured_ms
    }

    pub fn remaining_display(&self) -> String {
        super::format_countdown(self.remaining_ms)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new countdown from Idle, or resume a paused one (the
    /// duration is then ignored). No-op while running.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDuration`] when starting from
    /// Idle with a zero or negative duration; state is left unchanged.
    pub fn start(
        &mut self,
        duration: Duration,
        now: NaiveDateTime,
    ) -> Result<Option<Event>, ValidationError> {
        match self.state {
            SessionState::Running => Ok(None),
            SessionState::Paused => Ok(self.resume(now)),
            SessionState::Idle => {
                let millis = duration.num_milliseconds();
                let configured = u64::try_from(millis)
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or(ValidationError::NonPositiveDuration { millis })?;
                self.configured_ms = configured;
                self.remaining_ms = configured;
                self.state = SessionState::Running;
                self.last_tick = Some(now);
                tracing::debug!(duration_ms = configured, "countdown started");
                Ok(Some(self.changed(now)))
            }
        }
    }

    pub fn pause(&mut self, now: NaiveDateTime) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }
        self.flush_elapsed(now);
        self.state = SessionState::Paused;
        self.last_tick = None;
        Some(self.changed(now))
    }

    pub fn resume(&mut self, now: NaiveDateTime) -> Option<Event> {
        if self.state != SessionState::Paused {
            return None;
        }
        self.state = SessionState::Running;
        self.last_tick = Some(now);
        Some(self.changed(now))
    }

    pub fn reset(&mut self, now: NaiveDateTime) -> Option<Event> {
        self.state = SessionState::Idle;
        self.remaining_ms = 0;
        self.last_tick = None;
        Some(self.changed(now))
    }

    /// Call periodically. Returns the completion trigger exactly once, when
    /// the remaining time reaches zero; the session is Idle afterwards.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<TriggerEvent> {
        if self.state != SessionState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms > 0 {
            return None;
        }

        self.state = SessionState::Idle;
        self.last_tick = None;
        let label = format!("Time's up ({})", duration_label(self.configured_ms));
        tracing::info!(%label, "countdown finished");
        Some(TriggerEvent {
            source_id: format!("timer-{}", now.and_utc().timestamp_millis()),
            origin: TriggerOrigin::Countdown,
            label,
            sound_id: self.sound_id.clone(),
            fired_at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: NaiveDateTime) {
        if let Some(last) = self.last_tick {
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms(last, now));
            self.last_tick = Some(last.max(now));
        }
    }

    fn changed(&self, at: NaiveDateTime) -> Event {
        Event::CountdownChanged {
            state: self.state,
            remaining_ms: self.remaining_ms,
            at,
        }
    }
}

/// `M:SS` of the configured duration.
fn duration_label(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
