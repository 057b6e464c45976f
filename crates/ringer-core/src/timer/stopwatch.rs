//! Stopwatch session.
//!
//! Like the countdown it is driven by the caller: `tick(now)` folds the
//! wall-clock delta since the previous reading into the elapsed total.
//! Ordering matters here, not precision; the reference cadence is 10 ms.

use chrono::NaiveDateTime;

use super::{elapsed_ms, SessionState};
use crate::events::Event;

#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    state: SessionState,
    elapsed_ms: u64,
    /// Elapsed value at each lap, append-only.
    laps: Vec<u64>,
    last_tick: Option<NaiveDateTime>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    pub fn display(&self) -> String {
        super::format_stopwatch(self.elapsed_ms)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: NaiveDateTime) -> Option<Event> {
        if self.state == SessionState::Running {
            return None;
        }
        self.state = SessionState::Running;
        self.last_tick = Some(now);
        Some(self.changed(now))
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

    pub fn reset(&mut self, now: NaiveDateTime) -> Option<Event> {
        self.state = SessionState::Idle;
        self.elapsed_ms = 0;
        self.laps.clear();
        self.last_tick = None;
        Some(self.changed(now))
    }

    /// Record a lap. No-op unless running.
    pub fn lap(&mut self, now: NaiveDateTime) -> Option<u64> {
        if self.state != SessionState::Running {
            return None;
        }
        self.flush_elapsed(now);
        self.laps.push(self.elapsed_ms);
        Some(self.elapsed_ms)
    }

    /// Call periodically while running. Returns the elapsed total.
    pub fn tick(&mut self, now: NaiveDateTime) -> u64 {
        if self.state == SessionState::Running {
            self.flush_elapsed(now);
        }
        self.elapsed_ms
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: NaiveDateTime) {
        if let Some(last) = self.last_tick {
            self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms(last, now));
            // Never move the reading backwards, or a skewed clock would
            // count the same interval twice.
            self.last_tick = Some(last.max(now));
        }
    }

    fn changed(&self, at: NaiveDateTime) -> Event {
        Event::StopwatchChanged {
            state: self.state,
            elapsed_ms: self.elapsed_ms,
            laps: self.laps.len(),
            at,
        }
    }
}
