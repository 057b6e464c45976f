use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

/// Last fire time per source.
///
/// A source is cooling while less than `window` has passed since it last
/// fired. A clock that runs backwards keeps the source cooling.
#[derive(Debug, Clone)]
pub struct CooldownRecord {
    window: Duration,
    last_fired: HashMap<String, NaiveDateTime>,
}

impl CooldownRecord {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_cooling(&self, source_id: &str, now: NaiveDateTime) -> bool {
        self.last_fired
            .get(source_id)
            .is_some_and(|last| now - *last < self.window)
    }

    /// Record a fire (or an acknowledgement) at `now`. Idempotent.
    pub fn mark(&mut self, source_id: &str, now: NaiveDateTime) {
        self.last_fired.insert(source_id.to_string(), now);
    }

    pub fn last_fired(&self, source_id: &str) -> Option<NaiveDateTime> {
        self.last_fired.get(source_id).copied()
    }

    pub fn forget(&mut self, source_id: &str) {
        self.last_fired.remove(source_id);
    }

    /// Drop entries whose window has fully passed.
    pub fn prune(&mut self, now: NaiveDateTime) {
        let window = self.window;
        self.last_fired.retain(|_, last| now - *last < window);
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}
