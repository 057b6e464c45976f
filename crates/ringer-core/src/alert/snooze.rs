//! Deferred re-delivery of snoozed alerts.
//!
//! One pending job per source. Arming again for a source that already has
//! a job replaces it, so repeated snoozes never stack.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::events::TriggerEvent;

/// Cancel handle for an armed snooze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(u64);

#[derive(Debug, Clone)]
struct PendingSnooze {
    handle: JobHandle,
    event: TriggerEvent,
    due_at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct SnoozeScheduler {
    /// Pending jobs by source id.
    pending: HashMap<String, PendingSnooze>,
    next_handle: u64,
}

impl SnoozeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to be re-accepted `delay` after `now`.
    pub fn arm(&mut self, event: TriggerEvent, delay: Duration, now: NaiveDateTime) -> JobHandle {
        self.next_handle += 1;
        let handle = JobHandle(self.next_handle);
        let due_at = now.checked_add_signed(delay).unwrap_or(NaiveDateTime::MAX);
        let source_id = event.source_id.clone();
        if let Some(previous) = self.pending.insert(
            source_id.clone(),
            PendingSnooze {
                handle,
                event,
                due_at,
            },
        ) {
            tracing::debug!(%source_id, replaced = %previous.due_at, "snooze re-armed");
        }
        tracing::debug!(%source_id, %due_at, "snooze armed");
        handle
    }

    /// Cancel one job. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: JobHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|_, job| job.handle != handle);
        self.pending.len() != before
    }

    /// Cancel whatever is pending for `source_id`.
    pub fn cancel_all(&mut self, source_id: &str) -> bool {
        self.pending.remove(source_id).is_some()
    }

    /// Remove and return every job due at `now`, earliest first.
    /// Each returned event carries `now` as its new fire time.
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<TriggerEvent> {
        let mut ready = Vec::new();
        self.pending.retain(|_, job| {
            if job.due_at <= now {
                ready.push(job.clone());
                false
            } else {
                true
            }
        });
        ready.sort_by_key(|job| (job.due_at, job.handle.0));
        ready
            .into_iter()
            .map(|job| TriggerEvent {
                fired_at: now,
                ..job.event
            })
            .collect()
    }

    pub fn pending_until(&self, source_id: &str) -> Option<NaiveDateTime> {
        self.pending.get(source_id).map(|job| job.due_at)
    }

    pub fn next_due(&self) -> Option<NaiveDateTime> {
        self.pending.values().map(|job| job.due_at).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
