//! Alert pipeline.
//!
//! Owns the single Active Alert slot. Every trigger, whatever its origin,
//! goes through [`AlertPipeline::accept`]; triggers that arrive while the
//! slot is taken wait in a FIFO queue and are promoted as the slot frees.
//!
//! ## State Transitions
//!
//! ```text
//! (empty) -> Ringing -> Dismissed -> (empty, next promoted)
//!                    -> Snoozed   -> (empty, next promoted)
//! ```
//!
//! Auto-expire is an implicit dismiss. Delivery failures never block the
//! slot: the alert still rings (possibly silently) and can be dismissed.

use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::delivery::{AlertDelivery, DeliveryChannel, DeliveryHandle, DeliveryMode, PermissionProvider};
use crate::error::DeliveryError;
use crate::events::{DismissReason, Event, TriggerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Ringing,
    Snoozed,
    /// Terminal.
    Dismissed,
}

/// The alert currently presented to the user.
#[derive(Debug, Clone)]
pub struct ActiveAlert {
    pub event: TriggerEvent,
    pub state: AlertState,
    pub mode: DeliveryMode,
    pub started_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    handle: Option<DeliveryHandle>,
}

pub struct AlertPipeline {
    delivery: Box<dyn AlertDelivery>,
    permissions: Box<dyn PermissionProvider>,
    slot: Option<ActiveAlert>,
    queue: VecDeque<TriggerEvent>,
    auto_expire: Duration,
    vibration_pattern: Vec<u64>,
    fallback_pattern: Vec<u64>,
    outbox: Vec<Event>,
}

impl std::fmt::Debug for AlertPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertPipeline")
            .field("slot", &self.slot)
            .field("queue", &self.queue)
            .field("auto_expire", &self.auto_expire)
            .finish_non_exhaustive()
    }
}

impl AlertPipeline {
    pub fn new(
        delivery: Box<dyn AlertDelivery>,
        permissions: Box<dyn PermissionProvider>,
        auto_expire: Duration,
    ) -> Self {
        Self {
            delivery,
            permissions,
            slot: None,
            queue: VecDeque::new(),
            auto_expire,
            vibration_pattern: Vec::new(),
            fallback_pattern: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Vibration patterns for normal delivery and for the failure fallback.
    pub fn with_vibration(mut self, pattern: Vec<u64>, fallback: Vec<u64>) -> Self {
        self.vibration_pattern = pattern;
        self.fallback_pattern = fallback;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active(&self) -> Option<&ActiveAlert> {
        self.slot.as_ref()
    }

    pub fn is_ringing(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|alert| alert.state == AlertState::Ringing)
    }

    pub fn queued(&self) -> impl Iterator<Item = &TriggerEvent> {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Take the observer events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Present `event` now, or queue it behind the current alert.
    pub fn accept(&mut self, event: TriggerEvent, now: NaiveDateTime) {
        if self.slot.is_some() {
            tracing::debug!(source_id = %event.source_id, "slot occupied, queueing alert");
            self.queue.push_back(event.clone());
            self.outbox.push(Event::AlertQueued {
                event,
                queue_len: self.queue.len(),
            });
            return;
        }
        self.present(event, now);
    }

    /// Acknowledge the ringing alert. Returns the resolved trigger, or
    /// `None` when nothing is ringing.
    pub fn dismiss(&mut self, now: NaiveDateTime) -> Option<TriggerEvent> {
        if !self.is_ringing() {
            return None;
        }
        self.resolve(DismissReason::User, now)
    }

    /// Silence the ringing alert and hand it back for re-arming after
    /// `delay`. Returns `None` when nothing is ringing.
    pub fn snooze(&mut self, delay: Duration, now: NaiveDateTime) -> Option<TriggerEvent> {
        if !self.is_ringing() {
            return None;
        }
        let mut alert = self.slot.take()?;
        if let Some(handle) = alert.handle.take() {
            self.delivery.cancel(handle);
        }
        alert.state = AlertState::Snoozed;
        let until = now.checked_add_signed(delay).unwrap_or(NaiveDateTime::MAX);
        tracing::info!(source_id = %alert.event.source_id, %until, "alert snoozed");
        self.outbox.push(Event::AlertSnoozed {
            event: alert.event.clone(),
            state: alert.state,
            until,
        });
        self.promote_next(now);
        Some(alert.event)
    }

    /// Expire a ringing alert whose timeout has passed. Returns the
    /// resolved trigger if one expired.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<TriggerEvent> {
        let expired = self
            .slot
            .as_ref()
            .is_some_and(|alert| alert.state == AlertState::Ringing && now >= alert.expires_at);
        if !expired {
            return None;
        }
        self.resolve(DismissReason::Expired, now)
    }

    /// Stop the current delivery and drop everything queued.
    pub fn shutdown(&mut self, now: NaiveDateTime) {
        let dropped = self.queue.len();
        self.queue.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "discarding queued alerts on shutdown");
        }
        if self.slot.is_some() {
            self.resolve(DismissReason::Shutdown, now);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn resolve(&mut self, reason: DismissReason, now: NaiveDateTime) -> Option<TriggerEvent> {
        let mut alert = self.slot.take()?;
        if let Some(handle) = alert.handle.take() {
            self.delivery.cancel(handle);
        }
        alert.state = AlertState::Dismissed;
        tracing::info!(source_id = %alert.event.source_id, ?reason, "alert dismissed");
        self.outbox.push(Event::AlertDismissed {
            event: alert.event.clone(),
            reason,
            at: now,
        });
        if reason != DismissReason::Shutdown {
            self.promote_next(now);
        }
        Some(alert.event)
    }

    fn promote_next(&mut self, now: NaiveDateTime) {
        if let Some(next) = self.queue.pop_front() {
            self.present(next, now);
        }
    }

    fn present(&mut self, event: TriggerEvent, now: NaiveDateTime) {
        let channel = DeliveryChannel::from(event.origin);
        let delivered = self
            .ensure_permission()
            .and_then(|()| self.delivery.deliver(&event, channel, &self.vibration_pattern));
        let (mode, handle) = match delivered {
            Ok(handle) => (DeliveryMode::Full, Some(handle)),
            Err(e) => {
                tracing::warn!(source_id = %event.source_id, error = %e, "alert delivery failed");
                (self.fallback(), None)
            }
        };

        let expires_at = now.checked_add_signed(self.auto_expire).unwrap_or(NaiveDateTime::MAX);
        tracing::info!(source_id = %event.source_id, ?mode, %expires_at, "alert ringing");
        self.outbox.push(Event::AlertRinging {
            event: event.clone(),
            mode,
            expires_at,
        });
        self.slot = Some(ActiveAlert {
            event,
            state: AlertState::Ringing,
            mode,
            started_at: now,
            expires_at,
            handle,
        });
    }

    fn ensure_permission(&mut self) -> Result<(), DeliveryError> {
        if self.permissions.has_notification_permission() || self.permissions.request_permission() {
            Ok(())
        } else {
            Err(DeliveryError::PermissionDenied)
        }
    }

    fn fallback(&mut self) -> DeliveryMode {
        match self.delivery.vibrate(&self.fallback_pattern) {
            Ok(()) => DeliveryMode::VibrationOnly,
            Err(e) => {
                tracing::debug!(error = %e, "vibration fallback unavailable, alert is silent");
                DeliveryMode::Silent
            }
        }
    }
}
