use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::alert::{AlertState, DeliveryMode};
use crate::timer::SessionState;

/// Where a trigger came from. Selects the delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerOrigin {
    /// A scheduled alarm matched.
    Alarm,
    /// The countdown reached zero.
    Countdown,
    /// The user asked for a test alert.
    Test,
}

/// An alert condition has been met. Consumed by the alert pipeline exactly
/// once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Alarm id, or a synthesized id for timer and test triggers.
    pub source_id: String,
    pub origin: TriggerOrigin,
    pub label: String,
    pub sound_id: String,
    pub fired_at: NaiveDateTime,
}

/// Why an alert left the slot without being snoozed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissReason {
    User,
    Expired,
    Shutdown,
}

/// Every observable state change produces an Event.
/// The runtime publishes them; UIs subscribe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    AlertRinging {
        event: TriggerEvent,
        mode: DeliveryMode,
        expires_at: NaiveDateTime,
    },
    /// Slot was occupied; the trigger waits its turn.
    AlertQueued {
        event: TriggerEvent,
        queue_len: usize,
    },
    AlertDismissed {
        event: TriggerEvent,
        reason: DismissReason,
        at: NaiveDateTime,
    },
    AlertSnoozed {
        event: TriggerEvent,
        state: AlertState,
        until: NaiveDateTime,
    },
    SnoozeCancelled {
        source_id: String,
    },
    AlarmAutoDisabled {
        alarm_id: String,
    },
    CountdownChanged {
        state: SessionState,
        remaining_ms: u64,
        at: NaiveDateTime,
    },
    StopwatchChanged {
        state: SessionState,
        elapsed_ms: u64,
        laps: usize,
        at: NaiveDateTime,
    },
}
