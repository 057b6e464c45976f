//! Delivery collaborators.
//!
//! The engine never talks to a notification API, audio device or vibration
//! motor directly. Platform adapters implement [`AlertDelivery`] and
//! [`PermissionProvider`] and are chosen when the engine is composed: a
//! desktop adapter might show a notification and loop a sound, a mobile one
//! might schedule a local notification and let the OS own playback.

use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::events::{TriggerEvent, TriggerOrigin};

/// Opaque token for a running delivery, used to stop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeliveryHandle(u64);

impl DeliveryHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Notification channel. Timer completions use their own channel so
/// platforms can give them a different sound and importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Alarm,
    Timer,
}

impl From<TriggerOrigin> for DeliveryChannel {
    fn from(origin: TriggerOrigin) -> Self {
        match origin {
            TriggerOrigin::Countdown => DeliveryChannel::Timer,
            TriggerOrigin::Alarm | TriggerOrigin::Test => DeliveryChannel::Alarm,
        }
    }
}

/// How an alert is actually being presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Sound, vibration and system notification.
    Full,
    /// Delivery failed; only the fallback vibration is running.
    VibrationOnly,
    /// Nothing could be delivered. The alert is still dismissible.
    Silent,
}

/// Platform notification + audio + vibration.
pub trait AlertDelivery: Send {
    /// Start presenting `event`. `vibration` is an on/off pattern in
    /// milliseconds.
    fn deliver(
        &mut self,
        event: &TriggerEvent,
        channel: DeliveryChannel,
        vibration: &[u64],
    ) -> Result<DeliveryHandle, DeliveryError>;

    /// Stop a delivery. Cancelling an unknown or finished handle is a no-op.
    fn cancel(&mut self, handle: DeliveryHandle);

    /// Vibration-only fallback used when `deliver` fails.
    fn vibrate(&mut self, _pattern: &[u64]) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unsupported("vibration"))
    }
}

/// Notification permission state.
pub trait PermissionProvider: Send {
    fn has_notification_permission(&self) -> bool;

    /// Ask the user. Returns whether permission is now granted.
    fn request_permission(&mut self) -> bool;
}

/// Adapter that only logs. Useful headless and as a default.
#[derive(Debug, Default)]
pub struct LogDelivery {
    next_handle: u64,
}

impl LogDelivery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertDelivery for LogDelivery {
    fn deliver(
        &mut self,
        event: &TriggerEvent,
        channel: DeliveryChannel,
        _vibration: &[u64],
    ) -> Result<DeliveryHandle, DeliveryError> {
        self.next_handle += 1;
        tracing::info!(
            source_id = %event.source_id,
            label = %event.label,
            sound = %event.sound_id,
            ?channel,
            handle = self.next_handle,
            "delivering alert"
        );
        Ok(DeliveryHandle::new(self.next_handle))
    }

    fn cancel(&mut self, handle: DeliveryHandle) {
        tracing::info!(handle = handle.id(), "delivery cancelled");
    }
}

/// Fixed permission answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission {
    granted: bool,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl PermissionProvider for StaticPermission {
    fn has_notification_permission(&self) -> bool {
        self.granted
    }

    fn request_permission(&mut self) -> bool {
        self.granted
    }
}
