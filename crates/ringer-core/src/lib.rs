//! # Ringer Core Library
//!
//! Local alarm trigger and alert-delivery engine. Given a list of
//! user-defined alarms, a stopwatch and one countdown, it decides when to
//! alert the user, fires each occurrence exactly once and routes the alert
//! through a platform delivery adapter while letting the user dismiss or
//! snooze it.
//!
//! ## Architecture
//!
//! - **Trigger Engine**: matches the current minute against the schedule,
//!   with a per-alarm cooldown so a once-per-second evaluation fires once
//! - **Alert Pipeline**: a single active-alert slot with a FIFO queue,
//!   auto-expire and a delivery fallback chain
//! - **Snooze Scheduler**: cancelable deferred re-delivery, one job per source
//! - **Session Timers**: wall-clock stopwatch and countdown
//! - **Storage**: JSON alarm list and TOML engine configuration
//!
//! Every component is a caller-driven state machine that takes `now` as an
//! argument. [`AlarmEngine`] composes them; [`runtime::spawn`] drives it
//! from tokio intervals.
//!
//! ## Key Components
//!
//! - [`AlarmEngine`]: owned composition of every component
//! - [`AlarmHandle`]: async command handle to a running engine
//! - [`EngineConfig`]: engine configuration
//! - [`AlertDelivery`]: trait implemented by platform adapters

pub mod alarm;
pub mod alert;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod runtime;
pub mod storage;
pub mod timer;
pub mod trigger;

pub use alarm::{Alarm, NewAlarm, TimeOfDay, Weekday};
pub use alert::{
    ActiveAlert, AlertDelivery, AlertPipeline, AlertState, DeliveryMode, LogDelivery,
    PermissionProvider, SnoozeScheduler, StaticPermission,
};
pub use clock::{AnchoredClock, ClockSource, ManualClock, SystemClock};
pub use engine::AlarmEngine;
pub use error::{ConfigError, CoreError, DeliveryError, StoreError, ValidationError};
pub use events::{DismissReason, Event, TriggerEvent, TriggerOrigin};
pub use runtime::AlarmHandle;
pub use storage::{DurableStore, EngineConfig, JsonFileStore, MemoryStore, OneShotPolicy, ScheduleStore};
pub use timer::{Countdown, SessionState, Stopwatch};
pub use trigger::TriggerEngine;
