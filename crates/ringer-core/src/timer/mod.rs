mod countdown;
mod format;
mod stopwatch;

pub use countdown::Countdown;
pub use format::{format_countdown, format_stopwatch};
pub use stopwatch::Stopwatch;

use serde::{Deserialize, Serialize};

/// Shared session state machine:
///
/// ```text
/// Idle -> Running <-> Paused -> Idle (reset)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Milliseconds between two wall-clock readings; zero if the clock went
/// backwards.
fn elapsed_ms(from: chrono::NaiveDateTime, to: chrono::NaiveDateTime) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}
