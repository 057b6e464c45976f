mod cooldown;
mod engine;

pub use cooldown::CooldownRecord;
pub use engine::TriggerEngine;
