mod delivery;
mod pipeline;
mod snooze;

pub use delivery::{
    AlertDelivery, DeliveryChannel, DeliveryHandle, DeliveryMode, LogDelivery, PermissionProvider,
    StaticPermission,
};
pub use pipeline::{ActiveAlert, AlertPipeline, AlertState};
pub use snooze::{JobHandle, SnoozeScheduler};
