pub mod messages;
pub mod models;
pub mod registry;
pub mod sweeper;

pub use messages::MessageStore;
pub use models::{Message, MessageKind, Participant, BROADCAST};
pub use registry::ParticipantRegistry;
pub use sweeper::PresenceSweeper;

use chrono::{Local, Utc};

/// Milliseconds since the epoch, the unit `lastSeen` is kept in.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Wall-clock send time in the `HH:mm:ss` form messages carry.
pub(crate) fn wall_clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
