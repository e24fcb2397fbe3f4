//! # Domain Services
//!
//! Pure business rules operating on domain entities.
//!
//! - **presence**: online/offline derivation and focus-mode redaction
//! - **aggregation**: activity-log roll-ups into room statistics

pub mod aggregation;
pub mod presence;

pub use aggregation::{
    aggregate_room, empty_histogram, hour_key, AppTotal, HourlyHistogram, MemberActivity,
    RoomActivity, TOP_APPS_LIMIT,
};
pub use presence::{
    is_online, offline_threshold, room_presence, MemberPresence, OFFLINE_THRESHOLD_SECS,
};
