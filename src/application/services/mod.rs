//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **PresenceService**: heartbeat ingest and room presence
//! - **StatsService**: room activity statistics
//! - **RoomService**: room creation, membership and lookup
//! - **UserService**: registration, avatars, account deletion
//! - **AuthService**: Google sign-in

pub mod auth_service;
pub mod presence_service;
pub mod room_service;
pub mod stats_service;
pub mod user_service;

pub use auth_service::{AuthError, AuthService, AuthServiceImpl, GoogleCredential};
pub use presence_service::{
    normalize_app_name, HeartbeatCommand, HeartbeatOutcome, PresenceError, PresenceService,
    PresenceServiceImpl, MAX_APP_NAME_CHARS,
};
pub use room_service::{
    JoinOutcome, RoomDetails, RoomError, RoomService, RoomServiceImpl, MAX_CODE_ATTEMPTS,
};
pub use stats_service::{MemberStats, RoomStats, StatsError, StatsService, StatsServiceImpl};
pub use user_service::{AvatarFile, UserError, UserService, UserServiceImpl};
