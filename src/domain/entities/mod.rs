//! # Domain Entities
//!
//! Core domain entities. Stored entities map to their database tables.
//!
//! - **User**: registered account with optional avatar
//! - **Room**: a shared co-working space, optionally password protected
//! - **RoomMember**: a user's liveness record in a room
//! - **ActivityEntry**: append-only per-heartbeat app usage
//!
//! Each has a repository trait implemented in the infrastructure layer.
//! The avatar blob store and the identity provider are external
//! collaborators described by traits here as well.

mod activity;
mod avatar;
mod identity;
mod member;
mod room;
mod user;

pub use activity::{
    anonymous_token, ActivityEntry, ActivityLogRepository, ActivitySample, AppUsage, HourlyUsage,
    ANONYMOUS_PREFIX, HEARTBEAT_QUANTUM_SECS,
};
pub use avatar::{AvatarFormat, AvatarStore, MAX_AVATAR_BYTES};
pub use identity::{IdentityError, IdentityProvider, VerifiedIdentity};
pub use member::{HeartbeatUpdate, MemberRepository, RoomMember};
pub use room::{Room, RoomRepository};
pub use user::{AccountErasure, User, UserRepository, GOOGLE_DEVICE_PREFIX};

#[cfg(test)]
pub use activity::MockActivityLogRepository;
#[cfg(test)]
pub use avatar::MockAvatarStore;
#[cfg(test)]
pub use identity::MockIdentityProvider;
#[cfg(test)]
pub use member::MockMemberRepository;
#[cfg(test)]
pub use room::MockRoomRepository;
#[cfg(test)]
pub use user::MockUserRepository;
