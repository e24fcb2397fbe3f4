//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - registered users
//! - **RoomRepository** - rooms and their creation
//! - **MemberRepository** - liveness records and heartbeat application
//! - **ActivityLogRepository** - grouped activity reads and anonymization
//!
//! Handlers reach them through [`Repositories`], which holds trait objects
//! so the router can run against any backing store.

pub mod activity_repository;
pub mod member_repository;
pub mod room_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::{ActivityLogRepository, MemberRepository, RoomRepository, UserRepository};

pub use activity_repository::PgActivityLogRepository;
pub use member_repository::PgMemberRepository;
pub use room_repository::PgRoomRepository;
pub use user_repository::PgUserRepository;

/// The set of repositories a request may use.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub activity: Arc<dyn ActivityLogRepository>,
}

impl Repositories {
    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            rooms: Arc::new(PgRoomRepository::new(pool.clone())),
            members: Arc::new(PgMemberRepository::new(pool.clone())),
            activity: Arc::new(PgActivityLogRepository::new(pool)),
        }
    }
}
