//! Presence Engine
//!
//! Derives each member's online status and visible activity from stored
//! liveness records. Online status is never persisted: it is recomputed from
//! `last_seen` against the reference instant on every read, so a crash or a
//! missed heartbeat can never leave a stale "online" flag behind.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::domain::entities::RoomMember;

/// Seconds without a heartbeat after which a member is offline.
pub const OFFLINE_THRESHOLD_SECS: i64 = 15;

/// [`OFFLINE_THRESHOLD_SECS`] as a duration.
pub fn offline_threshold() -> TimeDelta {
    TimeDelta::seconds(OFFLINE_THRESHOLD_SECS)
}

/// Whether a member last seen at `last_seen` is online at `now`.
///
/// Strict comparison: a member seen exactly one threshold ago is offline.
/// A member that never sent a heartbeat is offline.
pub fn is_online(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_seen {
        Some(seen) => now.signed_duration_since(seen) < offline_threshold(),
        None => false,
    }
}

/// What other members may see of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPresence {
    pub user_id: String,
    pub avatar_path: Option<String>,
    pub name: Option<String>,
    pub is_online: bool,

    /// Present only while online and not in focus mode
    pub active_app: Option<String>,

    pub focus_mode: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

impl MemberPresence {
    pub fn from_member(member: &RoomMember, now: DateTime<Utc>) -> Self {
        let is_online = is_online(member.last_seen, now);
        let active_app = if is_online && !member.focus_mode {
            member.active_app.clone()
        } else {
            None
        };

        Self {
            user_id: member.user_id.clone(),
            avatar_path: member.avatar_path.clone(),
            name: member.name.clone(),
            is_online,
            active_app,
            focus_mode: member.focus_mode,
            last_seen: member.last_seen,
        }
    }
}

/// Materialize the presence view of a room, preserving member order.
pub fn room_presence(members: &[RoomMember], now: DateTime<Utc>) -> Vec<MemberPresence> {
    members
        .iter()
        .map(|member| MemberPresence::from_member(member, now))
        .collect()
}
