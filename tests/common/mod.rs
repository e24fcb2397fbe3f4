//! Common Test Utilities
//!
//! In-memory repositories, a manually advanced clock and a scripted identity
//! provider, wired into the real router through [`TestApp`].

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;

use room_presence::config::{
    AvatarSettings, CorsSettings, DatabaseSettings, IdentitySettings, ServerSettings, Settings,
};
use room_presence::domain::{
    AccountErasure, ActivityEntry, ActivityLogRepository, AppUsage, HeartbeatUpdate, HourlyUsage, IdentityError,
    IdentityProvider, MemberRepository, Room, RoomMember, RoomRepository, TimeWindow, User,
    UserRepository, VerifiedIdentity,
};
use room_presence::infrastructure::repositories::Repositories;
use room_presence::infrastructure::storage::LocalAvatarStore;
use room_presence::shared::clock::Clock;
use room_presence::shared::error::AppError;
use room_presence::startup::{build_router, AppState};

/// ID tokens accepted by [`ScriptedIdentityProvider`] start with this.
pub const VALID_TOKEN_PREFIX: &str = "valid:";

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock() += TimeDelta::seconds(secs);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    rooms: Vec<Room>,
    members: Vec<RoomMember>,
    activity: Vec<ActivityEntry>,
}

/// In-memory stand-in for the PostgreSQL repositories.
///
/// One lock guards every table, so each call is atomic like its
/// transactional counterpart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Every activity row, in append order.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.tables.lock().activity.clone()
    }
}

impl Tables {
    fn room_members(&self, room_id: &str) -> Vec<RoomMember> {
        let mut members: Vec<RoomMember> = self
            .members
            .iter()
            .filter(|m| m.room_id == room_id)
            .map(|m| {
                let user = self.users.iter().find(|u| u.id == m.user_id);
                RoomMember {
                    avatar_path: user.and_then(|u| u.avatar_path.clone()),
                    name: user.and_then(|u| u.name.clone()),
                    ..m.clone()
                }
            })
            .collect();
        members.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        members
    }

    fn in_window<'a>(
        &'a self,
        room_id: &'a str,
        window: TimeWindow,
    ) -> impl Iterator<Item = &'a ActivityEntry> + 'a {
        self.activity
            .iter()
            .filter(move |e| e.room_id == room_id && window.contains(e.created_at))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_device_id(&self, device_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.device_id == device_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut tables = self.tables.lock();
        let taken = tables.users.iter().any(|u| {
            u.id == user.id
                || u.device_id == user.device_id
                || (user.email.is_some() && u.email == user.email)
        });
        if taken {
            return Err(AppError::Conflict("User already exists".into()));
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut tables = self.tables.lock();
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.name = user.name.clone();
        stored.avatar_path = user.avatar_path.clone();
        Ok(stored.clone())
    }

    async fn erase(
        &self,
        id: &str,
        anonymous_id: &str,
    ) -> Result<Option<AccountErasure>, AppError> {
        let mut tables = self.tables.lock();
        if !tables.users.iter().any(|u| u.id == id) {
            return Ok(None);
        }

        let before = tables.members.len();
        tables.members.retain(|m| m.user_id != id);
        let memberships = (before - tables.members.len()) as u64;

        let mut anonymized = 0;
        for entry in tables.activity.iter_mut().filter(|e| e.user_id == id) {
            entry.user_id = anonymous_id.to_string();
            anonymized += 1;
        }

        tables.users.retain(|u| u.id != id);
        Ok(Some(AccountErasure {
            memberships,
            anonymized,
        }))
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, AppError> {
        Ok(self.tables.lock().rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.tables.lock().rooms.iter().any(|r| r.id == id))
    }

    async fn create(&self, room: &Room) -> Result<Room, AppError> {
        let mut tables = self.tables.lock();
        if tables.rooms.iter().any(|r| r.id == room.id) {
            return Err(AppError::Conflict("Room code already taken".into()));
        }
        tables.rooms.push(room.clone());
        tables.members.push(RoomMember::joined(
            &room.id,
            &room.created_by,
            room.created_at,
        ));
        Ok(room.clone())
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn find_by_room(&self, room_id: &str) -> Result<Vec<RoomMember>, AppError> {
        Ok(self.tables.lock().room_members(room_id))
    }

    async fn is_member(&self, room_id: &str, user_id: &str) -> Result<bool, AppError> {
        Ok(self
            .tables
            .lock()
            .members
            .iter()
            .any(|m| m.room_id == room_id && m.user_id == user_id))
    }

    async fn add(&self, member: &RoomMember) -> Result<bool, AppError> {
        let mut tables = self.tables.lock();
        let known = tables.rooms.iter().any(|r| r.id == member.room_id)
            && tables.users.iter().any(|u| u.id == member.user_id);
        if !known {
            return Err(AppError::NotFound("Room or user not found".into()));
        }
        if tables
            .members
            .iter()
            .any(|m| m.room_id == member.room_id && m.user_id == member.user_id)
        {
            return Ok(false);
        }
        tables.members.push(member.clone());
        Ok(true)
    }

    async fn remove(&self, room_id: &str, user_id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.lock();
        let before = tables.members.len();
        tables
            .members
            .retain(|m| !(m.room_id == room_id && m.user_id == user_id));
        Ok(tables.members.len() < before)
    }

    async fn apply_heartbeat(
        &self,
        update: &HeartbeatUpdate,
    ) -> Result<Option<Vec<RoomMember>>, AppError> {
        let mut tables = self.tables.lock();
        let Some(member) = tables
            .members
            .iter_mut()
            .find(|m| m.room_id == update.room_id && m.user_id == update.user_id)
        else {
            return Ok(None);
        };

        member.apply(update);

        if let Some(sample) = &update.sample {
            let id = tables.activity.len() as i64 + 1;
            tables.activity.push(ActivityEntry {
                id,
                room_id: update.room_id.clone(),
                user_id: update.user_id.clone(),
                app_name: sample.app_name.clone(),
                duration_secs: sample.duration_secs,
                created_at: update.seen_at,
            });
        }

        Ok(Some(tables.room_members(&update.room_id)))
    }
}

#[async_trait]
impl ActivityLogRepository for MemoryStore {
    async fn app_usage(&self, room_id: &str, window: TimeWindow) -> Result<Vec<AppUsage>, AppError> {
        let tables = self.tables.lock();
        let mut usage: Vec<AppUsage> = Vec::new();
        for entry in tables.in_window(room_id, window) {
            match usage
                .iter_mut()
                .find(|u| u.user_id == entry.user_id && u.app_name == entry.app_name)
            {
                Some(group) => group.total_seconds += i64::from(entry.duration_secs),
                None => usage.push(AppUsage {
                    user_id: entry.user_id.clone(),
                    app_name: entry.app_name.clone(),
                    total_seconds: i64::from(entry.duration_secs),
                }),
            }
        }
        Ok(usage)
    }

    async fn hourly_usage(
        &self,
        room_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<HourlyUsage>, AppError> {
        let tables = self.tables.lock();
        let mut buckets: BTreeMap<(String, u32), i64> = BTreeMap::new();
        for entry in tables.in_window(room_id, window) {
            *buckets
                .entry((entry.user_id.clone(), entry.created_at.hour()))
                .or_default() += i64::from(entry.duration_secs);
        }
        Ok(buckets
            .into_iter()
            .map(|((user_id, hour), total_seconds)| HourlyUsage {
                user_id,
                hour,
                total_seconds,
            })
            .collect())
    }
}

/// Accepts ID tokens of the form `valid:<email>`; rejects everything else.
pub struct ScriptedIdentityProvider;

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let email = id_token
            .strip_prefix(VALID_TOKEN_PREFIX)
            .ok_or_else(|| IdentityError::Rejected("Invalid token".into()))?;

        Ok(VerifiedIdentity {
            subject: Some(format!("sub-{}", email)),
            email: (!email.is_empty()).then(|| email.to_string()),
            name: Some("Ada Lovelace".into()),
            picture_url: Some("https://example.com/ada.png".into()),
        })
    }

    async fn exchange_code(
        &self,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<VerifiedIdentity, IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}

/// 2024-05-01 10:00:00 UTC, mid-morning so a short test never crosses midnight.
pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .single()
        .unwrap()
}

fn test_settings(avatar_dir: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://unused".into(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
            run_migrations: false,
        },
        cors: CorsSettings {
            allowed_origins: Vec::new(),
        },
        avatars: AvatarSettings {
            directory: avatar_dir.to_string(),
            max_bytes: 1024 * 1024,
        },
        identity: IdentitySettings {
            google_client_id: None,
            google_client_secret: None,
            default_redirect_uri: "urn:ietf:wg:oauth:2.0:oob".into(),
            tokeninfo_url: "http://127.0.0.1:9/tokeninfo".into(),
            token_url: "http://127.0.0.1:9/token".into(),
            userinfo_url: "http://127.0.0.1:9/userinfo".into(),
            timeout_secs: 1,
        },
        environment: "test".into(),
    }
}

/// The full router over in-memory state.
pub struct TestApp {
    pub server: TestServer,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub avatar_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let avatar_dir = tempfile::tempdir().unwrap();
        let settings = test_settings(&avatar_dir.path().to_string_lossy());
        let avatars = LocalAvatarStore::new(avatar_dir.path()).await.unwrap();

        let store = Arc::new(MemoryStore::default());
        let clock = Arc::new(ManualClock::new(start_instant()));

        let state = AppState {
            db: None,
            repositories: Repositories {
                users: store.clone(),
                rooms: store.clone(),
                members: store.clone(),
                activity: store.clone(),
            },
            identity: Arc::new(ScriptedIdentityProvider),
            avatars: Arc::new(avatars),
            clock: clock.clone(),
            settings: Arc::new(settings),
        };

        let server = TestServer::new(build_router(state)).unwrap();

        Self {
            server,
            clock,
            store,
            avatar_dir,
        }
    }

    /// Register a device and return the user id.
    pub async fn register(&self, device_id: &str) -> String {
        let response = self
            .server
            .post("/api/v1/users/register")
            .json(&json!({ "deviceId": device_id }))
            .await;
        let body: Value = response.json();
        body["id"].as_str().unwrap().to_string()
    }

    /// Create a room owned by `user_id` and return its code.
    pub async fn create_room(&self, user_id: &str, password: Option<&str>) -> String {
        let response = self
            .server
            .post("/api/v1/rooms/create")
            .json(&json!({ "userId": user_id, "password": password }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["roomId"].as_str().unwrap().to_string()
    }

    pub async fn join(&self, room_id: &str, user_id: &str, password: Option<&str>) -> TestResponse {
        self.server
            .post(&format!("/api/v1/rooms/{}/join", room_id))
            .json(&json!({ "userId": user_id, "password": password }))
            .await
    }

    pub async fn heartbeat(
        &self,
        room_id: &str,
        user_id: &str,
        active_app: Option<&str>,
        focus_mode: bool,
    ) -> TestResponse {
        self.server
            .post(&format!("/api/v1/rooms/{}/heartbeat", room_id))
            .json(&json!({
                "userId": user_id,
                "activeApp": active_app,
                "focusMode": focus_mode,
            }))
            .await
    }

    pub async fn stats(&self, room_id: &str, user_id: &str, period: &str) -> TestResponse {
        self.server
            .get(&format!("/api/v1/rooms/{}/stats", room_id))
            .add_query_param("userId", user_id)
            .add_query_param("period", period)
            .await
    }
}

/// Find a member entry by user id in a `members` array.
pub fn member<'a>(body: &'a Value, user_id: &str) -> &'a Value {
    body["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["userId"] == user_id)
        .unwrap_or_else(|| panic!("member {} missing from {}", user_id, body))
}
