//! Member Repository Implementation
//!
//! PostgreSQL implementation of the MemberRepository trait. Heartbeats are
//! applied in a single transaction that also appends to `activity_log`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

use crate::domain::{HeartbeatUpdate, MemberRepository, RoomMember};
use crate::shared::error::AppError;

const SELECT_ROOM_MEMBERS: &str = r#"
    SELECT rm.room_id, rm.user_id, u.avatar_path, u.name,
           rm.active_app, rm.last_seen, rm.focus_mode, rm.joined_at
    FROM room_members rm
    JOIN users u ON u.id = rm.user_id
    WHERE rm.room_id = $1
    ORDER BY rm.joined_at, rm.user_id
"#;

/// Liveness record joined with the user's profile fields.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    room_id: String,
    user_id: String,
    avatar_path: Option<String>,
    name: Option<String>,
    active_app: Option<String>,
    last_seen: Option<DateTime<Utc>>,
    focus_mode: bool,
    joined_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> RoomMember {
        RoomMember {
            room_id: self.room_id,
            user_id: self.user_id,
            avatar_path: self.avatar_path,
            name: self.name,
            active_app: self.active_app,
            last_seen: self.last_seen,
            focus_mode: self.focus_mode,
            joined_at: self.joined_at,
        }
    }
}

/// PostgreSQL member repository implementation.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn room_members<'e, E>(executor: E, room_id: &str) -> Result<Vec<RoomMember>, AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MemberRow>(SELECT_ROOM_MEMBERS)
            .bind(room_id)
            .fetch_all(executor)
            .await?;

        Ok(rows.into_iter().map(MemberRow::into_member).collect())
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn find_by_room(&self, room_id: &str) -> Result<Vec<RoomMember>, AppError> {
        Self::room_members(&self.pool, room_id).await
    }

    async fn is_member(&self, room_id: &str, user_id: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM room_members WHERE room_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn add(&self, member: &RoomMember) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO room_members (room_id, user_id, active_app, last_seen, focus_mode, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (room_id, user_id) DO NOTHING
            "#,
        )
        .bind(&member.room_id)
        .bind(&member.user_id)
        .bind(&member.active_app)
        .bind(member.last_seen)
        .bind(member.focus_mode)
        .bind(member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("Room or user not found".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, room_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM room_members WHERE room_id = $1 AND user_id = $2")
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_heartbeat(
        &self,
        update: &HeartbeatUpdate,
    ) -> Result<Option<Vec<RoomMember>>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Takes the row lock; concurrent heartbeats of one member serialize here.
        // A heartbeat older than the stored one keeps the newer liveness fields.
        let updated = sqlx::query(
            r#"
            UPDATE room_members
            SET active_app = CASE WHEN last_seen > $4 THEN active_app ELSE $3 END,
                focus_mode = CASE WHEN last_seen > $4 THEN focus_mode ELSE $5 END,
                last_seen = GREATEST(COALESCE(last_seen, $4), $4)
            WHERE room_id = $1 AND user_id = $2
            "#,
        )
        .bind(&update.room_id)
        .bind(&update.user_id)
        .bind(&update.active_app)
        .bind(update.seen_at)
        .bind(update.focus_mode)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(sample) = &update.sample {
            sqlx::query(
                r#"
                INSERT INTO activity_log (room_id, user_id, app_name, duration_secs, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&update.room_id)
            .bind(&update.user_id)
            .bind(&sample.app_name)
            .bind(sample.duration_secs)
            .bind(update.seen_at)
            .execute(&mut *tx)
            .await?;
        }

        let members = Self::room_members(&mut *tx, &update.room_id).await?;
        tx.commit().await?;

        Ok(Some(members))
    }
}
