//! Room Repository Implementation
//!
//! PostgreSQL implementation of the RoomRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Room, RoomRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: String,
    created_by: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl RoomRow {
    fn into_room(self) -> Room {
        Room {
            id: self.id,
            created_by: self.created_by,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL room repository implementation.
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, created_by, password_hash, created_at
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoomRow::into_room))
    }

    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create(&self, room: &Room) -> Result<Room, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            INSERT INTO rooms (id, created_by, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_by, password_hash, created_at
            "#,
        )
        .bind(&room.id)
        .bind(&room.created_by)
        .bind(&room.password_hash)
        .bind(room.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Room code already taken".to_string())
            }
            _ => AppError::Database(e),
        })?;

        // Creator is the first member, with no heartbeat yet
        sqlx::query(
            r#"
            INSERT INTO room_members (room_id, user_id, joined_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (room_id, user_id) DO NOTHING
            "#,
        )
        .bind(&room.id)
        .bind(&room.created_by)
        .bind(room.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_room())
    }
}
