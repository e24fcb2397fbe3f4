//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{AccountErasure, User, UserRepository};
use crate::shared::error::AppError;

/// Database row representation of the users table.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    device_id: String,
    email: Option<String>,
    name: Option<String>,
    avatar_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            device_id: self.device_id,
            email: self.email,
            name: self.name,
            avatar_path: self.avatar_path,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column_query: &str, value: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(column_query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        self.find_one(
            r#"
            SELECT id, device_id, email, name, avatar_path, created_at
            FROM users
            WHERE id = $1
            "#,
            id,
        )
        .await
    }

    async fn find_by_device_id(&self, device_id: &str) -> Result<Option<User>, AppError> {
        self.find_one(
            r#"
            SELECT id, device_id, email, name, avatar_path, created_at
            FROM users
            WHERE device_id = $1
            "#,
            device_id,
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_one(
            r#"
            SELECT id, device_id, email, name, avatar_path, created_at
            FROM users
            WHERE email = $1
            "#,
            email,
        )
        .await
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, device_id, email, name, avatar_path, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, device_id, email, name, avatar_path, created_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.device_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar_path)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("User with this device or email already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_user())
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2,
                avatar_path = $3
            WHERE id = $1
            RETURNING id, device_id, email, name, avatar_path, created_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.avatar_path)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(row.into_user())
    }

    async fn erase(
        &self,
        id: &str,
        anonymous_id: &str,
    ) -> Result<Option<AccountErasure>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Waits on the row locks of in-flight heartbeats
        let memberships = sqlx::query("DELETE FROM room_members WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let anonymized = sqlx::query("UPDATE activity_log SET user_id = $2 WHERE user_id = $1")
            .bind(id)
            .bind(anonymous_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(AccountErasure {
            memberships,
            anonymized,
        }))
    }
}
