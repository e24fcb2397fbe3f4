//! Activity Log Repository Implementation
//!
//! Grouped reads over the append-only `activity_log` table. Sums are
//! computed in SQL and coalesced so an empty group never yields NULL.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{ActivityLogRepository, AppUsage, HourlyUsage, TimeWindow};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AppUsageRow {
    user_id: String,
    app_name: String,
    total_seconds: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct HourlyUsageRow {
    user_id: String,
    hour: i32,
    total_seconds: i64,
}

/// PostgreSQL activity log repository implementation.
#[derive(Clone)]
pub struct PgActivityLogRepository {
    pool: PgPool,
}

impl PgActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogRepository for PgActivityLogRepository {
    async fn app_usage(&self, room_id: &str, window: TimeWindow) -> Result<Vec<AppUsage>, AppError> {
        let rows = sqlx::query_as::<_, AppUsageRow>(
            r#"
            SELECT user_id, app_name, COALESCE(SUM(duration_secs), 0)::INT8 AS total_seconds
            FROM activity_log
            WHERE room_id = $1 AND created_at >= $2 AND created_at <= $3
            GROUP BY user_id, app_name
            ORDER BY MIN(id)
            "#,
        )
        .bind(room_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AppUsage {
                user_id: row.user_id,
                app_name: row.app_name,
                total_seconds: row.total_seconds,
            })
            .collect())
    }

    async fn hourly_usage(
        &self,
        room_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<HourlyUsage>, AppError> {
        let rows = sqlx::query_as::<_, HourlyUsageRow>(
            r#"
            SELECT user_id,
                   EXTRACT(HOUR FROM created_at AT TIME ZONE 'UTC')::INT4 AS hour,
                   COALESCE(SUM(duration_secs), 0)::INT8 AS total_seconds
            FROM activity_log
            WHERE room_id = $1 AND created_at >= $2 AND created_at <= $3
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(room_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                u32::try_from(row.hour).ok().map(|hour| HourlyUsage {
                    user_id: row.user_id,
                    hour,
                    total_seconds: row.total_seconds,
                })
            })
            .collect())
    }
}
