//! Stats Service
//!
//! Room statistics over a period: per-member totals, app breakdowns and
//! today's hourly histogram, plus the room-wide app ranking.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::services::{aggregate_room, AppTotal, MemberActivity, MemberPresence};
use crate::domain::{
    ActivityLogRepository, MemberRepository, RoomRepository, StatsPeriod, TimeWindow,
};
use crate::infrastructure::metrics;
use crate::shared::clock::Clock;
use crate::shared::error::AppError;

/// Statistics of one member: live presence plus aggregated activity.
#[derive(Debug, Clone)]
pub struct MemberStats {
    pub presence: MemberPresence,
    pub activity: MemberActivity,
}

/// Statistics of a room for one period.
#[derive(Debug, Clone)]
pub struct RoomStats {
    pub room_id: String,
    pub period: StatsPeriod,
    pub members: Vec<MemberStats>,
    pub top_apps: Vec<AppTotal>,
    pub generated_at: DateTime<Utc>,
}

/// Stats service errors
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Not a member of this room")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::RoomNotFound => AppError::NotFound(err.to_string()),
            StatsError::Forbidden => AppError::Forbidden(err.to_string()),
            StatsError::Store(e) => e,
        }
    }
}

/// Stats service trait
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Aggregate a room's activity.
    ///
    /// When `requester` is given it must be a member of the room.
    async fn room_stats(
        &self,
        room_id: &str,
        requester: Option<&str>,
        period: StatsPeriod,
    ) -> Result<RoomStats, StatsError>;
}

/// StatsService implementation
pub struct StatsServiceImpl<R, M, A>
where
    R: RoomRepository + ?Sized,
    M: MemberRepository + ?Sized,
    A: ActivityLogRepository + ?Sized,
{
    room_repo: Arc<R>,
    member_repo: Arc<M>,
    activity_repo: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<R, M, A> StatsServiceImpl<R, M, A>
where
    R: RoomRepository + ?Sized,
    M: MemberRepository + ?Sized,
    A: ActivityLogRepository + ?Sized,
{
    pub fn new(
        room_repo: Arc<R>,
        member_repo: Arc<M>,
        activity_repo: Arc<A>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            room_repo,
            member_repo,
            activity_repo,
            clock,
        }
    }
}

#[async_trait]
impl<R, M, A> StatsService for StatsServiceImpl<R, M, A>
where
    R: RoomRepository + ?Sized + 'static,
    M: MemberRepository + ?Sized + 'static,
    A: ActivityLogRepository + ?Sized + 'static,
{
    #[tracing::instrument(skip(self))]
    async fn room_stats(
        &self,
        room_id: &str,
        requester: Option<&str>,
        period: StatsPeriod,
    ) -> Result<RoomStats, StatsError> {
        let started = Instant::now();

        if !self.room_repo.exists(room_id).await? {
            return Err(StatsError::RoomNotFound);
        }

        let members = self.member_repo.find_by_room(room_id).await?;
        if let Some(user_id) = requester {
            if !members.iter().any(|m| m.user_id == user_id) {
                return Err(StatsError::Forbidden);
            }
        }

        let now = self.clock.now();
        let app_usage = self
            .activity_repo
            .app_usage(room_id, period.window(now))
            .await?;
        let hourly_usage = self
            .activity_repo
            .hourly_usage(room_id, TimeWindow::today(now))
            .await?;

        let member_ids: Vec<&str> = members.iter().map(|m| m.user_id.as_str()).collect();
        let activity = aggregate_room(&member_ids, &app_usage, &hourly_usage);

        let members: Vec<MemberStats> = activity
            .members
            .into_iter()
            .filter_map(|activity| {
                members
                    .iter()
                    .find(|m| m.user_id == activity.user_id)
                    .map(|member| MemberStats {
                        presence: MemberPresence::from_member(member, now),
                        activity,
                    })
            })
            .collect();

        metrics::observe_stats_duration(period.as_str(), started.elapsed().as_secs_f64());

        Ok(RoomStats {
            room_id: room_id.to_string(),
            period,
            members,
            top_apps: activity.top_apps,
            generated_at: now,
        })
    }
}
