//! Statistics Handler

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::request::StatsQuery;
use crate::application::dto::response::StatsResponse;
use crate::application::services::{StatsService, StatsServiceImpl};
use crate::domain::StatsPeriod;
use crate::presentation::http::extractors::ValidatedQuery;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Activity statistics for a room over `today`, `week` or `all`
pub async fn room_stats(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let period = query
        .period
        .as_deref()
        .map(str::parse::<StatsPeriod>)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?
        .unwrap_or_default();

    let stats_service = StatsServiceImpl::new(
        state.repositories.rooms.clone(),
        state.repositories.members.clone(),
        state.repositories.activity.clone(),
        state.clock.clone(),
    );

    let stats = stats_service
        .room_stats(&room_id, query.user_id.as_deref(), period)
        .await?;

    Ok(Json(stats.into()))
}
