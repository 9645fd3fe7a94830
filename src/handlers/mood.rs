use axum::{
    extract::{Query, State},
    Extension, Json,
};
use validator::Validate;

use crate::analysis::{MoodSummary, MoodTrend};
use crate::auth::middleware::AuthUser;
use crate::dto::TrendQuery;
use crate::error::AppResult;
use crate::services::diary::MoodAnalytics;
use crate::AppState;

pub async fn analytics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MoodAnalytics>> {
    Ok(Json(state.diary.analytics(auth_user.id).await?))
}

/// Window defaults to `MOOD_WINDOW_DAYS`.
pub async fn trend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<MoodTrend>> {
    query.validate()?;
    let window_days = query.window_days.unwrap_or(state.config.mood_window_days);
    Ok(Json(state.diary.trend(auth_user.id, window_days).await?))
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MoodSummary>> {
    Ok(Json(state.diary.summary(auth_user.id).await?))
}
