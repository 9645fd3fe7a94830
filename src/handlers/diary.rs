use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::DiaryRequest;
use crate::error::AppResult;
use crate::models::diary::{DiaryDay, DiaryEntry};
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<DiaryRequest>,
) -> AppResult<(StatusCode, Json<DiaryEntry>)> {
    body.validate()?;
    let entry = state.diary.write_entry(auth_user.id, &body.entry).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<DiaryEntry>>> {
    Ok(Json(state.diary.entries(auth_user.id).await?))
}

pub async fn entries_by_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<DiaryDay>>> {
    Ok(Json(state.diary.entries_by_date(auth_user.id).await?))
}
