use axum::{extract::State, Extension, Json};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::ChatRequest;
use crate::error::AppResult;
use crate::models::chat::ChatMessage;
use crate::AppState;

pub async fn ask(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatMessage>> {
    body.validate()?;
    Ok(Json(state.chat.ask(auth_user.id, &body.question).await?))
}

pub async fn history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    Ok(Json(state.chat.history(auth_user.id).await?))
}
