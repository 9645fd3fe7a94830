use axum::{extract::State, Extension, Json};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{middleware::AuthUser, password::hash_password};
use crate::dto::{ensure_passwords_match, UpdateProfileRequest};
use crate::error::{AppError, AppResult};
use crate::models::medical::{ConditionsInput, MedicalCondition};
use crate::models::user::{User, UserProfile};
use crate::AppState;

pub(crate) async fn load_profile(state: &AppState, user_id: Uuid) -> AppResult<UserProfile> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let conditions = state.conditions.conditions(user_id).await?;
    Ok(UserProfile::new(user, conditions))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(load_profile(&state, auth_user.id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    body.validate()?;
    ensure_passwords_match(body.new_password.as_deref(), body.confirm_password.as_deref())?;

    let new_hash = body.new_password.as_deref().map(hash_password).transpose()?;

    let updated = sqlx::query(
        r#"
        UPDATE users SET
            full_name = $2,
            age = $3,
            gender = $4,
            contact_no = $5,
            password_hash = COALESCE($6, password_hash),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(auth_user.id)
    .bind(body.full_name.trim())
    .bind(body.age)
    .bind(body.gender)
    .bind(body.contact_no.trim())
    .bind(new_hash.as_deref())
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    tracing::info!(
        user_id = %auth_user.id,
        password_changed = new_hash.is_some(),
        "Profile updated"
    );

    Ok(Json(load_profile(&state, auth_user.id).await?))
}

/// Replace every stored condition with the submitted set.
pub async fn update_conditions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ConditionsInput>,
) -> AppResult<Json<Vec<MedicalCondition>>> {
    let conditions = state
        .conditions
        .replace_conditions(auth_user.id, &body.entries())
        .await?;

    tracing::info!(user_id = %auth_user.id, count = conditions.len(), "Medical conditions replaced");
    Ok(Json(conditions))
}
