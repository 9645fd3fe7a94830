use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::{create_token_pair, hash_token, verify_token, TokenPair, TokenType},
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::dto::{ensure_passwords_match, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest};
use crate::error::{AppError, AppResult};
use crate::handlers::profile::load_profile;
use crate::models::user::{User, UserProfile};
use crate::AppState;

async fn store_refresh_token(
    db: &sqlx::PgPool,
    user_id: Uuid,
    raw_refresh_token: &str,
    ttl_secs: i64,
    parent_token_id: Option<Uuid>,
) -> AppResult<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, parent_token_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(hash_token(raw_refresh_token))
    .bind(Utc::now() + Duration::seconds(ttl_secs))
    .bind(parent_token_id)
    .execute(db)
    .await?;

    Ok(id)
}

/// Create a token pair AND persist the refresh token hash.
async fn issue_token_pair(
    state: &AppState,
    user_id: Uuid,
    email: &str,
    parent_token_id: Option<Uuid>,
) -> AppResult<TokenPair> {
    let tokens = create_token_pair(user_id, email, &state.config)?;
    store_refresh_token(
        &state.db,
        user_id,
        &tokens.refresh_token,
        state.config.jwt_refresh_ttl_secs,
        parent_token_id,
    )
    .await?;
    Ok(tokens)
}

async fn revoke_all_user_tokens(db: &sqlx::PgPool, user_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = true, revoked_at = NOW()
        WHERE user_id = $1 AND revoked = false
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenPair>)> {
    body.validate()?;
    ensure_passwords_match(Some(&body.password), Some(&body.confirm_password))?;

    let email = body.email.trim().to_lowercase();

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;

    if existing > 0 {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let pwd_hash = hash_password(&body.password)?;
    let user_id = Uuid::new_v4();

    // The account and its conditions land together or not at all.
    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, age, gender, contact_no)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&pwd_hash)
    .bind(body.full_name.trim())
    .bind(body.age)
    .bind(body.gender)
    .bind(body.contact_no.trim())
    .execute(&mut *tx)
    .await?;

    for (name, condition_type) in body.conditions.entries() {
        sqlx::query(
            r#"
            INSERT INTO medical_info (id, user_id, condition_name, condition_type)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&name)
        .bind(condition_type)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(user_id = %user_id, "User registered");

    let tokens = issue_token_pair(&state, user_id, &email, None).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    body.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(body.email.trim().to_lowercase())
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let tokens = issue_token_pair(&state, user.id, &user.email, None).await?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let claims = verify_token(&body.refresh_token, &state.config)?.claims;
    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized);
    }

    let token_hash = hash_token(&body.refresh_token);

    // Consume in one statement so two concurrent refreshes cannot both win.
    let consumed = sqlx::query_as::<_, (Uuid, Uuid)>(
        r#"
        UPDATE refresh_tokens
        SET revoked = true, revoked_at = NOW()
        WHERE token_hash = $1 AND revoked = false AND expires_at > NOW()
        RETURNING id, user_id
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(&state.db)
    .await?;

    let Some((token_id, user_id)) = consumed else {
        // An already-used token coming back means the family has leaked.
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM refresh_tokens WHERE token_hash = $1 AND revoked = true",
        )
        .bind(&token_hash)
        .fetch_optional(&state.db)
        .await?;

        if let Some(owner) = owner {
            tracing::warn!(user_id = %owner, "Refresh token reuse detected, revoking every session");
            revoke_all_user_tokens(&state.db, owner).await?;
        }
        return Err(AppError::Unauthorized);
    };

    if user_id != claims.sub {
        return Err(AppError::Unauthorized);
    }

    let tokens = issue_token_pair(&state, user_id, &claims.email, Some(token_id)).await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MessageResponse>> {
    revoke_all_user_tokens(&state.db, auth_user.id).await?;
    tracing::info!(user_id = %auth_user.id, email = %auth_user.email, "User logged out");
    Ok(Json(MessageResponse {
        message: "Logged out successfully".into(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(load_profile(&state, auth_user.id).await?))
}
