//! # HealthMate: Request/Response DTOs
//!
//! API contract types that are not database models.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Field validation is expressed via `validator` derive macros; checks
//!   across fields (password confirmation) live in helper functions here

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::medical::ConditionsInput;
use crate::models::user::Gender;

// ============================================================================
// Common
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

/// Both password fields must be present and equal, or both absent.
pub fn ensure_passwords_match(password: Option<&str>, confirm: Option<&str>) -> AppResult<()> {
    if password != confirm {
        return Err(AppError::Validation("Passwords do not match".into()));
    }
    Ok(())
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 254, message = "Email too long"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    pub confirm_password: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(range(min = 1, max = 120, message = "Age must be 1-120"))]
    pub age: i32,

    #[serde(default)]
    pub gender: Gender,

    #[validate(length(min = 5, max = 20, message = "Contact number must be 5-20 characters"))]
    pub contact_no: String,

    #[serde(default)]
    pub conditions: ConditionsInput,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ============================================================================
// Profile
// ============================================================================

/// PUT /api/profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(range(min = 1, max = 120, message = "Age must be 1-120"))]
    pub age: i32,

    pub gender: Gender,

    #[validate(length(min = 5, max = 20, message = "Contact number must be 5-20 characters"))]
    pub contact_no: String,

    /// Leave out to keep the current password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: Option<String>,

    pub confirm_password: Option<String>,
}

// ============================================================================
// Chat & Diary
// ============================================================================

/// POST /api/chat
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Question must be 1-4000 characters"))]
    pub question: String,
}

/// POST /api/diary
#[derive(Debug, Deserialize, Validate)]
pub struct DiaryRequest {
    #[validate(length(min = 1, max = 10000, message = "Entry must be 1-10000 characters"))]
    pub entry: String,
}

/// GET /api/mood/trend
#[derive(Debug, Deserialize, Validate)]
pub struct TrendQuery {
    #[validate(range(min = 1, max = 365, message = "window_days must be 1-365"))]
    pub window_days: Option<i64>,
}
