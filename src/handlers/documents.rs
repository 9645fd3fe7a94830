use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::dto::DeleteResponse;
use crate::error::{AppError, AppResult};
use crate::models::document::{DocumentDetail, ExtractedDocument};
use crate::AppState;

/// Multipart upload with a single `file` part.
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ExtractedDocument>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("No file provided".into()))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::Validation(format!(
            "File too large. Maximum {}MB",
            state.config.max_upload_bytes / (1024 * 1024)
        )));
    }

    tracing::info!(user_id = %auth_user.id, file_name = %file_name, size = bytes.len(), "Document upload received");

    let document = state
        .documents
        .process(auth_user.id, &file_name, &bytes)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ExtractedDocument>>> {
    Ok(Json(state.documents.list(auth_user.id).await?))
}

pub async fn get_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DocumentDetail>> {
    let document = state.documents.get(auth_user.id, id).await?;
    Ok(Json(document.into()))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    state.documents.delete(auth_user.id, id).await?;
    tracing::info!(user_id = %auth_user.id, document_id = %id, "Document deleted");
    Ok(Json(DeleteResponse { deleted: true, id }))
}
