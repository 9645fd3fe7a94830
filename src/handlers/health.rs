use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "healthmate-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready once the database answers. Generator and OCR settings are
/// reported but never probed, since both are called lazily per request.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe: database unreachable");
            "failed"
        }
    };

    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ready" } else { "not_ready" },
            "checks": {
                "database": database,
                "llm_provider": format!("{:?}", state.config.llm_provider).to_lowercase(),
                "ocr_service": state.config.ocr_service_url.is_some(),
            },
        })),
    )
}
