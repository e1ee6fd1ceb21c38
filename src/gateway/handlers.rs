use crate::generation::{GenerateRequest, GenerationFailure, GenerationResult};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use super::AppState;

fn failure_response(failure: &GenerationFailure) -> Response {
    let status = StatusCode::from_u16(failure.step.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(failure.to_json())).into_response()
}

pub(super) fn generation_response(result: &GenerationResult) -> Response {
    match result {
        Ok(success) => (StatusCode::OK, Json(success.to_json())).into_response(),
        Err(failure) => {
            tracing::warn!(step = %failure.step, error = %failure.error, "generation failed");
            failure_response(failure)
        }
    }
}

/// POST /api/generate
pub(super) async fn handle_generate(State(state): State<AppState>, body: Bytes) -> Response {
    let request = GenerateRequest::from_body(&body);
    let result = state.generator.run(request).await;
    generation_response(&result)
}

/// OPTIONS /api/generate: preflight no-op
pub(super) async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on /api/generate
pub(super) async fn handle_method_not_allowed() -> Response {
    failure_response(&GenerationFailure::method_not_allowed())
}

/// GET /health: always public, never echoes the credential
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "ok",
        "credential_configured": state.generator.credential_configured(),
    });
    Json(body)
}
