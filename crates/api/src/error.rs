use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `catalog_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// HTTP status, machine code and client-facing message for a domain error.
fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    let code = core.kind();
    match core {
        CoreError::Format(msg)
        | CoreError::Range(msg)
        | CoreError::Overlap(msg)
        | CoreError::Gap(msg)
        | CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, code, msg.clone()),
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, code, core.to_string()),
        CoreError::NotAllowed(msg) => (StatusCode::UNPROCESSABLE_ENTITY, code, msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, code, msg.clone()),
        CoreError::ConcurrentWrite { episode_id } => (
            StatusCode::CONFLICT,
            code,
            format!("Episode {episode_id} was modified concurrently, retry the request"),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "An internal error occurred".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
