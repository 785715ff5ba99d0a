use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use agrobase_core::DomainError;
use agrobase_infra::ServiceError;

use crate::app::dto::FieldError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Repository(e) => {
            tracing::error!("repository failure: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::InvalidDocument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_document", msg)
        }
        DomainError::DuplicateDocument(msg) => {
            json_error(StatusCode::CONFLICT, "duplicate_document", msg)
        }
        DomainError::AreaExceeded(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "area_exceeded", msg)
        }
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

/// 400 with every field problem joined, so a client can fix the request in
/// one round trip.
pub fn validation_error_to_response(errors: &[FieldError]) -> axum::response::Response {
    let details = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    json_error(StatusCode::BAD_REQUEST, "validation_error", details)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
