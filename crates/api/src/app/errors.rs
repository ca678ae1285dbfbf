use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use lessonbook_infra::{store::StoreError, CatalogError, IntakeError, InventoryError};

/// Every failure a handler can report, already classified for the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidDelta(String),

    #[error("insufficient spaces: {available} available, {requested} requested")]
    InsufficientSpaces { available: i64, requested: i64 },

    #[error("lesson not found")]
    NotFound,

    #[error("update conflict after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound => ApiError::NotFound,
            InventoryError::InvalidDelta(msg) => ApiError::InvalidDelta(msg),
            InventoryError::InsufficientSpaces {
                available,
                requested,
            } => ApiError::InsufficientSpaces {
                available,
                requested,
            },
            InventoryError::Conflict { attempts } => ApiError::Conflict { attempts },
            InventoryError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            IntakeError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            CatalogError::Store(e) => ApiError::Store(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
            ApiError::InvalidDelta(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_delta", msg),
            e @ ApiError::InsufficientSpaces { .. } => {
                json_error(StatusCode::BAD_REQUEST, "insufficient_spaces", e.to_string())
            }
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "lesson not found"),
            e @ ApiError::Conflict { .. } => {
                tracing::error!(error = %e, "spaces update gave up");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "update_conflict", e.to_string())
            }
            ApiError::Store(e) => store_error_to_response(e),
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Unavailable(detail) => {
            tracing::warn!(%detail, "store unavailable");
            store_unavailable()
        }
        e @ StoreError::Timeout { .. } => {
            json_error(StatusCode::GATEWAY_TIMEOUT, "store_timeout", e.to_string())
        }
        e => {
            tracing::error!(error = %e, "store failure");
            internal_error()
        }
    }
}

pub fn store_unavailable() -> Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "store_unavailable",
        "store unavailable",
    )
}

pub fn internal_error() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal error",
    )
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
