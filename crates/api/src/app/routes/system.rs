use axum::http::StatusCode;

/// Liveness only; never touches the store.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
