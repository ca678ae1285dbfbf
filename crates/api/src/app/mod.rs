//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store connection, seeding and the late-bound `StoreHandle`
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: error taxonomy and consistent error responses

use std::any::Any;

use axum::{http::HeaderValue, response::Response, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use lessonbook_infra::config::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::StoreHandle;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Core routes answer `503` until `handle` is populated; `/health` never
/// checks the store.
pub fn build_app(handle: StoreHandle, config: &AppConfig) -> Router {
    let core = routes::router().layer(axum::middleware::from_fn_with_state(
        handle,
        middleware::require_store,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(core)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins))
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(AnyOrigin).allow_headers(AnyOrigin);
    if origins.is_empty() {
        return cors.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "request handler panicked");
    errors::internal_error()
}
