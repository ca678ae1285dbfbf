use axum::{routing::get, Router};

pub mod lessons;
pub mod orders;
pub mod search;
pub mod system;

/// Router for every endpoint that needs the store.
pub fn router() -> Router {
    Router::new()
        .merge(lessons::router())
        .route("/search", get(search::search))
        .merge(orders::router())
}
