use axum::{extract::State, middleware::Next, response::Response};

use crate::app::{errors, services::StoreHandle};

/// Refuse core routes with `503` until the store is connected; otherwise
/// expose the services to handlers as an `Extension<Arc<AppServices>>`.
pub async fn require_store(
    State(handle): State<StoreHandle>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(services) = handle.get() else {
        return errors::store_unavailable();
    };

    req.extensions_mut().insert(services);
    next.run(req).await
}
