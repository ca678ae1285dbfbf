use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use lessonbook_orders::OrderDraft;

use crate::app::dto::OrderCreatedResponse;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/orders", post(create_order))
}

/// Record an order. Availability is not touched here; clients adjust spaces
/// through `PUT /lessons/:id` themselves.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<OrderDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match body {
        Ok(b) => b,
        Err(rejection) => return ApiError::InvalidInput(rejection.body_text()).into_response(),
    };

    match services.intake.create_order(draft).await {
        Ok(order_id) => (StatusCode::CREATED, Json(OrderCreatedResponse::new(order_id))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
