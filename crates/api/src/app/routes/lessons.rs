use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};

use lessonbook_core::LessonId;
use lessonbook_infra::inventory::parse_delta;

use crate::app::dto::AdjustSpacesRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/lessons", get(list_lessons))
        .route("/lessons/:id", put(adjust_spaces))
}

pub async fn list_lessons(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.queries.list().await {
        Ok(lessons) => Json(lessons).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn adjust_spaces(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<AdjustSpacesRequest>, JsonRejection>,
) -> Response {
    // Ids are opaque: anything that is not one of ours is simply unknown.
    let id: LessonId = match id.parse() {
        Ok(v) => v,
        Err(_) => return ApiError::NotFound.into_response(),
    };

    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return ApiError::InvalidDelta(rejection.body_text()).into_response(),
    };

    let delta = match parse_delta(&body.spaces_delta) {
        Ok(d) => d,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match services.inventory.adjust_spaces(id, delta).await {
        Ok(lesson) => Json(lesson).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
