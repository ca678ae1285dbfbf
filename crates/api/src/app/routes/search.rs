use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::dto::SearchParams;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let q = match params {
        Ok(Query(SearchParams { q: Some(q) })) => q,
        Ok(_) => return ApiError::InvalidInput("query parameter `q` is required".to_string()).into_response(),
        Err(rejection) => return ApiError::InvalidInput(rejection.body_text()).into_response(),
    };

    match services.queries.search(&q).await {
        Ok(lessons) => Json(lessons).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
