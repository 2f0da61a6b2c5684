use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use mth_db::SrsStore;
use serde_json::json;

use crate::{learning, middleware::ReviewThrottle, state::ApiState};

pub fn router<S: SrsStore>(throttle: ReviewThrottle) -> Router<ApiState<S>> {
    Router::new()
        .route("/health", get(health))
        .merge(learning::routes(throttle))
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "The requested resource was not found" })),
    )
}
