use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mth_db::StoreError;
use mth_srs::SrsError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Card {0} not found")]
    CardNotFound(i64),
    #[error(transparent)]
    Srs(#[from] SrsError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::CardNotFound(_) => StatusCode::NOT_FOUND,
            Self::Srs(SrsError::InvalidQuality(_)) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Srs(SrsError::InvalidResult(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
