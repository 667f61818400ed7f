use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use crate::models::TaskId;
use crate::store::dto::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Task with ID {0} not found.")]
    NotFound(TaskId),

    #[error("{0}")]
    Unprocessable(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        warn!("request failed with {}: {}", status, self);
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
