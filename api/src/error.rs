use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::stripe;

/// Every failure is reported to the browser as HTTP 400 with
/// `{"error": {"message": ...}}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Stripe(#[from] stripe::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Serialize)]
struct ErrorMessage {
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::BadRequest(message) => tracing::debug!(%message, "rejected request"),
            AppError::Stripe(err) => tracing::warn!(error = %err, "payment api call failed"),
        }

        let body = ErrorBody {
            error: ErrorMessage {
                message: self.to_string(),
            },
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
