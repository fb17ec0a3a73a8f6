// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::pdf_extractor::DocumentParseError;

pub const UPLOAD_FAILED_MESSAGE: &str =
    "Could not read the uploaded file. Please upload a valid PDF document.";

/// Errors that end a request early. The body never carries internal detail.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("document parse failed: {0}")]
    Document(#[from] DocumentParseError),
    #[error("unauthorized")]
    Unauthorized,
    #[error("page render failed: {0}")]
    Render(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "The uploaded file is too large.".to_string(),
            ),
            AppError::Document(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                UPLOAD_FAILED_MESSAGE.to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Render(e) => {
                tracing::error!(error = %e, "Failed to render page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
