//! HTTP response types and error mapping
//!
//! Every failed API call answers with a flat `{"error": "..."}` body so the
//! page script can show the message as-is.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::{AppError, ExportError};

/// Error body returned by all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Status code for an application error
pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. }
        | AppError::Export(ExportError::UnsupportedFormat { .. }) => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Http(_) => StatusCode::BAD_GATEWAY,
        AppError::Instructions(_)
        | AppError::Llm(_)
        | AppError::Export(_)
        | AppError::Configuration { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let status = status_for(&error);
    let message = match &error {
        AppError::Validation { message } => message.clone(),
        AppError::NotFound { resource, id } => format!("{resource} with id '{id}' not found"),
        AppError::Http(_) => "External service communication failed".to_string(),
        other => other.to_string(),
    };

    if status.is_server_error() {
        error!("Request failed: {}", error);
    }

    (status, Json(ErrorResponse::new(message))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self)
    }
}

/// Malformed or mistyped JSON bodies are client errors
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}
