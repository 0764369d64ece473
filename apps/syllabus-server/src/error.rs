//! Error types for the syllabus server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use syllabus_core::DocxError;
use thiserror::Error;

/// Body of the missing-template response
pub const TEMPLATE_NOT_FOUND_MESSAGE: &str = "Error: template.docx not found!";

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template could not be processed: {0}")]
    Template(#[from] DocxError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::TemplateNotFound(path) => {
                tracing::warn!("Template not found at {}", path);
                (StatusCode::NOT_FOUND, TEMPLATE_NOT_FOUND_MESSAGE.to_string())
            }
            ServerError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error: template could not be processed ({})", e),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error: internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
