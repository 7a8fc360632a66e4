use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::server::types::ApiErrorType;
use crate::sheets::SheetsError;

/// Errors surfaced by the request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The spreadsheet id or credentials are missing
    #[error("{0}")]
    Configuration(String),

    /// The request lacked a required field
    #[error("{message}")]
    Validation { message: String, details: String },

    /// The spreadsheet service call failed
    #[error("{message}: {details}")]
    Upstream { message: String, details: String },
}

impl AppError {
    /// Wraps a [`SheetsError`] with the message shown to the client.
    pub fn upstream(message: &str, err: SheetsError) -> Self {
        if err.is_configuration() {
            AppError::Configuration(err.to_string())
        } else {
            AppError::Upstream {
                message: message.to_string(),
                details: err.to_string(),
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<SheetsError> for AppError {
    fn from(err: SheetsError) -> Self {
        AppError::upstream("Spreadsheet request failed", err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Configuration(message) => {
                ApiErrorType::from((status, message.as_str(), None)).into_response()
            }
            AppError::Validation { message, details }
            | AppError::Upstream { message, details } => {
                ApiErrorType::from((status, message.as_str(), Some(details))).into_response()
            }
        }
    }
}
