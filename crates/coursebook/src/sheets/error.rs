//! Error types for the spreadsheet adapter.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the spreadsheet service.
#[derive(Debug, Error, Clone)]
pub enum SheetsError {
    /// No spreadsheet id was configured
    #[error("SHEET_ID is not set")]
    NotConfigured,

    /// Service account credentials are missing or unusable
    #[error("Invalid credentials: {message}")]
    Credentials { message: String },

    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// The token endpoint refused the service account assertion
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// The Sheets API answered with a non-success status
    #[error("Sheets API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// The response body did not have the expected shape
    #[error("Malformed response: {message}")]
    Decode { message: String },
}

impl SheetsError {
    /// Returns true if the failure is due to local configuration rather than the remote call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SheetsError::NotConfigured | SheetsError::Credentials { .. }
        )
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SheetsError::Decode {
                message: err.to_string(),
            }
        } else {
            SheetsError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for SheetsError {
    fn from(err: url::ParseError) -> Self {
        SheetsError::Network {
            message: format!("Bad request URL: {err}"),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for SheetsError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        SheetsError::Credentials {
            message: err.to_string(),
        }
    }
}
