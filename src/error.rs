use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AllotError>;

#[derive(Error, Debug)]
pub enum AllotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read spreadsheet: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid room distribution: {0}")]
    InvalidDistribution(String),

    #[error("Invalid field mapping: {0}")]
    InvalidMapping(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Spreadsheet contains no rows")]
    EmptyRoster,

    #[error("No file uploaded")]
    EmptyUpload,
}

impl AllotError {
    /// Errors caused by what the caller sent, as opposed to failures on our side.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, AllotError::Io(_))
    }
}

/// JSON envelope returned by every API error (and the health check).
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub error: bool,
    pub message: String,
    pub data: Option<()>,
}

impl Envelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ResponseError for AllotError {
    fn status_code(&self) -> StatusCode {
        if self.is_configuration() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Envelope::failure(self.to_string()))
    }
}
