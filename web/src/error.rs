//! Per-request errors and their HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};
use uci_bridge::EngineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File Not Found: {0}")]
    NotFound(String),

    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Invalid form field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed form body: {0}")]
    BadForm(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MissingField(_) | ApiError::InvalidField { .. } | ApiError::BadForm(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Engine(EngineError::Terminated) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Engine(EngineError::MalformedReply(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Engine(_) | ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, "{}", self);
        } else if status != StatusCode::NOT_FOUND {
            warn!(%status, "{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
