use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::Error;

/// Error returned by HTTP handlers.
///
/// Every variant renders as `{"error": message}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Error from storage, validation or transfer.
    #[error(transparent)]
    Core(#[from] Error),

    /// Malformed request the handler rejected before doing any work.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(Error::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Core(Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Core(Error::Document(_)) => StatusCode::BAD_REQUEST,
            AppError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            // Decoder detail goes to the log, the client gets a stable message
            AppError::Core(Error::Document(_)) => "Invalid import file format".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected JSON body");
        AppError::bad_request("Invalid request payload")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Client error");
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
