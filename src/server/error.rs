//! HTTP error responses

use crate::error::Error;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Handler error, rendered as `{"error": "<message>"}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client-fixable input problem
    #[error("{0}")]
    BadRequest(String),

    /// Processing failure
    #[error("{0}")]
    Internal(String),
}

/// Convenience type alias for handler return values
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Status code of the response
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::MissingFields(_)
            | Error::UnsupportedFileType(_)
            | Error::EmptyBatch
            | Error::Parse(_)
            | Error::Csv(_)
            | Error::Workbook(_) => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(msg) => msg,
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                msg
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
