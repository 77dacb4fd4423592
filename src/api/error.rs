//! Mapping of domain errors to HTTP responses.
//!
//! Client errors carry their message; server errors are logged here and
//! answered with a generic body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::Error;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Wrapper so handlers can `?` any [`Error`].
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::Validation(format!("malformed request body: {}", rejection.body_text())))
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) | Error::AlreadyCompleted(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::DataIntegrity(_)
        | Error::Config(_)
        | Error::Database(_)
        | Error::Migrate(_)
        | Error::Io(_)
        | Error::Hash(_)
        | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            tracing::error!(error = %self.0, "request failed");
            "server error".to_string()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
