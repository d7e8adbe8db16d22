//! Typed error handling for the crudgen engine
//!
//! Every component signals failure by returning an [`Error`]; nothing is
//! retried and nothing recovers internally (the token-verification gate's
//! `allow_all` path is the single documented exception). The [`IntoResponse`]
//! implementation is the only place that inspects error identity and produces
//! an HTTP body.
//!
//! # Response envelopes
//!
//! - `{ "message": <class>, "error": <detail> }` for the 4xx/5xx classes
//! - `{ "errors": [{ "path", "message" }] }` for schema-validation failures
//! - `{ "error": "Internal Server Error" }` for anything unrecognized

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error as ThisError;

/// A single path-annotated schema validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

/// The error taxonomy for the engine and its plugins
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    /// Malformed input, missing configuration, business-rule violations
    #[error("{0}")]
    BadRequest(String),

    /// Missing/invalid credentials, insufficient permissions
    #[error("{0}")]
    Unauthorized(String),

    /// Stricter access denials
    #[error("{0}")]
    Forbidden(String),

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Structured, path-annotated schema validation failure
    #[error("schema validation failed")]
    Schema(Vec<FieldIssue>),

    /// Anything else; rendered as the bare fallback envelope
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Schema(_) => StatusCode::BAD_REQUEST,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `message` field of the uniform envelope
    pub fn class(&self) -> &'static str {
        match self {
            Error::BadRequest(_) => "Bad Request",
            Error::Unauthorized(_) => "Unauthorized",
            Error::Forbidden(_) => "Forbidden",
            Error::NotFound(_) => "Not Found",
            Error::Conflict(_) => "Conflict",
            Error::Schema(_) => "Bad Request",
            Error::Internal(_) => "Internal Server Error",
        }
    }

    /// Error for a field name that does not exist on a record
    pub fn unknown_field(field: &str) -> Self {
        Error::BadRequest(format!("Unknown field '{field}'"))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Error::Schema(issues) => (status, Json(json!({ "errors": issues }))).into_response(),
            Error::Internal(detail) => {
                tracing::error!(%detail, "request failed with internal error");
                (status, Json(json!({ "error": "Internal Server Error" }))).into_response()
            }
            other => {
                tracing::debug!(error = %other, status = %status, "request failed");
                let body = json!({ "message": other.class(), "error": other.to_string() });
                (status, Json(body)).into_response()
            }
        }
    }
}

/// A specialized Result type for crudgen operations
pub type Result<T> = std::result::Result<T, Error>;
