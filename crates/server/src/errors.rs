use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub message: String,
    pub status_code: u16,
}

/// JSON error body shared by every handler.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
    pub violations: Vec<Violation>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: &'a Vec<Violation>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Self {
        Self { status, error: error.into(), details, violations: Vec::new() }
    }

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(details.into()))
    }

    pub fn unprocessable(messages: Vec<String>) -> Self {
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        let violations = messages
            .into_iter()
            .map(|message| Violation { message, status_code: status.as_u16() })
            .collect();
        Self { status, error: "Validation Error".into(), details: None, violations }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.error, details = ?self.details, "request failed");
        }
        let body = ErrorBody {
            error: &self.error,
            status_code: self.status.as_u16(),
            details: self.details.as_deref(),
            violations: &self.violations,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(messages) => Self::unprocessable(messages),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(other.to_string())),
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(e: JsonRejection) -> Self { Self::bad_request(e.body_text()) }
}

impl From<PathRejection> for JsonApiError {
    fn from(e: PathRejection) -> Self { Self::bad_request(e.body_text()) }
}

impl From<QueryRejection> for JsonApiError {
    fn from(e: QueryRejection) -> Self { Self::bad_request(e.body_text()) }
}

impl From<MultipartRejection> for JsonApiError {
    fn from(e: MultipartRejection) -> Self { Self::bad_request(e.body_text()) }
}

impl From<MultipartError> for JsonApiError {
    fn from(e: MultipartError) -> Self { Self::bad_request(e.to_string()) }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
