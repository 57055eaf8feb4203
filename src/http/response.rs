//! Error-to-response mapping.
//!
//! Every failure is `500 {"error": <details>}`:
//! - validation failure: the list of schema issues
//! - store failure: the store's own error body, untouched
//! - panic: a generic message (details go to the log only)
//! - request timeout: `"request timed out"`

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use serde_json::{json, Value};

use crate::visits::AggregateError;

pub const GENERIC_ERROR: &str = "internal server error";
pub const TIMEOUT_ERROR: &str = "request timed out";

/// Failure of the aggregation endpoint.
#[derive(Debug)]
pub struct ApiError(pub AggregateError);

impl From<AggregateError> for ApiError {
    fn from(e: AggregateError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn detail(&self) -> Value {
        match &self.0 {
            AggregateError::Validation(e) => {
                serde_json::to_value(e).unwrap_or_else(|_| Value::from(e.to_string()))
            }
            AggregateError::Persistence(e) => e.to_json(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.detail() })),
        )
            .into_response()
    }
}

/// Response used by the panic-catching layer.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": GENERIC_ERROR })),
    )
        .into_response()
}

/// Error handler for the middleware stack; in practice only the request timeout.
pub async fn timeout_response(err: BoxError) -> Response {
    let message = if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request timed out");
        TIMEOUT_ERROR
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        GENERIC_ERROR
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
