//! Visit records, fetch outcomes and error definitions.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use thiserror::Error;

/// A validated visit count for one location.
///
/// `count` is kept as the JSON number the upstream sent, so `12` stays an
/// integer and `12.5` is stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub location: String,
    pub count: Number,
}

impl VisitRecord {
    pub fn new(location: impl Into<String>, count: impl Into<Number>) -> Self {
        Self {
            location: location.into(),
            count: count.into(),
        }
    }

    /// Count as a float, for ordering.
    pub fn count_f64(&self) -> f64 {
        self.count.as_f64().unwrap_or(0.0)
    }
}

/// A record straight out of the fan-out, before shape validation.
///
/// `count` is whatever JSON the upstream returned, or `0` when the fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawVisit {
    pub location: String,
    pub count: Value,
}

/// Why a single upstream fetch produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection, DNS or protocol error.
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("timed out")]
    Timeout,

    /// Response body was not valid JSON.
    #[error("body is not JSON: {0}")]
    Body(String),
}

impl FetchFailure {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchFailure::Transport(_) => "transport",
            FetchFailure::Timeout => "timeout",
            FetchFailure::Body(_) => "body",
        }
    }
}

/// Result of fetching one location.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Body parsed as JSON. The shape is not checked here.
    Fetched(Value),
    /// Fetch failed; the location falls back to a zero count.
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn into_raw(self, location: impl Into<String>) -> RawVisit {
        let count = match self {
            FetchOutcome::Fetched(value) => value,
            FetchOutcome::Failed(_) => Value::from(0),
        };
        RawVisit {
            location: location.into(),
            count,
        }
    }
}

/// One problem found while validating the aggregated batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIssue {
    /// Location of the offending value, e.g. `[3, "count"]`.
    pub path: Vec<Value>,
    pub code: &'static str,
    pub expected: &'static str,
    pub received: String,
    pub message: String,
}

/// The aggregated batch did not match `[{location: string, count: number}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{} invalid visit record(s)", .issues.len())]
pub struct SchemaError {
    pub issues: Vec<SchemaIssue>,
}

/// Errors from the destination table.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with a non-success status.
    #[error("store rejected insert with status {status}")]
    Rejected { status: StatusCode, body: Value },

    /// The insert request never completed.
    #[error("store request failed: {0}")]
    Transport(String),
}

impl StoreError {
    /// Value reported under `error` in the failure response.
    ///
    /// Store rejections are passed through untouched.
    pub fn to_json(&self) -> Value {
        match self {
            StoreError::Rejected { body, .. } => body.clone(),
            StoreError::Transport(msg) => json!({ "message": msg }),
        }
    }
}

/// Errors that end an aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("validation failed: {0}")]
    Validation(#[from] SchemaError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl AggregateError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AggregateError::Validation(_) => "validation_error",
            AggregateError::Persistence(_) => "store_error",
        }
    }
}
