//! Shape validation for the aggregated batch.
//!
//! The whole batch is accepted or rejected; there is no partial result.
//! A count that failed to fetch is already `0` by the time it gets here, but a
//! count that fetched fine and is not a number (e.g. `"busy"`) fails the
//! batch.

use serde_json::Value;

use crate::visits::types::{RawVisit, SchemaError, SchemaIssue, VisitRecord};

/// Check every entry's count is a JSON number.
///
/// Any number is accepted, including fractions and negatives; the number is
/// kept exactly as received.
pub fn validate_visits(raw: Vec<RawVisit>) -> Result<Vec<VisitRecord>, SchemaError> {
    let mut records = Vec::with_capacity(raw.len());
    let mut issues = Vec::new();

    for (index, visit) in raw.into_iter().enumerate() {
        match visit.count {
            Value::Number(count) => records.push(VisitRecord {
                location: visit.location,
                count,
            }),
            other => issues.push(SchemaIssue {
                path: vec![Value::from(index), Value::from("count")],
                code: "invalid_type",
                expected: "number",
                received: describe(&other).to_string(),
                message: format!("Expected number (location '{}')", visit.location),
            }),
        }
    }

    if issues.is_empty() {
        Ok(records)
    } else {
        Err(SchemaError { issues })
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
