//! Tool report builders
//!
//! Every builder returns a JSON report carrying a `success` flag and a
//! human-readable `summary`; failures never surface as Rust errors so the
//! model always receives something it can relay. The rmcp layer in
//! [`crate::service`] only decides whether a report is flagged as an error.

pub mod local_git;
pub mod read;
pub mod write;

use std::fmt::Display;

use serde_json::{json, Value};

/// Report for a failed operation
pub fn failure(summary: impl Display, error: impl Display) -> Value {
    let error = error.to_string();
    json!({
        "success": false,
        "summary": format!("{}: {}", summary, error),
        "data": "",
        "error": error,
    })
}

/// `true` unless the report says `success: false`
pub fn is_success(report: &Value) -> bool {
    report.get("success").and_then(Value::as_bool).unwrap_or(true)
}
