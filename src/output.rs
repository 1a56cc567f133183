//! Response formatting for stdout/stderr.

use serde::Serialize;

use crate::answer::Answer;

#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

/// Format an answer as a single JSON line.
pub fn format_response(answer: &Answer) -> String {
    to_json_line(answer)
}

/// Format an error message as JSON.
pub fn format_error(message: &str) -> String {
    serde_json::to_string(&ErrorResponse { error: message })
        .unwrap_or_else(|_| format!("error: {}", message))
}

fn to_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format_error(&format!("failed to serialize response: {}", e)))
}
