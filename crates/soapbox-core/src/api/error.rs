use serde_json::Value;
use thiserror::Error;

/// Maximum length of response text quoted in protocol errors
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failure modes of a dispatched request.
///
/// `Http` carries the parsed JSON error body; the backend returns JSON for
/// every status, so a body that fails to parse is a contract violation and
/// surfaces as `Protocol` instead.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", message_of(payload))]
    Http { status: u16, payload: Value },

    #[error("Invalid response: {0}")]
    Protocol(String),
}

// Application errors arrive as {"error": ...}; the JWT middleware uses
// {"msg": ...} for credential failures.
fn message_of(payload: &Value) -> &str {
    payload
        .get("error")
        .or_else(|| payload.get("msg"))
        .and_then(Value::as_str)
        .unwrap_or("request failed")
}

impl ApiError {
    /// Human-readable message, preferring the server-supplied `error` field.
    pub fn message(&self) -> String {
        match self {
            ApiError::Network(_) => "network error".to_string(),
            ApiError::Http { payload, .. } => message_of(payload).to_string(),
            ApiError::Protocol(msg) => msg.clone(),
        }
    }

    /// True for 401 responses. Callers treat this as credential rejection
    /// and reset the session rather than surfacing the error locally.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401, .. })
    }

    pub(crate) fn protocol(context: &str, body: &str) -> Self {
        ApiError::Protocol(format!("{}: {}", context, truncate_body(body)))
    }
}

/// Truncate a response body to avoid dragging huge payloads into logs
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}
