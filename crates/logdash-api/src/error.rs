use std::path::PathBuf;

use serde_json::Value;

/// Errors produced while talking to the log-management server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    #[error("request failed: {0}")]
    Request(String),

    /// Non-2xx response; `detail` comes from the JSON body when present
    #[error("server returned {status}{}", format_detail(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("response parse failed: {0}")]
    Decode(String),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not signed in")]
    NotAuthenticated,
}

impl ApiError {
    /// Build a status error from a response body
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            detail: extract_detail(body),
        }
    }

    /// The server-provided `detail` message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Human-readable banner text: the server detail, else `fallback`
    pub fn banner(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::NotAuthenticated) || self.status() == Some(401)
    }
}

fn format_detail(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Pull the `detail` field out of an error body.
///
/// FastAPI sends either a plain string or, for validation failures, a list of
/// `{loc, msg, type}` objects; the list is flattened to its messages.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail() {
        let err = ApiError::from_response(401, r#"{"detail": "Invalid credentials"}"#);
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert_eq!(err.banner("Login failed"), "Invalid credentials");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_validation_detail_is_flattened() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
            {"loc": ["body", "password"], "msg": "field required", "type": "value_error.missing"}
        ]}"#;
        let err = ApiError::from_response(422, body);
        assert_eq!(
            err.detail(),
            Some("value is not a valid email address; field required")
        );
    }

    #[test]
    fn test_missing_detail_uses_fallback() {
        let err = ApiError::from_response(500, "Internal Server Error");
        assert!(err.detail().is_none());
        assert_eq!(err.banner("Search failed"), "Search failed");
        assert_eq!(err.to_string(), "server returned 500");

        let err = ApiError::Request("connection refused".to_string());
        assert_eq!(err.banner("Login failed"), "Login failed");
        assert!(!err.is_unauthorized());
    }
}
