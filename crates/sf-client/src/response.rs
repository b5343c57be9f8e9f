//! HTTP response handling with Salesforce-specific extensions.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// Wrapper around HTTP response with additional functionality.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Parse the body as an untyped JSON value.
    ///
    /// An empty body (e.g. `204 No Content`) yields `Value::Null`; any other
    /// body that is not valid JSON is an error.
    pub async fn json_value(self) -> Result<Value> {
        let text = self.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(Into::into)
    }
}

/// One entry of a Salesforce error body.
///
/// Salesforce reports API errors as a JSON array of these objects, although
/// some endpoints return a single bare object instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code, e.g. `INVALID_SESSION_ID`.
    #[serde(rename = "errorCode")]
    pub error_code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Fields the error relates to.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ApiError {
    /// Extract error entries from a parsed response body.
    ///
    /// Accepts both the array shape and a single error object. Elements that
    /// do not carry an `errorCode` are skipped.
    pub fn from_body(body: &Value) -> Vec<ApiError> {
        match body {
            Value::Array(items) => items.iter().filter_map(Self::from_entry).collect(),
            Value::Object(_) => Self::from_entry(body).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true if any entry in `body` carries the given error code.
    pub fn body_has_code(body: &Value, code: &str) -> bool {
        Self::from_body(body)
            .iter()
            .any(|err| err.error_code == code)
    }

    fn from_entry(entry: &Value) -> Option<ApiError> {
        let error_code = entry.get("errorCode")?.as_str()?.to_string();
        let message = entry
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let fields = entry
            .get("fields")
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(ApiError {
            error_code,
            message,
            fields,
        })
    }
}

/// Sanitize an error message to prevent exposing sensitive data.
///
/// This function:
/// - Truncates messages longer than 500 characters
/// - Removes potential tokens (anything that looks like an access token)
/// - Removes credential query/form parameters
/// - Removes potential session IDs
pub fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = message.to_string();

    // Salesforce tokens start with the org ID ("00D...") followed by "!"
    if let Ok(token_pattern) = regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+") {
        sanitized = token_pattern
            .replace_all(&sanitized, "[REDACTED_TOKEN]")
            .to_string();
    }

    if let Ok(param_pattern) =
        regex_lite::Regex::new(r"(access_token|refresh_token|client_secret)=[^&\s]+")
    {
        sanitized = param_pattern
            .replace_all(&sanitized, "${1}=[REDACTED]")
            .to_string();
    }

    if let Ok(session_pattern) = regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}") {
        sanitized = session_pattern
            .replace_all(&sanitized, "sid=[REDACTED]")
            .to_string();
    }

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
