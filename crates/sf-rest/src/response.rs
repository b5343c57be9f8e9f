//! The `(status, body)` pair handed back from every Chatter call.

use serde::de::DeserializeOwned;
use serde_json::Value;

use chatter_sf_client::{sanitize_error_message, ApiError};

use crate::error::Result;

/// Error code Salesforce uses for an expired or revoked access token.
pub const INVALID_SESSION_ID: &str = "INVALID_SESSION_ID";

/// Status and parsed body of a Chatter API call.
///
/// Error-shaped bodies are returned as-is; inspect them with
/// [`ApiResponse::errors`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body (`Value::Null` for an empty body).
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns true if the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Salesforce error entries in the body, if any.
    pub fn errors(&self) -> Vec<ApiError> {
        ApiError::from_body(&self.body)
    }

    /// Message of the first error entry, sanitized for logging.
    pub fn error_message(&self) -> Option<String> {
        self.errors()
            .first()
            .map(|error| sanitize_error_message(&error.message))
    }

    /// Returns true if the body reports `INVALID_SESSION_ID`.
    ///
    /// Both an array of error objects and a single error object count.
    pub fn is_session_invalid(&self) -> bool {
        ApiError::body_has_code(&self.body, INVALID_SESSION_ID)
    }

    /// Decode the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| chatter_sf_client::Error::from(e).into())
    }

    /// Split into the `(status, body)` tuple.
    pub fn into_parts(self) -> (u16, Value) {
        (self.status, self.body)
    }
}

impl From<ApiResponse> for (u16, Value) {
    fn from(response: ApiResponse) -> Self {
        response.into_parts()
    }
}
