//! Error types for sf-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for sf-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-auth operations.
///
/// Error messages are sanitized to prevent accidental credential exposure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

/// The kind of error that occurred.
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// OAuth error response from Salesforce.
    #[error("OAuth error: {error} - {description}")]
    OAuth { error: String, description: String },

    /// Invalid credentials configuration.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Transport failure while talking to the token endpoint.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<chatter_sf_client::Error> for Error {
    fn from(err: chatter_sf_client::Error) -> Self {
        let message = chatter_sf_client::sanitize_error_message(&err.to_string());
        let kind = if err.is_decode_error() {
            ErrorKind::Json(message)
        } else {
            ErrorKind::Http(message)
        };
        Error::with_source(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        let err = ErrorKind::OAuth {
            error: "invalid_grant".to_string(),
            description: "expired access/refresh token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "OAuth error: invalid_grant - expired access/refresh token"
        );

        let err = ErrorKind::EnvVar("SF_CLIENT_ID".to_string());
        assert_eq!(err.to_string(), "Environment variable not set: SF_CLIENT_ID");
    }

    #[test]
    fn test_client_error_conversion_redacts_tokens() {
        let client_err = chatter_sf_client::Error::new(chatter_sf_client::ErrorKind::Other(
            "request with refresh_token=abc&client_secret=xyz failed".to_string(),
        ));
        let err: Error = client_err.into();
        assert!(matches!(err.kind, ErrorKind::Http(_)));
        assert!(!err.to_string().contains("abc"));
        assert!(!err.to_string().contains("xyz"));
    }

    #[test]
    fn test_client_error_conversion_keeps_token_url() {
        let client_err = chatter_sf_client::Error::new(chatter_sf_client::ErrorKind::Connection(
            "error sending request for url (https://na1.salesforce.com/services/oauth2/token)"
                .to_string(),
        ));
        let err: Error = client_err.into();
        assert!(err
            .to_string()
            .contains("https://na1.salesforce.com/services/oauth2/token"));
    }

    #[test]
    fn test_client_decode_error_maps_to_json() {
        let client_err =
            chatter_sf_client::Error::new(chatter_sf_client::ErrorKind::Json("eof".to_string()));
        let err: Error = client_err.into();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
    }
}
