//! Error types for sf-rest.
//!
//! API-level errors (including a session that stays invalid) are returned as
//! [`ApiResponse`](crate::ApiResponse) data. Only faults end up here.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Returns true if the failure happened in the HTTP transport.
    pub fn is_transport_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Client(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Client error: {0}")]
    Client(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),

    #[error("{0}")]
    Other(String),
}

impl From<chatter_sf_client::Error> for Error {
    fn from(err: chatter_sf_client::Error) -> Self {
        Error {
            kind: ErrorKind::Client(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<chatter_sf_auth::Error> for Error {
    fn from(err: chatter_sf_auth::Error) -> Self {
        Error {
            kind: ErrorKind::Auth(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
