//! # sf-auth
//!
//! Authentication for the Salesforce Chatter API.
//!
//! ## Security
//!
//! - Sensitive data (tokens, secrets) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages never carry credential values
//!
//! ## Pieces
//!
//! - [`ClientCredentials`] - the connected app's `client_id` / `client_secret`
//! - [`Session`] - instance URL plus a shared, refreshable access token
//! - [`OAuthClient`] - the refresh-token grant against the OAuth token endpoint
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chatter_sf_auth::{ClientCredentials, OAuthClient, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chatter_sf_auth::Error> {
//!     let credentials = ClientCredentials::from_env()?;
//!     let session = Arc::new(Session::from_env()?);
//!
//!     let oauth = OAuthClient::new(credentials)?;
//!     let stale = session.access_token();
//!     let outcome = oauth.refresh_session(&session, &stale, |_| {}).await?;
//!     println!("refreshed: {}", outcome.is_refreshed());
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod oauth;

pub use credentials::{parse_sfdx_auth_url, ClientCredentials, Session};
pub use error::{Error, ErrorKind, Result};
pub use oauth::{OAuthClient, RefreshOutcome, TokenResponse};

/// OAuth token endpoint used for the refresh-token grant.
pub const DEFAULT_TOKEN_URL: &str = "https://na1.salesforce.com/services/oauth2/token";
