//! # chatter-sf-api
//!
//! A Salesforce Chatter REST API client library for Rust.
//!
//! Resource paths are built by chaining segments; a terminal call resolves
//! the path against the call's fields and sends it with the session's
//! OAuth token. An expired session is refreshed once and the call retried,
//! transparently to the caller.
//!
//! ## Security
//!
//! - Sensitive data (tokens, secrets) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages sanitize any credential data
//!
//! ## Crates
//!
//! - **chatter-sf-client** - HTTP transport: pooling, compression, query/form encoding
//! - **chatter-sf-auth** - Client credentials, shared sessions, refresh-token flow
//! - **chatter-sf-rest** - Chatter resources with refresh-and-retry dispatch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chatter_sf_api::rest::{Chatter, Fields};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // force://<client_id>:<client_secret>:<refresh_token>@<instance>
//!     let auth_url = std::env::var("SF_AUTH_URL")?;
//!     let chatter = Chatter::from_sfdx_auth_url(&auth_url).await?;
//!
//!     let me = chatter.segment("users").segment("me").get(Fields::new()).await?;
//!     println!("{}", me.body["name"]);
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "auth")]
pub use chatter_sf_auth as auth;
#[cfg(feature = "client")]
pub use chatter_sf_client as client;
#[cfg(feature = "rest")]
pub use chatter_sf_rest as rest;
