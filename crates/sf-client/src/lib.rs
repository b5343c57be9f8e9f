//! # sf-client
//!
//! Core HTTP transport for the Salesforce Chatter REST API.
//!
//! This crate provides the HTTP layer that the higher-level crates inject:
//! - Connection pooling and timeouts (configured through [`ClientConfig`])
//! - Compression support (gzip, deflate)
//! - Request building with query parameters and form bodies
//! - Response handling with Salesforce error-body parsing
//! - Request/response tracing
//!
//! Unlike a typical REST client, non-2xx responses are *not* turned into
//! errors here. Callers receive the status and body and decide what an
//! API-level error means. Only transport faults surface as [`Error`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (sf-rest: Chatter resources, refresh-and-retry dispatch)   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - Raw HTTP with compression and pooled connections         │
//! │  - Request building (query, form)                           │
//! │  - Response handling                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use chatter_sf_client::{ClientConfig, RequestMethod, SfHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chatter_sf_client::Error> {
//!     let client = SfHttpClient::new(ClientConfig::default())?;
//!
//!     let request = client
//!         .request(
//!             RequestMethod::Get,
//!             "https://na1.salesforce.com/services/data/v24.0/chatter/users/me",
//!         )
//!         .oauth_token("00Dxx...");
//!
//!     let (status, body) = client.send_value(&request).await?;
//!     println!("{status}: {body}");
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::{sanitize_error_message, ApiError, Response};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("chatter-sf-api/", env!("CARGO_PKG_VERSION"));
