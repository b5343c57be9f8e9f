//! # sf-rest
//!
//! Salesforce Chatter REST API client.
//!
//! ## Features
//!
//! - **Chainable paths** - Build resource URLs one segment at a time
//! - **Field substitution** - A call field named like a path segment replaces it
//! - **Transparent refresh** - `INVALID_SESSION_ID` triggers one token refresh and a retry
//! - **Shared session** - Every resource from one client sees the refreshed token
//! - **Token observer** - Get notified when a new access token is issued
//!
//! API-level errors are not faults: every call returns an [`ApiResponse`]
//! holding the status and parsed body.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chatter_sf_auth::{ClientCredentials, Session};
//! use chatter_sf_rest::{Chatter, Fields};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chatter_sf_rest::Error> {
//!     let chatter = Chatter::new(
//!         ClientCredentials::new("client-id", "client-secret"),
//!         Session::new("https://na1.salesforce.com", "access-token")
//!             .with_refresh_token("refresh-token"),
//!     )?;
//!
//!     // GET services/data/v24.0/chatter/users/me
//!     let me = chatter.segment("users").segment("me").get(Fields::new()).await?;
//!
//!     // POST services/data/v24.0/chatter/feeds/news/me/feed-items
//!     chatter
//!         .segment("feeds")
//!         .segment("news")
//!         .segment("me")
//!         .segment("feed_items")
//!         .post([("text", "Hello world!")])
//!         .await?;
//!
//!     // DELETE services/data/v24.0/chatter/feed-items/0D5...
//!     chatter
//!         .segment("feed_items")
//!         .call([("_method", "DELETE"), ("id", "0D5xx0000001")])
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod chatter;
mod dispatcher;
mod error;
mod observer;
mod resource;
mod response;

pub use chatter::{Chatter, ChatterBuilder, API_VERSION_ENV, DEFAULT_API_VERSION};
pub use dispatcher::{Dispatcher, ResolvedRequest, DEFAULT_MAX_RETRIES};
pub use error::{Error, ErrorKind, Result};
pub use observer::TokenObserver;
pub use resource::{Fields, Resource};
pub use response::{ApiResponse, INVALID_SESSION_ID};

pub use chatter_sf_client::RequestMethod;
