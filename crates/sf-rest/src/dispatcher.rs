//! Request resolution and dispatch with transparent token refresh.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use chatter_sf_auth::{OAuthClient, RefreshOutcome, Session};
use chatter_sf_client::{RequestBuilder, RequestMethod, SfHttpClient};

use crate::error::{Error, ErrorKind, Result};
use crate::observer::TokenObserver;
use crate::resource::Fields;
use crate::response::ApiResponse;

/// Attempts per call: the original request plus one retry after a refresh.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const METHOD_FIELD: &str = "_method";
const ID_FIELD: &str = "id";

/// A fully resolved call: method, absolute URL and the fields left to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    method: RequestMethod,
    url: String,
    fields: Fields,
}

impl ResolvedRequest {
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fields sent as query parameters (GET, HEAD, DELETE) or as a form body.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Sends resolved requests against a shared session.
///
/// One dispatcher backs every [`Resource`](crate::Resource) derived from the
/// same [`Chatter`](crate::Chatter) client, so a refresh made by any of them
/// is seen by all.
pub struct Dispatcher {
    http: SfHttpClient,
    oauth: OAuthClient,
    session: Arc<Session>,
    observer: Option<Arc<dyn TokenObserver>>,
    max_retries: u32,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("session", &self.session)
            .field("token_url", &self.oauth.token_url())
            .field("observer", &self.observer.is_some())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Dispatcher {
    pub(crate) fn new(
        http: SfHttpClient,
        oauth: OAuthClient,
        session: Arc<Session>,
        observer: Option<Arc<dyn TokenObserver>>,
        max_retries: u32,
    ) -> Self {
        Self {
            http,
            oauth,
            session,
            observer,
            max_retries: max_retries.max(1),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Turn a segment list and call fields into a concrete request.
    ///
    /// `_method` and `id` are taken out first. Every other field whose key
    /// equals a segment replaces the first such segment and is not sent.
    /// A non-empty `id` is appended as the final segment.
    pub fn resolve(&self, segments: &[String], mut fields: Fields) -> Result<ResolvedRequest> {
        let method = match fields.remove(METHOD_FIELD) {
            Some(name) => name
                .parse::<RequestMethod>()
                .map_err(|_| Error::new(ErrorKind::InvalidMethod(name)))?,
            None => RequestMethod::Get,
        };
        let id = fields.remove(ID_FIELD).filter(|id| !id.is_empty());

        let mut parts: Vec<String> = segments
            .iter()
            .map(|segment| fields.remove(segment).unwrap_or_else(|| segment.clone()))
            .collect();
        if let Some(id) = id {
            parts.push(id);
        }

        let url = format!("{}/{}", self.session.instance_url(), parts.join("/"));

        Ok(ResolvedRequest {
            method,
            url,
            fields,
        })
    }

    /// Send a request, refreshing the access token and retrying when the
    /// response reports `INVALID_SESSION_ID`.
    ///
    /// At most `max_retries` requests go out. When attempts run out the last
    /// response is returned as-is.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: &ResolvedRequest) -> Result<ApiResponse> {
        let template = self
            .http
            .request(request.method, request.url.clone())
            .accept("application/json")
            .fields(request.fields.clone());

        let mut attempt = 1;
        loop {
            let token = self.session.access_token();
            let (status, body) = self.send_once(&template, &token).await?;
            let response = ApiResponse::new(status, body);

            if !response.is_session_invalid() {
                return Ok(response);
            }

            if attempt >= self.max_retries {
                let message = response.error_message().unwrap_or_default();
                warn!(
                    attempt,
                    status,
                    message = %message,
                    "Session still invalid after refresh; giving up"
                );
                return Ok(response);
            }

            debug!(attempt, status, "Session invalid; refreshing access token");
            self.refresh(&token).await?;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        template: &RequestBuilder,
        token: &str,
    ) -> Result<(u16, serde_json::Value)> {
        let request = template.clone().oauth_token(token);
        Ok(self.http.send_value(&request).await?)
    }

    /// Refresh the access token if it still equals `stale_token`.
    ///
    /// Returns true if the session now holds a newer token, whether this call
    /// or a concurrent one obtained it. The observer runs only for the call
    /// that actually talked to the token endpoint.
    pub async fn refresh(&self, stale_token: &str) -> Result<bool> {
        let observer = self.observer.clone();
        let outcome = self
            .oauth
            .refresh_session(&self.session, stale_token, move |token| {
                if let Some(observer) = observer {
                    observer.token_refreshed(token);
                }
            })
            .await?;

        if let RefreshOutcome::Rejected { status, .. } = &outcome {
            debug!(status, "Refresh rejected by token endpoint");
        }

        Ok(outcome.is_refreshed())
    }
}
