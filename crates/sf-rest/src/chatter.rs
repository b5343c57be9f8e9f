//! The Chatter client entry point.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};

use chatter_sf_auth::{parse_sfdx_auth_url, ClientCredentials, OAuthClient, Session};
use chatter_sf_client::{ClientConfig, SfHttpClient};

use crate::dispatcher::{Dispatcher, DEFAULT_MAX_RETRIES};
use crate::error::{Error, ErrorKind, Result};
use crate::observer::TokenObserver;
use crate::resource::Resource;

/// Chatter REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v24.0";

/// Environment variable overriding the API version in [`Chatter::from_env`].
pub const API_VERSION_ENV: &str = "SF_CHATTER_API_VERSION";

/// Client for the Salesforce Chatter REST API.
///
/// Every path starts at `services/data/{version}/chatter` on the session's
/// instance. Calls that come back with `INVALID_SESSION_ID` trigger one
/// token refresh and a retry; the refreshed token is shared by every
/// resource derived from this client.
///
/// # Example
///
/// ```rust,ignore
/// use chatter_sf_auth::{ClientCredentials, Session};
/// use chatter_sf_rest::{Chatter, Fields};
///
/// let credentials = ClientCredentials::new("client-id", "client-secret");
/// let session = Session::new("https://na1.salesforce.com", "access-token")
///     .with_refresh_token("refresh-token");
///
/// let chatter = Chatter::builder(credentials, session)
///     .with_token_observer(|token: &str| save_token(token))
///     .build()?;
///
/// let me = chatter.segment("users").segment("me").get(Fields::new()).await?;
/// println!("{} {}", me.status, me.body["name"]);
/// ```
#[derive(Clone)]
pub struct Chatter {
    dispatcher: Arc<Dispatcher>,
    api_version: String,
    root: Resource,
}

impl fmt::Debug for Chatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chatter")
            .field("api_version", &self.api_version)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl Chatter {
    /// Create a client with default settings.
    pub fn new(credentials: ClientCredentials, session: impl Into<Arc<Session>>) -> Result<Self> {
        Self::builder(credentials, session).build()
    }

    pub fn builder(
        credentials: ClientCredentials,
        session: impl Into<Arc<Session>>,
    ) -> ChatterBuilder {
        ChatterBuilder::new(credentials, session.into())
    }

    /// Create a client from environment variables.
    ///
    /// Credentials and session come from `SF_CLIENT_ID`, `SF_CLIENT_SECRET`,
    /// `SF_INSTANCE_URL`, `SF_ACCESS_TOKEN` and (optionally)
    /// `SF_REFRESH_TOKEN`. `SF_CHATTER_API_VERSION` overrides the API version.
    pub fn from_env() -> Result<Self> {
        let credentials = ClientCredentials::from_env()?;
        let session = Session::from_env()?;

        let mut builder = Self::builder(credentials, session);
        if let Ok(version) = std::env::var(API_VERSION_ENV) {
            if !version.is_empty() {
                builder = builder.with_api_version(version);
            }
        }
        builder.build()
    }

    /// Create a client from an SFDX auth URL
    /// (`force://<client_id>:<client_secret>:<refresh_token>@<instance>`).
    ///
    /// The URL carries no access token, so one is fetched before returning.
    pub async fn from_sfdx_auth_url(auth_url: &str) -> Result<Self> {
        let (credentials, session) = parse_sfdx_auth_url(auth_url)?;
        Self::builder(credentials, session).connect().await
    }

    pub(crate) fn from_dispatcher(dispatcher: Arc<Dispatcher>, api_version: String) -> Self {
        let root_segments = ["services", "data", api_version.as_str(), "chatter"]
            .into_iter()
            .map(String::from)
            .collect();
        let root = Resource::new(dispatcher.clone(), root_segments);
        Self {
            dispatcher,
            api_version,
            root,
        }
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<Session> {
        self.dispatcher.session()
    }

    /// The current access token.
    pub fn access_token(&self) -> String {
        self.session().access_token()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The root resource, `services/data/{version}/chatter`.
    pub fn root(&self) -> &Resource {
        &self.root
    }

    /// Start a path below the root. Underscores become hyphens.
    pub fn segment(&self, name: impl AsRef<str>) -> Resource {
        self.root.segment(name)
    }

    /// Start a path below the root with a value. Underscores become hyphens.
    pub fn value(&self, value: impl fmt::Display) -> Resource {
        self.root.value(value)
    }

    /// Alias of [`Chatter::value`].
    pub fn by(&self, value: impl fmt::Display) -> Resource {
        self.root.value(value)
    }

    /// Force a token refresh outside of the retry path.
    ///
    /// Returns true if the session now holds a new access token. The token
    /// observer is notified on success.
    #[instrument(skip(self))]
    pub async fn refresh_access_token(&self) -> Result<bool> {
        let stale = self.access_token();
        self.dispatcher.refresh(&stale).await
    }
}

/// Builder for [`Chatter`].
pub struct ChatterBuilder {
    credentials: ClientCredentials,
    session: Arc<Session>,
    api_version: String,
    max_retries: u32,
    observer: Option<Arc<dyn TokenObserver>>,
    http: Option<SfHttpClient>,
    config: ClientConfig,
    token_url: Option<String>,
}

impl fmt::Debug for ChatterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatterBuilder")
            .field("credentials", &self.credentials)
            .field("session", &self.session)
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .field("observer", &self.observer.is_some())
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl ChatterBuilder {
    fn new(credentials: ClientCredentials, session: Arc<Session>) -> Self {
        Self {
            credentials,
            session,
            api_version: DEFAULT_API_VERSION.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            observer: None,
            http: None,
            config: ClientConfig::default(),
            token_url: None,
        }
    }

    /// Set the API version, e.g. `v58.0`. A bare `58.0` gets the `v` prefix.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.api_version = if version.starts_with('v') {
            version
        } else {
            format!("v{version}")
        };
        self
    }

    /// Total attempts per call, including the first. Values below 1 are
    /// treated as 1, which disables the retry.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Register a callback for refreshed access tokens.
    pub fn with_token_observer(mut self, observer: impl TokenObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Use an existing HTTP client. Takes precedence over [`with_config`](Self::with_config).
    pub fn with_http_client(mut self, http: SfHttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the OAuth token endpoint (sandboxes, My Domain, tests).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    pub fn build(self) -> Result<Chatter> {
        let http = match self.http {
            Some(http) => http,
            None => SfHttpClient::new(self.config)?,
        };

        let mut oauth = OAuthClient::with_http_client(self.credentials, http.clone());
        if let Some(token_url) = self.token_url {
            oauth = oauth.with_token_url(token_url);
        }

        let dispatcher = Dispatcher::new(
            http,
            oauth,
            self.session,
            self.observer,
            self.max_retries,
        );

        Ok(Chatter::from_dispatcher(
            Arc::new(dispatcher),
            self.api_version,
        ))
    }

    /// Build the client and fetch a fresh access token before returning.
    ///
    /// Fails if the token endpoint does not hand out a token.
    pub async fn connect(self) -> Result<Chatter> {
        let chatter = self.build()?;
        if !chatter.refresh_access_token().await? {
            return Err(Error::new(ErrorKind::Auth(
                "token endpoint did not return an access token".to_string(),
            )));
        }
        info!(instance_url = %chatter.session().instance_url(), "Connected to Chatter");
        Ok(chatter)
    }
}
