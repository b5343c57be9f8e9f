//! Client credentials and the shared session record.
//!
//! All credential types implement custom Debug to redact sensitive data.

use std::sync::{PoisonError, RwLock};

use tokio::sync::Mutex;

use crate::error::{Error, ErrorKind, Result};

/// Connected-app credentials used only for the refresh-token grant.
///
/// The client secret is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ClientCredentials {
    /// Create credentials from a consumer key and secret.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// The consumer key.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The consumer secret.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Load credentials from environment variables.
    ///
    /// Required environment variables:
    /// - `SF_CLIENT_ID` or `SALESFORCE_CLIENT_ID`
    /// - `SF_CLIENT_SECRET` or `SALESFORCE_CLIENT_SECRET`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let client_id = lookup_either(&lookup, "SF_CLIENT_ID", "SALESFORCE_CLIENT_ID")?;
        let client_secret =
            lookup_either(&lookup, "SF_CLIENT_SECRET", "SALESFORCE_CLIENT_SECRET")?;
        Ok(Self::new(client_id, client_secret))
    }
}

/// Instance URL plus the access token shared by every resource derived from
/// one client.
///
/// The access token is the only mutable field. Writers go through
/// [`Session::set_access_token`]; the refresh-and-assign sequence is
/// serialized by an internal async lock so two concurrent refreshes cannot
/// interleave and leave a stale token behind.
///
/// Tokens are redacted in Debug output.
pub struct Session {
    instance_url: String,
    access_token: RwLock<String>,
    refresh_token: Option<String>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Session {
    /// Create a session for the given instance and access token.
    ///
    /// A trailing `/` on the instance URL is dropped.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: RwLock::new(access_token.into()),
            refresh_token: None,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Attach a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// The instance base URL, without a trailing slash.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// A snapshot of the current access token.
    pub fn access_token(&self) -> String {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The refresh token, if one was supplied.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Replace the access token. Last writer wins.
    pub fn set_access_token(&self, token: impl Into<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token.into();
    }

    pub(crate) fn refresh_lock(&self) -> &Mutex<()> {
        &self.refresh_lock
    }

    /// Load a session from environment variables.
    ///
    /// Required environment variables:
    /// - `SF_INSTANCE_URL` or `SALESFORCE_INSTANCE_URL`
    /// - `SF_ACCESS_TOKEN` or `SALESFORCE_ACCESS_TOKEN`
    ///
    /// Optional:
    /// - `SF_REFRESH_TOKEN` or `SALESFORCE_REFRESH_TOKEN`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let instance_url = lookup_either(&lookup, "SF_INSTANCE_URL", "SALESFORCE_INSTANCE_URL")?;
        let access_token = lookup_either(&lookup, "SF_ACCESS_TOKEN", "SALESFORCE_ACCESS_TOKEN")?;
        let refresh_token =
            lookup_either(&lookup, "SF_REFRESH_TOKEN", "SALESFORCE_REFRESH_TOKEN").ok();

        let mut session = Self::new(instance_url, access_token);
        if let Some(rt) = refresh_token {
            session = session.with_refresh_token(rt);
        }

        Ok(session)
    }
}

/// Parse an SFDX auth URL into client credentials and a session.
///
/// The SFDX auth URL format is:
/// - `force://<client_id>:<client_secret>:<refresh_token>@<instance_url>`
/// - `force://<client_id>::<refresh_token>@<instance_url>` (empty client_secret)
/// - `force://<client_id>:<client_secret>:<refresh_token>:<username>@<instance_url>`
///
/// The returned session carries the refresh token and an empty access token;
/// the first refresh fills it in.
pub fn parse_sfdx_auth_url(auth_url: &str) -> Result<(ClientCredentials, Session)> {
    let url = auth_url.strip_prefix("force://").ok_or_else(|| {
        Error::new(ErrorKind::InvalidInput(
            "Auth URL must start with force://".to_string(),
        ))
    })?;

    let (credentials_part, instance_url) = url.split_once('@').ok_or_else(|| {
        Error::new(ErrorKind::InvalidInput(
            "Invalid auth URL format: missing @".to_string(),
        ))
    })?;

    // client_id:client_secret:refresh_token[:username]
    let cred_parts: Vec<&str> = credentials_part.splitn(4, ':').collect();
    if cred_parts.len() < 3 {
        return Err(Error::new(ErrorKind::InvalidInput(
            "Invalid auth URL format: expected client_id:client_secret:refresh_token[:username]"
                .to_string(),
        )));
    }

    let client_id = cred_parts[0];
    let client_secret = cred_parts[1];
    let refresh_token = cred_parts[2];

    if client_id.is_empty() || refresh_token.is_empty() {
        return Err(Error::new(ErrorKind::InvalidCredentials(
            "client_id and refresh_token must not be empty".to_string(),
        )));
    }

    let instance_url = if instance_url.starts_with("http://") || instance_url.starts_with("https://")
    {
        instance_url.to_string()
    } else {
        format!("https://{instance_url}")
    };

    Ok((
        ClientCredentials::new(client_id, client_secret),
        Session::new(instance_url, "").with_refresh_token(refresh_token),
    ))
}

fn lookup_either(
    lookup: &impl Fn(&str) -> Option<String>,
    primary: &str,
    fallback: &str,
) -> Result<String> {
    lookup(primary)
        .or_else(|| lookup(fallback))
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::new(ErrorKind::EnvVar(primary.to_string())))
}
