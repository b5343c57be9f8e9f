//! OAuth 2.0 refresh-token flow.
//!
//! The refresh POST never triggers a nested refresh: it goes straight to the
//! transport, and an error-shaped response simply means "not refreshed".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use chatter_sf_client::{sanitize_error_message, ClientConfig, SfHttpClient};

use crate::credentials::{ClientCredentials, Session};
use crate::error::Result;
use crate::DEFAULT_TOKEN_URL;

/// OAuth client for refreshing Chatter access tokens.
#[derive(Clone)]
pub struct OAuthClient {
    credentials: ClientCredentials,
    token_url: String,
    http: SfHttpClient,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Create an OAuth client with a default HTTP client.
    pub fn new(credentials: ClientCredentials) -> Result<Self> {
        let http = SfHttpClient::new(ClientConfig::default())?;
        Ok(Self::with_http_client(credentials, http))
    }

    /// Create an OAuth client that shares an existing HTTP client.
    pub fn with_http_client(credentials: ClientCredentials, http: SfHttpClient) -> Self {
        Self {
            credentials,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            http,
        }
    }

    /// Point the client at a different token endpoint (e.g. a sandbox login host).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// The token endpoint in use.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// The connected-app credentials.
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// POST the refresh-token grant and return the raw `(status, body)`.
    ///
    /// The refresh_token parameter is not logged to prevent credential exposure.
    #[instrument(skip(self, refresh_token), fields(token_url = %self.token_url))]
    pub async fn request_refresh(&self, refresh_token: &str) -> Result<(u16, Value)> {
        let request = self.http.post(&self.token_url).form([
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
            ("format", "json"),
        ]);

        let (status, body) = self.http.send_value(&request).await?;
        Ok((status, body))
    }

    /// Refresh the session's access token.
    ///
    /// `stale_token` is the token the caller saw rejected. Refreshes are
    /// serialized per session; if another task already replaced the stale
    /// token while this one waited, no request is made and
    /// [`RefreshOutcome::AlreadyRefreshed`] is returned.
    ///
    /// On success the new token is written to the session and then
    /// `on_refreshed` runs with it, both while the refresh lock is held.
    ///
    /// Transport failures propagate; error-shaped responses do not.
    #[instrument(skip_all)]
    pub async fn refresh_session<F>(
        &self,
        session: &Session,
        stale_token: &str,
        on_refreshed: F,
    ) -> Result<RefreshOutcome>
    where
        F: FnOnce(&str),
    {
        let _guard = session.refresh_lock().lock().await;

        if session.access_token() != stale_token {
            debug!("Access token already replaced by a concurrent refresh");
            return Ok(RefreshOutcome::AlreadyRefreshed);
        }

        let Some(refresh_token) = session.refresh_token() else {
            warn!("Session has no refresh token; skipping refresh");
            return Ok(RefreshOutcome::NoRefreshToken);
        };

        let (status, body) = self.request_refresh(refresh_token).await?;

        match TokenResponse::from_body(&body) {
            Some(token) => {
                session.set_access_token(token.access_token.clone());
                info!(status, "Access token refreshed");
                on_refreshed(&token.access_token);
                Ok(RefreshOutcome::Refreshed(token))
            }
            None => {
                let (error, description) = rejection_details(&body);
                warn!(
                    status,
                    error = %error,
                    description = %description,
                    "Token endpoint did not return an access token"
                );
                Ok(RefreshOutcome::Rejected { status, body })
            }
        }
    }
}

/// `error` and sanitized `error_description` of a token endpoint rejection.
fn rejection_details(body: &Value) -> (String, String) {
    let field = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default();
    let error = match field("error") {
        "" => "unknown".to_string(),
        error => error.to_string(),
    };
    (error, sanitize_error_message(field("error_description")))
}

/// Result of a refresh attempt.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// A new access token was obtained and stored in the session.
    Refreshed(TokenResponse),
    /// Another task refreshed the session while this one waited.
    AlreadyRefreshed,
    /// The token endpoint answered without an `access_token`.
    Rejected { status: u16, body: Value },
    /// The session carries no refresh token, so nothing was sent.
    NoRefreshToken,
}

impl RefreshOutcome {
    /// Returns true if the session now holds a token newer than the stale one.
    pub fn is_refreshed(&self) -> bool {
        matches!(
            self,
            RefreshOutcome::Refreshed(_) | RefreshOutcome::AlreadyRefreshed
        )
    }
}

/// Token response from OAuth.
///
/// Sensitive fields like `access_token` and `refresh_token` are redacted
/// in Debug output to prevent accidental exposure in logs.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token (rarely returned by the refresh grant).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Instance URL.
    #[serde(default)]
    pub instance_url: Option<String>,
    /// User ID URL.
    #[serde(default)]
    pub id: Option<String>,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Scopes granted.
    #[serde(default)]
    pub scope: Option<String>,
    /// Signature for verification.
    #[serde(default)]
    pub signature: Option<String>,
    /// Issued at timestamp.
    #[serde(default)]
    pub issued_at: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("instance_url", &self.instance_url)
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("signature", &self.signature.as_ref().map(|_| "[REDACTED]"))
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl TokenResponse {
    /// Read a token response out of a parsed body.
    ///
    /// Returns `None` unless the body carries a string `access_token`. The
    /// other fields are optional and taken only when they hold a string or
    /// a number; anything else in the body is ignored.
    pub fn from_body(body: &Value) -> Option<Self> {
        let access_token = body.get("access_token")?.as_str()?.to_string();
        let text = |key: &str| match body.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };

        Some(Self {
            access_token,
            refresh_token: text("refresh_token"),
            instance_url: text("instance_url"),
            id: text("id"),
            token_type: text("token_type"),
            scope: text("scope"),
            signature: text("signature"),
            issued_at: text("issued_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oauth_client(server: &MockServer) -> OAuthClient {
        OAuthClient::new(ClientCredentials::new("client_id_1", "client_secret_1"))
            .unwrap()
            .with_token_url(format!("{}/services/oauth2/token", server.uri()))
    }

    #[test]
    fn test_default_token_url() {
        let client = OAuthClient::new(ClientCredentials::new("id", "secret")).unwrap();
        assert_eq!(
            client.token_url(),
            "https://na1.salesforce.com/services/oauth2/token"
        );
    }

    #[test]
    fn test_token_response_from_body() {
        let body = serde_json::json!({
            "access_token": "00Dxx!new",
            "instance_url": "https://na1.salesforce.com",
            "signature": "sig"
        });
        let token = TokenResponse::from_body(&body).unwrap();
        assert_eq!(token.access_token, "00Dxx!new");
        assert_eq!(token.instance_url.as_deref(), Some("https://na1.salesforce.com"));

        assert!(TokenResponse::from_body(&serde_json::json!({"error": "invalid_grant"})).is_none());
        assert!(TokenResponse::from_body(&serde_json::json!({"access_token": 42})).is_none());
        assert!(TokenResponse::from_body(&serde_json::json!([])).is_none());
    }

    #[test]
    fn test_token_response_tolerates_loose_field_types() {
        let body = serde_json::json!({
            "access_token": "00Dxx!new",
            "issued_at": 1700000000,
            "scope": ["api", "chatter_api"],
            "id": null,
            "is_readonly": true
        });
        let token = TokenResponse::from_body(&body).unwrap();
        assert_eq!(token.access_token, "00Dxx!new");
        assert_eq!(token.issued_at.as_deref(), Some("1700000000"));
        assert_eq!(token.scope, None);
        assert_eq!(token.id, None);
    }

    #[test]
    fn test_rejection_details_are_sanitized() {
        let body = serde_json::json!({
            "error": "invalid_grant",
            "error_description": "refresh_token=5Aep861secret is expired"
        });
        let (error, description) = rejection_details(&body);
        assert_eq!(error, "invalid_grant");
        assert!(description.contains("refresh_token=[REDACTED]"));
        assert!(!description.contains("5Aep861secret"));

        let (error, description) = rejection_details(&serde_json::json!("<html>"));
        assert_eq!(error, "unknown");
        assert_eq!(description, "");
    }

    #[test]
    fn test_token_response_debug_redacts_tokens() {
        let token = TokenResponse {
            access_token: "super_secret_access_token".to_string(),
            refresh_token: Some("super_secret_refresh_token".to_string()),
            instance_url: Some("https://na1.salesforce.com".to_string()),
            id: None,
            token_type: Some("Bearer".to_string()),
            scope: None,
            signature: Some("signature_value".to_string()),
            issued_at: None,
        };

        let debug_output = format!("{:?}", token);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_access_token"));
        assert!(!debug_output.contains("super_secret_refresh_token"));
        assert!(!debug_output.contains("signature_value"));
    }

    #[tokio::test]
    async fn test_refresh_session_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh_1"))
            .and(body_string_contains("client_id=client_id_1"))
            .and(body_string_contains("client_secret=client_secret_1"))
            .and(body_string_contains("format=json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh_token",
                "instance_url": "https://na1.salesforce.com"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = oauth_client(&mock_server);
        let session = Session::new("https://na1.salesforce.com", "stale_token")
            .with_refresh_token("refresh_1");

        let mut notified = Vec::new();
        let outcome = client
            .refresh_session(&session, "stale_token", |token| notified.push(token.to_string()))
            .await
            .unwrap();

        assert!(matches!(outcome, RefreshOutcome::Refreshed(_)));
        assert!(outcome.is_refreshed());
        assert_eq!(session.access_token(), "fresh_token");
        assert_eq!(notified, vec!["fresh_token".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_session_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "expired access/refresh token"
            })))
            .mount(&mock_server)
            .await;

        let client = oauth_client(&mock_server);
        let session = Session::new("https://na1.salesforce.com", "stale_token")
            .with_refresh_token("refresh_1");

        let mut calls = 0;
        let outcome = client
            .refresh_session(&session, "stale_token", |_| calls += 1)
            .await
            .unwrap();

        match outcome {
            RefreshOutcome::Rejected { status, ref body } => {
                assert_eq!(status, 400);
                assert_eq!(body["error"], "invalid_grant");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert!(!outcome.is_refreshed());
        assert_eq!(calls, 0);
        assert_eq!(session.access_token(), "stale_token");
    }

    #[tokio::test]
    async fn test_refresh_session_without_refresh_token_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = oauth_client(&mock_server);
        let session = Session::new("https://na1.salesforce.com", "stale_token");

        let outcome = client
            .refresh_session(&session, "stale_token", |_| {})
            .await
            .unwrap();

        assert!(matches!(outcome, RefreshOutcome::NoRefreshToken));
    }

    #[tokio::test]
    async fn test_refresh_session_skips_when_token_already_replaced() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = oauth_client(&mock_server);
        let session = Session::new("https://na1.salesforce.com", "newer_token")
            .with_refresh_token("refresh_1");

        let outcome = client
            .refresh_session(&session, "stale_token", |_| {})
            .await
            .unwrap();

        assert!(matches!(outcome, RefreshOutcome::AlreadyRefreshed));
        assert_eq!(session.access_token(), "newer_token");
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_issue_one_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh_token"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = oauth_client(&mock_server);
        let session = Arc::new(
            Session::new("https://na1.salesforce.com", "stale_token")
                .with_refresh_token("refresh_1"),
        );

        let (a, b) = tokio::join!(
            client.refresh_session(&session, "stale_token", |_| {}),
            client.refresh_session(&session, "stale_token", |_| {}),
        );

        let outcomes = [a.unwrap(), b.unwrap()];
        assert!(outcomes.iter().all(RefreshOutcome::is_refreshed));
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, RefreshOutcome::Refreshed(_)))
                .count(),
            1
        );
        assert_eq!(session.access_token(), "fresh_token");
    }

    #[tokio::test]
    async fn test_refresh_session_non_json_response_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let client = oauth_client(&mock_server);
        let session = Session::new("https://na1.salesforce.com", "stale_token")
            .with_refresh_token("refresh_1");

        let result = client.refresh_session(&session, "stale_token", |_| {}).await;
        assert!(result.is_err());
    }
}
