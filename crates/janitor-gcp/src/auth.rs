//! Service account authentication
//!
//! Credentials are read from a service account JSON keyfile when a client is
//! built. Access tokens are fetched lazily, on the first request that needs
//! one, by exchanging a signed RS256 JWT assertion at the key's `token_uri`.
//!
//! # Security
//!
//! The private key never appears in logs, errors or `Debug` output.

use crate::session::HttpSession;
use janitor_core::{Error, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Token endpoint used when the keyfile does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Scope requested when none is configured
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for an assertion
const ASSERTION_TTL_SECS: u64 = 3600;

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Service account credentials from a JSON keyfile
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Key type; must be `service_account` when present
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    /// Service account email, the assertion issuer
    pub client_email: String,
    /// PEM-encoded RSA private key
    private_key: String,
    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Project the key was issued in
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl Credentials {
    /// Load credentials from a keyfile
    ///
    /// Local file I/O only.
    pub fn from_keyfile(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::auth(format!("Unable to read keyfile {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw).map_err(|e| match e {
            Error::Auth(msg) => Error::auth(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Parse credentials from keyfile contents
    pub fn from_json(raw: &str) -> Result<Self> {
        let creds: Credentials = serde_json::from_str(raw)
            .map_err(|e| Error::auth(format!("Invalid service account keyfile: {e}")))?;

        if let Some(kind) = creds.key_type.as_deref()
            && kind != "service_account"
        {
            return Err(Error::auth(format!(
                "Unsupported credentials type \"{kind}\"; a service account key is required"
            )));
        }
        if creds.private_key.is_empty() {
            return Err(Error::auth("Service account keyfile has an empty private key"));
        }

        Ok(creds)
    }
}

// Custom Debug implementation that hides the private key
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<REDACTED>")
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// Issues access tokens for a service account
pub struct AuthClient {
    credentials: Credentials,
    scopes: Vec<String>,
    session: Arc<HttpSession>,
    token: Mutex<Option<CachedToken>>,
}

impl AuthClient {
    /// Create an auth client
    ///
    /// An empty `scopes` list falls back to [`DEFAULT_SCOPES`].
    pub fn new(credentials: Credentials, scopes: Vec<String>, session: Arc<HttpSession>) -> Self {
        let scopes = if scopes.is_empty() {
            DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
        } else {
            scopes
        };

        Self {
            credentials,
            scopes,
            session,
            token: Mutex::new(None),
        }
    }

    /// Credentials in use
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Scopes requested for tokens
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Session token requests are sent over
    pub fn session(&self) -> &Arc<HttpSession> {
        &self.session
    }

    /// Current access token, fetching a new one if needed
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let assertion = self.assertion()?;
        let response = self
            .session
            .client()?
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| Error::http(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::auth(format!("Token exchange failed: {status} - {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Failed to parse token response: {e}")))?;

        let ttl = Duration::from_secs(token.expires_in.unwrap_or(ASSERTION_TTL_SECS));
        tracing::debug!(
            account = %self.credentials.client_email,
            ttl_secs = ttl.as_secs(),
            "Fetched access token"
        );

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + ttl,
        });
        Ok(value)
    }

    fn assertion(&self) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let claims = Claims {
            iss: &self.credentials.client_email,
            scope: self.scopes.join(" "),
            aud: &self.credentials.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| Error::auth(format!("Invalid service account private key: {e}")))?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| Error::auth(format!("Failed to sign token assertion: {e}")))
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("credentials", &self.credentials)
            .field("scopes", &self.scopes)
            .finish()
    }
}
