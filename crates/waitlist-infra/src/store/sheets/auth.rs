//! OAuth2 service-account authentication for the Google Sheets API.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::SheetsError;

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before Google says they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for Sheets API calls.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, SheetsError>;
}

/// A pre-issued token, e.g. from `gcloud auth print-access-token`.
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.expose_secret().to_string())
    }
}

/// The fields of a Google service-account key file this client needs.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    pub async fn from_file(path: &Path) -> Result<Self, SheetsError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            SheetsError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            SheetsError::Credentials(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}

/// JWT claims of the service-account assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    refresh_at: chrono::DateTime<Utc>,
}

/// Exchanges signed RS256 assertions for access tokens and caches them
/// until shortly before they expire.
pub struct ServiceAccountTokenSource {
    client_email: String,
    token_uri: String,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| SheetsError::Credentials(format!("invalid private key: {}", e)))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client_email: key.client_email,
            token_uri: key.token_uri,
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    fn sign_assertion(&self) -> Result<String, SheetsError> {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + TimeDelta::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    async fn fetch_token(&self) -> Result<CachedToken, SheetsError> {
        let assertion = self.sign_assertion()?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "Obtained Google access token");

        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Utc::now() + TimeDelta::seconds(token.expires_in - EXPIRY_MARGIN_SECS),
        })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, SheetsError> {
        // Held across the fetch so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.refresh_at > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
