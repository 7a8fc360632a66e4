//! Service account authentication for the Sheets API.
//!
//! A signed JWT assertion is exchanged for a short-lived OAuth access token,
//! which is reused until shortly before it expires.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::SheetsError;

/// Endpoint that trades a signed assertion for an access token.
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Read/write scope over spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on one token exchange. Callers queue on the cache lock meanwhile.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The two fields of a service account key the adapter needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccountKey {
    /// Reads a downloaded service account JSON key.
    pub fn from_file(path: &Path) -> Result<Self, SheetsError> {
        if !path.exists() {
            return Err(SheetsError::Credentials {
                message: format!("Key file does not exist: {}", path.display()),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| SheetsError::Credentials {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        serde_json::from_str(&content).map_err(|e| SheetsError::Credentials {
            message: format!("Failed to parse {}: {e}", path.display()),
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Hands out bearer tokens for the configured service account.
pub struct TokenProvider {
    http: Client,
    key: Option<ServiceAccountKey>,
    token: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// `key` may be `None` when no credentials were configured; every token
    /// request then fails with [`SheetsError::Credentials`].
    pub fn new(http: Client, key: Option<ServiceAccountKey>) -> Self {
        Self {
            http,
            key,
            token: Mutex::new(None),
        }
    }

    /// Returns a valid access token, fetching a new one when needed.
    ///
    /// The cache lock is held through a refresh, so concurrent callers wait for
    /// a single exchange bounded by `TOKEN_REQUEST_TIMEOUT`.
    pub async fn access_token(&self) -> Result<String, SheetsError> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, SheetsError> {
        let key = self.key.as_ref().ok_or_else(|| SheetsError::Credentials {
            message: "GOOGLE_CLIENT_EMAIL / GOOGLE_PRIVATE_KEY are not set".to_string(),
        })?;

        let assertion = sign_assertion(key, Utc::now().timestamp())?;
        debug!(client_email = %key.client_email, "Requesting access token");

        let response = self.token_request(&assertion).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Auth {
                message: format!("token endpoint returned {status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        info!(expires_in = token.expires_in, "Obtained Sheets access token");

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    fn token_request(&self, assertion: &str) -> RequestBuilder {
        self.http
            .post(TOKEN_URI)
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion),
            ])
    }
}

/// Builds the RS256-signed assertion for the token exchange.
fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, SheetsError> {
    if key.client_email.is_empty() || key.private_key.is_empty() {
        return Err(SheetsError::Credentials {
            message: "client email and private key must both be non-empty".to_string(),
        });
    }

    let claims = Claims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: TOKEN_URI,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;

    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &encoding_key,
    )?)
}

/// Turns a private key copied into an env var back into PEM.
///
/// Keys that already contain real newlines are only trimmed; otherwise every
/// literal `\n` sequence becomes a newline.
pub fn normalize_private_key(raw: &str) -> String {
    if raw.contains('\n') {
        raw.trim().to_string()
    } else {
        raw.replace("\\n", "\n").trim().to_string()
    }
}
