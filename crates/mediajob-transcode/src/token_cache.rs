//! Token caching for Azure AD client-credential authentication.
//!
//! Provides a thread-safe, async-aware token cache with:
//! - Refresh margin to avoid token expiry during requests
//! - Single-flight refresh so concurrent jobs share one token request
//! - Fallback to the existing token while it is still usable

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{TranscodeError, TranscodeResult};

// =============================================================================
// Constants
// =============================================================================

/// Refresh margin: refresh token 60 seconds before expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Conservative token TTL when the response carries no expiry (50 minutes).
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

// =============================================================================
// Credentials
// =============================================================================

/// Service principal used to obtain management-plane tokens.
#[derive(Debug, Clone)]
pub struct AadCredentials {
    /// Authority base URL, e.g. `https://login.microsoftonline.com`
    pub aad_endpoint: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Resource the token is issued for
    pub audience: String,
}

impl AadCredentials {
    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/token",
            self.aad_endpoint.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default, deserialize_with = "lenient_seconds")]
    expires_in: Option<u64>,
}

/// AAD v1 endpoints report `expires_in` as a string, v2 as a number.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Seconds>::deserialize(deserializer)? {
        Some(Seconds::Number(n)) => Some(n),
        Some(Seconds::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

// =============================================================================
// Token Cache
// =============================================================================

/// Cached token with expiration tracking.
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Check if token is still valid with refresh margin.
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    /// Check if token is technically still usable (even if refresh is needed).
    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe token cache with single-flight refresh.
pub struct TokenCache {
    http: Client,
    credentials: AadCredentials,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(http: Client, credentials: AadCredentials) -> Self {
        Self {
            http,
            credentials,
            cache: RwLock::new(None),
        }
    }

    /// Invalidate the cached token.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_token(&self) -> TranscodeResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.access_token.clone());
            }
        }

        self.refresh_token(&mut cache).await
    }

    async fn refresh_token(&self, cache: &mut Option<CachedToken>) -> TranscodeResult<String> {
        match self.request_token().await {
            Ok(token) => {
                let ttl = token
                    .expires_in
                    .map(Duration::from_secs)
                    .unwrap_or(TOKEN_DEFAULT_TTL);

                *cache = Some(CachedToken {
                    access_token: token.access_token.clone(),
                    expires_at: Instant::now() + ttl,
                });

                debug!(ttl_secs = ttl.as_secs(), "Refreshed management auth token");
                Ok(token.access_token)
            }
            Err(e) => {
                if let Some(cached) = cache.as_ref() {
                    if cached.is_usable() {
                        warn!("Token refresh failed, using existing token: {}", e);
                        return Ok(cached.access_token.clone());
                    }
                }

                Err(TranscodeError::auth_error(format!(
                    "Failed to obtain auth token: {}",
                    e
                )))
            }
        }
    }

    async fn request_token(&self) -> TranscodeResult<TokenResponse> {
        let creds = &self.credentials;
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("resource", creds.audience.as_str()),
        ];

        let response = self.http.post(creds.token_url()).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscodeError::auth_error(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
