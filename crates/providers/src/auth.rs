//! OAuth token caching for the Sentinel Hub clients.
//!
//! The cache is single-flight: the slot's mutex is held across the refresh,
//! so concurrent callers either reuse the cached token or wait for the one
//! in-progress refresh instead of stampeding the token endpoint.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;

use burn_plan_core::SourceError;

use crate::config::ProviderConfig;

/// Tokens are treated as expired this long before the provider says so,
/// so a token handed out here never dies mid-request.
const EXPIRY_BUFFER: Duration = Duration::from_secs(300);

/// A token fresh from the provider, with its advertised lifetime.
pub struct FreshToken {
    pub token: String,
    pub expires_in_secs: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// A cached bearer token with buffered expiry.
#[derive(Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token, or run `refresh` under the lock and cache
    /// its result. A failed refresh leaves the slot empty, so every waiting
    /// caller observes the error and the next call retries.
    pub fn token_with<F>(&self, refresh: F) -> Result<String, SourceError>
    where
        F: FnOnce() -> Result<FreshToken, SourceError>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        *slot = None;
        let fresh = refresh()?;
        let lifetime = Duration::from_secs(fresh.expires_in_secs).saturating_sub(EXPIRY_BUFFER);
        *slot = Some(CachedToken {
            token: fresh.token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(fresh.token)
    }

    /// Drop the cached token so the next caller refreshes.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Client-credentials auth against the Sentinel Hub token endpoint.
pub struct SentinelAuth {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cache: TokenCache,
}

impl SentinelAuth {
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            token_url: format!("{}/oauth/token", config.sentinel_base_url),
            client_id: config.sentinel_client_id.clone(),
            client_secret: config.sentinel_client_secret.clone(),
            cache: TokenCache::new(),
        }
    }

    /// A bearer token valid for at least the expiry buffer.
    pub fn bearer_token(&self) -> Result<String, SourceError> {
        self.cache.token_with(|| {
            let response = self
                .client
                .post(&self.token_url)
                .form(&[
                    ("grant_type", "client_credentials"),
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                ])
                .send()
                .map_err(|err| SourceError::Auth(err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().unwrap_or_default();
                return Err(SourceError::Auth(format!(
                    "token request returned {status}: {detail}"
                )));
            }

            let body: TokenResponse = response
                .json()
                .map_err(|err| SourceError::Auth(err.to_string()))?;
            Ok(FreshToken {
                token: body.access_token,
                expires_in_secs: body.expires_in,
            })
        })
    }

    /// Drop the cached token after an authorization rejection.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }
}
