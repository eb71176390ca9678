use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fetch;
use super::types::TokenState;
use crate::config::Config;
use crate::error::AuthError;

/// Safety margin subtracted from a token's expiry; a cached token inside
/// this window is refreshed proactively.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Credential cache
/// Owns the current access token and refreshes it near expiry
pub struct AuthManager {
    /// Cached token, empty until the first successful fetch
    state: RwLock<Option<TokenState>>,

    /// HTTP client for token requests
    client: Client,

    config: Arc<Config>,
}

impl AuthManager {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        Self {
            state: RwLock::new(None),
            client,
            config,
        }
    }

    /// Get the current token and its expiry, refreshing if necessary.
    ///
    /// The read lock is released before the network call, so concurrent
    /// requests finding a stale cache may race the token endpoint; the last
    /// successful write wins. A failed fetch leaves the cache untouched and
    /// the next call retries.
    pub async fn token_state(&self) -> Result<TokenState, AuthError> {
        {
            let cached = self.state.read().await;
            if let Some(state) = cached.as_ref() {
                if state.is_fresh(REFRESH_MARGIN_SECS) {
                    tracing::debug!("using cached access token");
                    return Ok(state.clone());
                }
            }
        }

        let fresh = fetch::fetch_token(&self.client, &self.config).await?;

        let mut cached = self.state.write().await;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        self.token_state().await.map(|state| state.access_token)
    }

    #[cfg(test)]
    async fn seed(&self, state: TokenState) {
        *self.state.write().await = Some(state);
    }

    #[cfg(test)]
    async fn cached(&self) -> Option<TokenState> {
        self.state.read().await.clone()
    }
}
