//! Process-wide access tokens, one slot per provider.
//!
//! Each slot sits behind its own async mutex that stays held while a token
//! is refreshed or recreated, so concurrent callers for the same provider
//! wait for the first caller's result instead of authenticating again.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use menumux_core::{Provider, TokenData, TokenStatus};
use menumux_providers::{normalize_token, ProviderClient};
use tokio::sync::Mutex;

use crate::error::AggregateError;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct TokenStore<C> {
    client: Arc<C>,
    slots: [Mutex<Option<TokenData>>; 3],
    default_ttl: Duration,
    clock: Clock,
}

impl<C: ProviderClient> TokenStore<C> {
    /// `default_ttl` is the lifetime assumed for tokens whose payload
    /// carries no expiry.
    #[must_use]
    pub fn new(client: Arc<C>, default_ttl: Duration) -> Self {
        Self {
            client,
            slots: [Mutex::new(None), Mutex::new(None), Mutex::new(None)],
            default_ttl,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for expiry checks.
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Installs a previously obtained token, e.g. one restored at startup.
    pub async fn seed(&self, provider: Provider, token: TokenData) {
        *self.slots[provider.index()].lock().await = Some(token);
    }

    /// The token currently held for `provider`, valid or not.
    pub async fn current(&self, provider: Provider) -> Option<TokenData> {
        self.slots[provider.index()].lock().await.clone()
    }

    /// Returns a token whose access half is valid right now.
    ///
    /// A valid token is returned as is. An expired access token with a
    /// still-valid refresh token is refreshed; anything else triggers a full
    /// authentication. The new token replaces the stored one wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::ProviderAuth`] if the refresh or
    /// authentication call fails or its response cannot be decoded. The
    /// stored token is left untouched and no retry is attempted here.
    pub async fn get_valid_token(&self, provider: Provider) -> Result<TokenData, AggregateError> {
        let mut slot = self.slots[provider.index()].lock().await;
        let now = (self.clock)();

        let raw = match slot.as_ref() {
            Some(token) if token.access_token_is_valid(now) => return Ok(token.clone()),
            Some(TokenData {
                refresh_token: Some(refresh_token),
                refresh_token_expiry,
                ..
            }) if now < *refresh_token_expiry => {
                tracing::info!(provider = %provider, "access token expired, refreshing");
                self.client.refresh(provider, refresh_token).await
            }
            current => {
                tracing::info!(
                    provider = %provider,
                    status = ?TokenStatus::of(current, now),
                    "creating new token"
                );
                self.client.authenticate(provider).await
            }
        }
        .map_err(|source| AggregateError::ProviderAuth { provider, source })?;

        let token = normalize_token(provider, &raw, (self.clock)(), self.default_ttl)
            .map_err(|source| AggregateError::ProviderAuth { provider, source })?;
        *slot = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
#[path = "token_store_test.rs"]
mod tests;
