use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access/refresh token pair for one provider.
///
/// Instances are replaced wholesale on refresh or re-authentication and are
/// never mutated in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub access_token_expiry: DateTime<Utc>,
    pub refresh_token_expiry: DateTime<Utc>,
}

impl TokenData {
    #[must_use]
    pub fn access_token_is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.access_token_expiry
    }

    #[must_use]
    pub fn refresh_token_is_valid(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.is_some() && now < self.refresh_token_expiry
    }
}

impl fmt::Debug for TokenData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenData")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Where a provider's token sits in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    NoToken,
    Valid,
    AccessExpired,
    BothExpired,
}

impl TokenStatus {
    #[must_use]
    pub fn of(current: Option<&TokenData>, now: DateTime<Utc>) -> Self {
        match current {
            None => TokenStatus::NoToken,
            Some(token) if token.access_token_is_valid(now) => TokenStatus::Valid,
            Some(token) if token.refresh_token_is_valid(now) => TokenStatus::AccessExpired,
            Some(_) => TokenStatus::BothExpired,
        }
    }
}
