use menumux_core::Provider;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by provider {provider} (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: Provider,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A payload decoded as JSON but lacks the fields the provider's adapter needs.
    #[error("malformed provider {provider} payload for {context}: {reason}")]
    Malformed {
        provider: Provider,
        context: String,
        reason: String,
    },

    #[error("provider {0} is not configured")]
    NotConfigured(Provider),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl ProviderError {
    pub(crate) fn malformed(
        provider: Provider,
        context: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        ProviderError::Malformed {
            provider,
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}
