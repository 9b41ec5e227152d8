use menumux_core::Provider;
use menumux_providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    /// A valid token could not be obtained; the provider call was never made.
    #[error("authentication with provider {provider} failed: {source}")]
    ProviderAuth {
        provider: Provider,
        #[source]
        source: ProviderError,
    },

    #[error("fetch from provider {provider} failed: {source}")]
    ProviderFetch {
        provider: Provider,
        #[source]
        source: ProviderError,
    },

    #[error("provider {provider} returned a payload its adapter could not read: {source}")]
    MalformedPayload {
        provider: Provider,
        #[source]
        source: ProviderError,
    },

    #[error("no provider returned any data")]
    NoProviderData,
}

impl AggregateError {
    /// The provider whose contribution failed, if the error is per-provider.
    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        match self {
            AggregateError::ProviderAuth { provider, .. }
            | AggregateError::ProviderFetch { provider, .. }
            | AggregateError::MalformedPayload { provider, .. } => Some(*provider),
            AggregateError::NoProviderData => None,
        }
    }

    /// Classifies a fetch-path failure: adapter errors become
    /// [`AggregateError::MalformedPayload`], everything else
    /// [`AggregateError::ProviderFetch`].
    pub(crate) fn from_fetch(provider: Provider, source: ProviderError) -> Self {
        match source {
            ProviderError::Malformed { .. } => AggregateError::MalformedPayload { provider, source },
            source => AggregateError::ProviderFetch { provider, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fetch_separates_malformed_payloads() {
        let malformed = ProviderError::Malformed {
            provider: Provider::B,
            context: "store".to_owned(),
            reason: "missing field `restaurant`".to_owned(),
        };
        assert!(matches!(
            AggregateError::from_fetch(Provider::B, malformed),
            AggregateError::MalformedPayload { provider: Provider::B, .. }
        ));

        let not_found = ProviderError::NotFound {
            url: "http://b/stores/1".to_owned(),
        };
        let err = AggregateError::from_fetch(Provider::B, not_found);
        assert!(matches!(err, AggregateError::ProviderFetch { .. }));
        assert_eq!(err.provider(), Some(Provider::B));
    }

    #[test]
    fn no_provider_data_has_no_provider() {
        assert_eq!(AggregateError::NoProviderData.provider(), None);
        assert_eq!(
            AggregateError::NoProviderData.to_string(),
            "no provider returned any data"
        );
    }
}
