use std::time::Duration;

use menumux_core::{AppConfig, ItemKeys, Provider, ProviderMap, ProviderSettings, StoreKind};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::{json, Value};

use super::ProviderClient;
use crate::error::ProviderError;
use crate::retry::retry_with_backoff;

struct Endpoint {
    base_url: Url,
    client_id: Option<String>,
    secret: Option<String>,
}

/// [`ProviderClient`] over HTTP/JSON.
///
/// Each configured provider is addressed relative to its own base URL:
///
/// | call | request |
/// |------|---------|
/// | store | `GET {base}/stores/{id}` |
/// | retail store | `GET {base}/stores/{id}/retail` |
/// | item detail | `GET {base}/items/{id}?store_id=&section_id=&subsection_id=` |
/// | authenticate | `POST {base}/auth` |
/// | refresh | `POST {base}/auth/refresh` |
///
/// Transient failures (429, network errors, 5xx) are retried with
/// exponential back-off up to `max_retries` additional attempts.
pub struct HttpProviderClient {
    client: Client,
    endpoints: ProviderMap<Endpoint>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpProviderClient {
    /// Creates a client for every provider present in `providers`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ProviderError::InvalidBaseUrl`] if a base
    /// URL does not parse or cannot carry a path.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        providers: &ProviderMap<ProviderSettings>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let mut endpoints = ProviderMap::new();
        for (provider, settings) in providers.iter() {
            endpoints.set(provider, Endpoint::from_settings(settings)?);
        }

        Ok(Self {
            client,
            endpoints,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Creates a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpProviderClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
            &config.providers,
        )
    }

    fn endpoint(&self, provider: Provider) -> Result<&Endpoint, ProviderError> {
        self.endpoints
            .get(provider)
            .ok_or(ProviderError::NotConfigured(provider))
    }

    /// Appends `segments` to the provider's base path, percent-encoding each.
    fn url(&self, provider: Provider, segments: &[&str]) -> Result<Url, ProviderError> {
        let base = &self.endpoint(provider)?.base_url;
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::InvalidBaseUrl {
                base_url: base.to_string(),
                reason: "URL cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends the request produced by `build`, rebuilding it for every retry.
    async fn execute<F>(&self, provider: Provider, build: F) -> Result<Value, ProviderError>
    where
        F: Fn() -> RequestBuilder + Sync,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = build();
            async move {
                let response = request.send().await?;
                read_json(provider, response).await
            }
        })
        .await
    }
}

impl Endpoint {
    fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidBaseUrl {
                base_url: settings.base_url.clone(),
                reason: "URL cannot be a base".to_owned(),
            });
        }
        Ok(Self {
            base_url,
            client_id: settings.client_id.clone(),
            secret: settings.secret.clone(),
        })
    }
}

/// `Authorization` scheme each provider expects in front of its token.
fn auth_scheme(provider: Provider) -> Option<&'static str> {
    match provider {
        Provider::A => None,
        Provider::B => Some("Bearer"),
        Provider::C => Some("JWT"),
    }
}

fn with_auth(request: RequestBuilder, provider: Provider, token: Option<&str>) -> RequestBuilder {
    match (auth_scheme(provider), token) {
        (Some(scheme), Some(token)) => {
            request.header(reqwest::header::AUTHORIZATION, format!("{scheme} {token}"))
        }
        _ => request,
    }
}

/// Maps the response status onto [`ProviderError`] and parses a 2xx body.
async fn read_json(provider: Provider, response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    let url = response.url().to_string();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ProviderError::RateLimited {
            provider,
            retry_after_secs,
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound { url });
    }

    if !status.is_success() {
        return Err(ProviderError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
        context: url,
        source: e,
    })
}

impl ProviderClient for HttpProviderClient {
    async fn fetch_store(
        &self,
        provider: Provider,
        native_id: &str,
        kind: StoreKind,
        access_token: Option<&str>,
    ) -> Result<Value, ProviderError> {
        let url = match kind {
            StoreKind::Restaurant => self.url(provider, &["stores", native_id])?,
            StoreKind::Retail => self.url(provider, &["stores", native_id, "retail"])?,
        };
        tracing::debug!(provider = %provider, %url, "fetching store");

        self.execute(provider, || {
            with_auth(self.client.get(url.clone()), provider, access_token)
        })
        .await
    }

    async fn fetch_item_detail(
        &self,
        provider: Provider,
        native_id: &str,
        keys: &ItemKeys,
        access_token: Option<&str>,
    ) -> Result<Value, ProviderError> {
        let mut url = self.url(provider, &["items", native_id])?;
        {
            let params = [
                ("store_id", &keys.store_id),
                ("section_id", &keys.section_id),
                ("subsection_id", &keys.subsection_id),
            ];
            if params.iter().any(|(_, v)| v.is_some()) {
                let mut pairs = url.query_pairs_mut();
                for (name, value) in params {
                    if let Some(value) = value {
                        pairs.append_pair(name, value);
                    }
                }
            }
        }
        tracing::debug!(provider = %provider, %url, "fetching item detail");

        self.execute(provider, || {
            with_auth(self.client.get(url.clone()), provider, access_token)
        })
        .await
    }

    async fn authenticate(&self, provider: Provider) -> Result<Value, ProviderError> {
        let url = self.url(provider, &["auth"])?;
        let endpoint = self.endpoint(provider)?;
        let body = json!({
            "client_id": endpoint.client_id,
            "secret": endpoint.secret,
        });
        tracing::debug!(provider = %provider, "authenticating");

        self.execute(provider, || self.client.post(url.clone()).json(&body))
            .await
    }

    async fn refresh(
        &self,
        provider: Provider,
        refresh_token: &str,
    ) -> Result<Value, ProviderError> {
        let url = self.url(provider, &["auth", "refresh"])?;
        let endpoint = self.endpoint(provider)?;
        let body = json!({
            "client_id": endpoint.client_id,
            "refresh_token": refresh_token,
        });
        tracing::debug!(provider = %provider, "refreshing token");

        self.execute(provider, || self.client.post(url.clone()).json(&body))
            .await
    }
}
