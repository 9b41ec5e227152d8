//! Fan-out / fan-in orchestration over the configured providers.

use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;
use menumux_core::{
    ItemDetail, ItemKeys, MergedDetailItem, Provider, ProviderMap, Store, StoreKind,
};
use menumux_providers::{adapter_for, normalize_item, normalize_store, ProviderClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AggregateError;
use crate::merge::{merge_item_details, merge_stores};
use crate::token_store::TokenStore;

/// One `{provider, nativeId}` pair of a store aggregation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub provider: Provider,
    #[serde(default, alias = "id")]
    pub native_id: Option<String>,
}

/// One provider's address for an item, plus any extra native keys the
/// provider needs to locate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub provider: Provider,
    #[serde(default, alias = "id")]
    pub native_id: Option<String>,
    #[serde(flatten)]
    pub keys: ItemKeys,
}

/// The merged item plus each contributing provider's payload exactly as
/// received, for follow-up calls that need fields the merge dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAggregate {
    pub merged: MergedDetailItem,
    pub originals: ProviderMap<Value>,
}

pub struct AggregationService<C> {
    client: Arc<C>,
    tokens: TokenStore<C>,
}

/// Treats a missing, empty, or literal `"null"` id as "not requested".
fn requested_id(native_id: Option<&str>) -> Option<&str> {
    native_id.filter(|id| !id.is_empty() && *id != "null")
}

/// Keeps the requests that carry an id, in input order, dropping repeats of
/// a provider already seen.
fn plan<'a, T>(
    requests: &'a [T],
    key: impl Fn(&'a T) -> (Provider, Option<&'a str>),
) -> Vec<(Provider, &'a str, &'a T)> {
    let mut seen = ProviderMap::new();
    let mut planned = Vec::with_capacity(requests.len());
    for request in requests {
        let (provider, native_id) = key(request);
        let Some(native_id) = requested_id(native_id) else {
            tracing::debug!(provider = %provider, "no native id, provider not requested");
            continue;
        };
        if seen.set(provider, ()).is_some() {
            tracing::warn!(provider = %provider, "provider listed twice, keeping the first entry");
            continue;
        }
        planned.push((provider, native_id, request));
    }
    planned
}

/// Splits settled per-provider results into successes, logging each
/// failure as a skipped contribution.
fn successes<T>(settled: Vec<(Provider, Result<T, AggregateError>)>) -> Vec<(Provider, T)> {
    settled
        .into_iter()
        .filter_map(|(provider, result)| match result {
            Ok(value) => Some((provider, value)),
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "provider contributed nothing");
                None
            }
        })
        .collect()
}

impl<C: ProviderClient> AggregationService<C> {
    #[must_use]
    pub fn new(client: Arc<C>, token_default_ttl: Duration) -> Self {
        let tokens = TokenStore::new(Arc::clone(&client), token_default_ttl);
        Self { client, tokens }
    }

    async fn access_token(&self, provider: Provider) -> Result<Option<String>, AggregateError> {
        if !adapter_for(provider).requires_auth() {
            return Ok(None);
        }
        let token = self.tokens.get_valid_token(provider).await?;
        Ok(Some(token.access_token))
    }

    async fn load_store(
        &self,
        provider: Provider,
        native_id: &str,
        kind: StoreKind,
    ) -> Result<Store, AggregateError> {
        let token = self.access_token(provider).await?;
        let raw = self
            .client
            .fetch_store(provider, native_id, kind, token.as_deref())
            .await
            .map_err(|e| AggregateError::from_fetch(provider, e))?;
        normalize_store(provider, kind, &raw).map_err(|e| AggregateError::from_fetch(provider, e))
    }

    async fn load_item(
        &self,
        provider: Provider,
        native_id: &str,
        keys: &ItemKeys,
    ) -> Result<(ItemDetail, Value), AggregateError> {
        let token = self.access_token(provider).await?;
        let raw = self
            .client
            .fetch_item_detail(provider, native_id, keys, token.as_deref())
            .await
            .map_err(|e| AggregateError::from_fetch(provider, e))?;
        let detail =
            normalize_item(provider, &raw).map_err(|e| AggregateError::from_fetch(provider, e))?;
        Ok((detail, raw))
    }

    /// Fetches, normalizes and merges one store across providers.
    ///
    /// All requested providers are fetched concurrently; the merge starts
    /// once every fetch has settled and uses the request order, so the
    /// first provider with an id is the default provider. A provider that
    /// fails at any step contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::NoProviderData`] when no request carries an
    /// id or every requested provider failed.
    pub async fn aggregate_store(
        &self,
        requests: &[StoreRequest],
        kind: StoreKind,
    ) -> Result<Store, AggregateError> {
        let planned = plan(requests, |r| (r.provider, r.native_id.as_deref()));
        let settled = join_all(planned.into_iter().map(|(provider, native_id, _)| async move {
            (provider, self.load_store(provider, native_id, kind).await)
        }))
        .await;

        merge_stores(successes(settled))
    }

    /// Fetches, normalizes and merges one item across providers.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::NoProviderData`] when no request carries an
    /// id or every requested provider failed.
    pub async fn aggregate_item(
        &self,
        requests: &[ItemRequest],
    ) -> Result<ItemAggregate, AggregateError> {
        let planned = plan(requests, |r| (r.provider, r.native_id.as_deref()));
        let settled = join_all(planned.into_iter().map(|(provider, native_id, request)| {
            async move {
                (
                    provider,
                    self.load_item(provider, native_id, &request.keys).await,
                )
            }
        }))
        .await;

        let loaded = successes(settled);
        if loaded.is_empty() {
            return Err(AggregateError::NoProviderData);
        }

        let mut originals = ProviderMap::new();
        let mut details = Vec::with_capacity(loaded.len());
        for (provider, (detail, raw)) in loaded {
            originals.set(provider, raw);
            details.push((provider, detail));
        }

        Ok(ItemAggregate {
            merged: merge_item_details(details),
            originals,
        })
    }
}
