//! Transport seam between the aggregation engine and provider APIs.
//!
//! Everything above this trait works with raw JSON values; only
//! implementations of [`ProviderClient`] know how requests are built.

mod http;

use std::future::Future;

use menumux_core::{ItemKeys, Provider, StoreKind};
use serde_json::Value;

use crate::error::ProviderError;

pub use http::HttpProviderClient;

/// Raw request capability for the three providers.
///
/// Implementations return the provider's JSON untouched; normalization is
/// the adapters' job. Credentials for [`ProviderClient::authenticate`] are
/// held by the implementation.
pub trait ProviderClient: Send + Sync {
    /// Fetches the raw store page for `native_id`.
    fn fetch_store(
        &self,
        provider: Provider,
        native_id: &str,
        kind: StoreKind,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;

    /// Fetches the raw detail payload for one item.
    fn fetch_item_detail(
        &self,
        provider: Provider,
        native_id: &str,
        keys: &ItemKeys,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;

    /// Performs a full authentication and returns the raw token payload.
    fn authenticate(
        &self,
        provider: Provider,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;

    /// Exchanges a refresh token for a new raw token payload.
    fn refresh(
        &self,
        provider: Provider,
        refresh_token: &str,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;
}
