//! Provider-agnostic entry points into the adapters.
//!
//! Callers hold a [`Provider`] tag and a raw JSON payload; these functions
//! pick the matching adapter and return the common shapes.

use chrono::{DateTime, Duration, Utc};
use menumux_core::{ItemDetail, Provider, Store, StoreKind, TokenData};
use serde_json::Value;

use crate::adapter::adapter_for;
use crate::error::ProviderError;

/// Normalizes a raw store payload from `provider`.
///
/// # Errors
///
/// Returns [`ProviderError::Malformed`] when the payload lacks the store's
/// identity fields.
pub fn normalize_store(
    provider: Provider,
    kind: StoreKind,
    raw: &Value,
) -> Result<Store, ProviderError> {
    let store = adapter_for(provider).parse_store(raw, kind)?;
    tracing::debug!(
        provider = %provider,
        store_id = %store.id,
        categories = store.menu.len(),
        items = store.item_count(),
        "normalized store"
    );
    Ok(store)
}

/// Normalizes a raw item detail payload from `provider`.
///
/// # Errors
///
/// Returns [`ProviderError::Malformed`] when required item fields are missing.
pub fn normalize_item(provider: Provider, raw: &Value) -> Result<ItemDetail, ProviderError> {
    adapter_for(provider).parse_item_detail(raw)
}

/// Decodes an authenticate or refresh response from `provider`.
///
/// # Errors
///
/// Returns [`ProviderError::Malformed`] when the response carries no access
/// token, or when `provider` does not issue tokens at all.
pub fn normalize_token(
    provider: Provider,
    raw: &Value,
    now: DateTime<Utc>,
    default_ttl: Duration,
) -> Result<TokenData, ProviderError> {
    adapter_for(provider).parse_token(raw, now, default_ttl)
}
