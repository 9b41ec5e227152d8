//! The capability set every provider adapter implements, plus the helpers
//! shared by all three adapters.
//!
//! Provider-specific field names never leave this crate: adapters decode raw
//! JSON into private serde structs and hand back only the common shapes from
//! `menumux_core`.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use menumux_core::{
    CustomizationOption, CustomizationShape, ItemDetail, Provider, Store, StoreKind, TokenData,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::adapters::{ProviderA, ProviderB, ProviderC};
use crate::error::ProviderError;

pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    /// Normalizes a raw store payload. Sections or images the adapter does
    /// not understand are dropped rather than failing the whole store.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Malformed`] when the store's identity fields
    /// cannot be located.
    fn parse_store(&self, raw: &Value, kind: StoreKind) -> Result<Store, ProviderError>;

    /// Projects a raw item detail payload into the fields this provider
    /// contributes to a merged item.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Malformed`] when required fields are missing.
    fn parse_item_detail(&self, raw: &Value) -> Result<ItemDetail, ProviderError>;

    /// Projects one raw customization record into the common shape.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Malformed`] when the record has no id or title.
    fn parse_customization_group(&self, raw: &Value) -> Result<CustomizationShape, ProviderError>;

    /// Field under which this provider nests cascading sub-options.
    fn option_children_field(&self) -> &'static str;

    /// Whether calls to this provider need an access token.
    fn requires_auth(&self) -> bool;

    /// Decodes an authenticate/refresh response. Expiries missing from the
    /// payload default to `now + default_ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Malformed`] when no access token is present.
    fn parse_token(
        &self,
        raw: &Value,
        now: DateTime<Utc>,
        default_ttl: Duration,
    ) -> Result<TokenData, ProviderError>;
}

/// Resolves the adapter for a provider tag.
#[must_use]
pub fn adapter_for(provider: Provider) -> &'static dyn ProviderAdapter {
    match provider {
        Provider::A => &ProviderA,
        Provider::B => &ProviderB,
        Provider::C => &ProviderC,
    }
}

/// Parses a list of raw options, recursing into `children_field` at every
/// level.
///
/// Options that share a title within one list collapse into a single entry:
/// the later record wins but keeps the position of the first.
///
/// # Errors
///
/// Propagates the first projection failure at any depth.
pub fn parse_options_recursively(
    adapter: &dyn ProviderAdapter,
    raw_list: &[Value],
    children_field: &str,
) -> Result<Vec<CustomizationOption>, ProviderError> {
    let provider = adapter.provider();
    let mut by_title: IndexMap<String, CustomizationOption> = IndexMap::new();

    for raw in raw_list {
        let shape = adapter.parse_customization_group(raw)?;
        let children = match raw.get(children_field).and_then(Value::as_array) {
            Some(nested) if !nested.is_empty() => {
                parse_options_recursively(adapter, nested, children_field)?
            }
            _ => Vec::new(),
        };
        by_title.insert(
            shape.title.clone(),
            CustomizationOption::from_shape(provider, shape, children),
        );
    }

    Ok(by_title.into_values().collect())
}

/// Decodes `raw` into a private adapter type, tagging failures with the
/// provider and a short context string.
pub(crate) fn decode<'a, T>(
    provider: Provider,
    context: &str,
    raw: &'a Value,
) -> Result<T, ProviderError>
where
    T: Deserialize<'a>,
{
    T::deserialize(raw).map_err(|e| ProviderError::malformed(provider, context, e))
}

/// Item detail responses may arrive wrapped in a `{"data": {...}}` envelope.
pub(crate) fn unwrap_data_envelope(raw: &Value) -> &Value {
    match raw.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => raw,
    }
}

/// Converts an epoch-millisecond timestamp, falling back when absent or out of range.
pub(crate) fn expiry_from_millis(
    millis: Option<i64>,
    fallback: DateTime<Utc>,
) -> DateTime<Utc> {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(fallback)
}

/// Native ids arrive as strings from some providers and as integers from
/// others; both are kept as strings.
pub(crate) fn native_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
