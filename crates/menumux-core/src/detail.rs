//! Item detail shapes: what a single provider contributes, and the merged
//! cross-provider view built from those contributions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::provider::{Provider, ProviderMap};

/// Extra native keys some providers need to address an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemKeys {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub subsection_id: Option<String>,
}

/// The common projection every provider's raw customization record is mapped
/// into before any provider-agnostic logic looks at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizationShape {
    pub max_permitted: Option<u32>,
    pub min_permitted: Option<u32>,
    pub title: String,
    pub id: String,
    pub price: Option<i64>,
}

/// One selectable option inside a customization group. Options may cascade
/// into further options to any depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationOption {
    pub ids: ProviderMap<String>,
    pub title: String,
    pub min_permitted: Option<u32>,
    pub max_permitted: Option<u32>,
    pub price: Option<i64>,
    pub options: Vec<CustomizationOption>,
}

impl CustomizationOption {
    #[must_use]
    pub fn from_shape(
        provider: Provider,
        shape: CustomizationShape,
        options: Vec<CustomizationOption>,
    ) -> Self {
        Self {
            ids: ProviderMap::only(provider, shape.id),
            title: shape.title,
            min_permitted: shape.min_permitted,
            max_permitted: shape.max_permitted,
            price: shape.price,
            options,
        }
    }

    /// Depth of the option tree rooted here (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.options.iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// A customization group as supplied by one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizationGroup {
    pub id: String,
    pub title: String,
    pub min_permitted: Option<u32>,
    pub max_permitted: Option<u32>,
    pub options: Vec<CustomizationOption>,
}

/// The fields one provider contributes to a [`MergedDetailItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetail {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub customizations: Vec<CustomizationGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCustomization {
    pub title: String,
    pub min_permitted: Option<u32>,
    pub max_permitted: Option<u32>,
    pub ids: ProviderMap<String>,
    pub options: Vec<CustomizationOption>,
    /// Providers that contributed this group.
    pub services: Vec<Provider>,
}

/// Canonical detail view of one item across providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedDetailItem {
    pub title: String,
    pub description: String,
    pub ids: ProviderMap<String>,
    pub prices: ProviderMap<i64>,
    /// Customization groups keyed by title, in insertion order.
    pub customizations: IndexMap<String, MergedCustomization>,
}
