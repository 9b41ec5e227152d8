use serde::{Deserialize, Serialize};

use crate::provider::{Provider, ProviderMap};

/// Which flavour of store page to request from a provider.
///
/// Only provider C serves retail (convenience) stores from a separate
/// endpoint with its own schema; the other providers ignore this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Restaurant,
    Retail,
}

/// A store normalized into the common shape, or the merge of several such
/// stores. Scalar fields always come from a single (default) provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    /// Opening hours exactly as the provider returned them.
    pub hours: Option<serde_json::Value>,
    pub location: Location,
    pub fees: Option<Fees>,
    pub menu: Vec<Category>,
}

impl Store {
    /// Looks up a menu category by its display name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.menu.iter().find(|c| c.name == name)
    }

    /// Total number of items across all categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.menu.iter().map(|c| c.items.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fees {
    /// Delivery fee in minor currency units.
    pub delivery_fee: i64,
}

/// A menu section. The display `name` is the merge key across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_ids: ProviderMap<String>,
    pub name: String,
    pub items: Vec<Item>,
}

impl Category {
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }
}

/// A menu item. The display `name` is the merge key across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub ids: ProviderMap<String>,
    pub name: String,
    pub description: Option<String>,
    /// Price per provider in minor currency units.
    pub prices: ProviderMap<i64>,
    pub image_url: Option<String>,
    pub subsection_id: Option<String>,
    pub section_id: Option<String>,
}

impl Item {
    /// Builds an item listed by a single provider.
    #[must_use]
    pub fn from_provider(
        provider: Provider,
        id: String,
        name: String,
        description: Option<String>,
        price: i64,
        image_url: Option<String>,
    ) -> Self {
        Self {
            ids: ProviderMap::only(provider, id),
            name,
            description,
            prices: ProviderMap::only(provider, price),
            image_url,
            subsection_id: None,
            section_id: None,
        }
    }
}
