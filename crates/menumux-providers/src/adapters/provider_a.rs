//! Provider A: web storefront API.
//!
//! Store pages arrive inside a `data` envelope. The menu lives in
//! `catalogSectionsMap`, keyed by the uuid of the first entry in `sections`;
//! only entries typed `standardItemsPayload` describe item categories.
//! Provider A sessions are cookie based, so no access token is required.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use menumux_core::{
    Category, CustomizationGroup, CustomizationShape, Item, ItemDetail, Location, Provider,
    ProviderMap, Store, StoreKind, TokenData,
};
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{
    decode, non_empty, parse_options_recursively, unwrap_data_envelope, ProviderAdapter,
};
use crate::error::ProviderError;

const PROVIDER: Provider = Provider::A;
const ITEMS_SECTION_TYPE: &str = "standardItemsPayload";

pub struct ProviderA;

#[derive(Debug, Deserialize)]
struct StoreEnvelope {
    data: RawStore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStore {
    uuid: String,
    title: String,
    #[serde(default)]
    hero_image_urls: Vec<RawImage>,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    hours: Option<Value>,
    #[serde(default)]
    catalog_sections_map: HashMap<String, Vec<Value>>,
    #[serde(default)]
    sections: Vec<RawSectionRef>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    #[serde(default)]
    street_address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSectionRef {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct RawCatalogSection {
    #[serde(rename = "catalogSectionUUID")]
    catalog_section_uuid: String,
    payload: RawSectionPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSectionPayload {
    standard_items_payload: RawStandardItems,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStandardItems {
    title: RawText,
    #[serde(default)]
    catalog_items: Vec<RawCatalogItem>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalogItem {
    uuid: String,
    title: String,
    #[serde(default)]
    item_description: Option<String>,
    price: i64,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    subsection_uuid: Option<String>,
    #[serde(default)]
    section_uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemDetail {
    uuid: String,
    price: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    item_description: Option<String>,
    #[serde(default)]
    customizations_list: Vec<RawCustomizationGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCustomizationGroup {
    uuid: String,
    title: String,
    #[serde(default)]
    min_permitted: Option<u32>,
    #[serde(default)]
    max_permitted: Option<u32>,
    #[serde(default)]
    options: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOption {
    uuid: String,
    title: String,
    #[serde(default)]
    min_permitted: Option<u32>,
    #[serde(default)]
    max_permitted: Option<u32>,
    #[serde(default)]
    price: Option<i64>,
}

impl RawCatalogItem {
    fn into_item(self) -> Item {
        let mut item = Item::from_provider(
            PROVIDER,
            self.uuid,
            self.title,
            non_empty(self.item_description),
            self.price,
            non_empty(self.image_url),
        );
        item.subsection_id = self.subsection_uuid;
        item.section_id = self.section_uuid;
        item
    }
}

/// Parses one catalog section, or `None` when it is not an item section or
/// does not have the expected layout.
fn parse_catalog_section(raw: &Value) -> Option<Category> {
    if raw.get("type").and_then(Value::as_str) != Some(ITEMS_SECTION_TYPE) {
        return None;
    }

    let section = match RawCatalogSection::deserialize(raw) {
        Ok(section) => section,
        Err(e) => {
            tracing::debug!(provider = %PROVIDER, error = %e, "skipping unreadable catalog section");
            return None;
        }
    };

    let items = section.payload.standard_items_payload;
    Some(Category {
        category_ids: ProviderMap::only(PROVIDER, section.catalog_section_uuid),
        name: items.title.text,
        items: items
            .catalog_items
            .into_iter()
            .map(RawCatalogItem::into_item)
            .collect(),
    })
}

impl ProviderAdapter for ProviderA {
    fn provider(&self) -> Provider {
        PROVIDER
    }

    fn parse_store(&self, raw: &Value, _kind: StoreKind) -> Result<Store, ProviderError> {
        let StoreEnvelope { data: store } = decode(PROVIDER, "store", raw)?;

        let menu = store
            .sections
            .first()
            .and_then(|section| store.catalog_sections_map.get(&section.uuid))
            .map(|sections| sections.iter().filter_map(parse_catalog_section).collect())
            .unwrap_or_default();

        let location = store.location.unwrap_or_default();

        Ok(Store {
            id: store.uuid,
            name: store.title,
            image_url: store.hero_image_urls.into_iter().last().and_then(|i| i.url),
            hours: store.hours,
            location: Location {
                street_address: location.street_address,
                city: location.city,
                zip_code: location.postal_code,
                country: location.country,
            },
            fees: None,
            menu,
        })
    }

    fn parse_item_detail(&self, raw: &Value) -> Result<ItemDetail, ProviderError> {
        let detail: RawItemDetail = decode(PROVIDER, "item detail", unwrap_data_envelope(raw))?;

        let customizations = detail
            .customizations_list
            .into_iter()
            .map(|group| {
                Ok(CustomizationGroup {
                    options: parse_options_recursively(
                        self,
                        &group.options,
                        self.option_children_field(),
                    )?,
                    id: group.uuid,
                    title: group.title,
                    min_permitted: group.min_permitted,
                    max_permitted: group.max_permitted,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        Ok(ItemDetail {
            id: detail.uuid,
            title: non_empty(detail.title),
            description: non_empty(detail.item_description),
            price: detail.price,
            customizations,
        })
    }

    fn parse_customization_group(&self, raw: &Value) -> Result<CustomizationShape, ProviderError> {
        let option: RawOption = decode(PROVIDER, "customization option", raw)?;
        Ok(CustomizationShape {
            max_permitted: option.max_permitted,
            min_permitted: option.min_permitted,
            title: option.title,
            id: option.uuid,
            price: option.price,
        })
    }

    fn option_children_field(&self) -> &'static str {
        "option"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn parse_token(
        &self,
        _raw: &Value,
        _now: DateTime<Utc>,
        _default_ttl: Duration,
    ) -> Result<TokenData, ProviderError> {
        Err(ProviderError::malformed(
            PROVIDER,
            "token",
            "provider A does not issue access tokens",
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store_fixture() -> Value {
        json!({
            "data": {
                "uuid": "store-a",
                "title": "Taqueria A",
                "heroImageUrls": [
                    { "url": "https://img/a-small.jpg" },
                    { "url": "https://img/a-large.jpg" }
                ],
                "location": {
                    "streetAddress": "1 Main St",
                    "city": "Springfield",
                    "postalCode": "12345",
                    "country": "US"
                },
                "hours": [{ "dayRange": "Every day", "sectionHours": [] }],
                "sections": [{ "uuid": "menu-1" }, { "uuid": "menu-2" }],
                "catalogSectionsMap": {
                    "menu-1": [
                        {
                            "type": "standardItemsPayload",
                            "catalogSectionUUID": "cat-drinks",
                            "payload": {
                                "standardItemsPayload": {
                                    "title": { "text": "Drinks" },
                                    "catalogItems": [{
                                        "uuid": "item-cola",
                                        "title": "Cola",
                                        "itemDescription": "Cold",
                                        "price": 150,
                                        "imageUrl": "https://img/cola.jpg",
                                        "subsectionUuid": "sub-1",
                                        "sectionUuid": "menu-1"
                                    }]
                                }
                            }
                        },
                        { "type": "carousel", "payload": {} },
                        {
                            "type": "standardItemsPayload",
                            "catalogSectionUUID": "cat-broken",
                            "payload": {}
                        }
                    ]
                }
            }
        })
    }

    #[test]
    fn parse_store_maps_scalar_fields() {
        let store = ProviderA
            .parse_store(&store_fixture(), StoreKind::Restaurant)
            .unwrap();
        assert_eq!(store.id, "store-a");
        assert_eq!(store.name, "Taqueria A");
        assert_eq!(store.image_url.as_deref(), Some("https://img/a-large.jpg"));
        assert_eq!(store.location.zip_code.as_deref(), Some("12345"));
        assert!(store.hours.is_some());
        assert!(store.fees.is_none());
    }

    #[test]
    fn parse_store_keeps_only_item_sections() {
        let store = ProviderA
            .parse_store(&store_fixture(), StoreKind::Restaurant)
            .unwrap();
        assert_eq!(store.menu.len(), 1);
        let drinks = &store.menu[0];
        assert_eq!(drinks.name, "Drinks");
        assert_eq!(
            drinks.category_ids.get(Provider::A).map(String::as_str),
            Some("cat-drinks")
        );
        let cola = drinks.item("Cola").unwrap();
        assert_eq!(cola.prices.get(Provider::A), Some(&150));
        assert_eq!(cola.subsection_id.as_deref(), Some("sub-1"));
        assert_eq!(cola.section_id.as_deref(), Some("menu-1"));
    }

    #[test]
    fn parse_store_without_hero_images_has_no_image() {
        let mut raw = store_fixture();
        raw["data"]["heroImageUrls"] = json!([]);
        let store = ProviderA.parse_store(&raw, StoreKind::Restaurant).unwrap();
        assert!(store.image_url.is_none());
    }

    #[test]
    fn parse_store_without_sections_has_empty_menu() {
        let mut raw = store_fixture();
        raw["data"]["sections"] = json!([]);
        let store = ProviderA.parse_store(&raw, StoreKind::Restaurant).unwrap();
        assert!(store.menu.is_empty());
    }

    #[test]
    fn parse_store_missing_uuid_is_malformed() {
        let raw = json!({ "data": { "title": "No id" } });
        let err = ProviderA.parse_store(&raw, StoreKind::Restaurant).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { provider: Provider::A, .. }));
    }

    #[test]
    fn parse_item_detail_reads_customizations() {
        let raw = json!({
            "data": {
                "uuid": "item-cola",
                "price": 150,
                "title": "Cola",
                "itemDescription": "Cold",
                "customizationsList": [{
                    "uuid": "grp-size",
                    "title": "Size",
                    "minPermitted": 1,
                    "maxPermitted": 1,
                    "options": [
                        { "uuid": "opt-s", "title": "Small", "price": 0 },
                        { "uuid": "opt-l", "title": "Large", "price": 50 }
                    ]
                }]
            }
        });
        let detail = ProviderA.parse_item_detail(&raw).unwrap();
        assert_eq!(detail.id, "item-cola");
        assert_eq!(detail.title.as_deref(), Some("Cola"));
        assert_eq!(detail.customizations.len(), 1);
        let size = &detail.customizations[0];
        assert_eq!(size.id, "grp-size");
        assert_eq!(size.min_permitted, Some(1));
        assert_eq!(size.options.len(), 2);
        assert_eq!(size.options[1].price, Some(50));
    }

    #[test]
    fn parse_item_detail_accepts_unwrapped_payload() {
        let raw = json!({ "uuid": "item-x", "price": 99 });
        let detail = ProviderA.parse_item_detail(&raw).unwrap();
        assert_eq!(detail.price, 99);
        assert!(detail.title.is_none());
        assert!(detail.customizations.is_empty());
    }

    #[test]
    fn parse_token_is_unsupported() {
        let err = ProviderA
            .parse_token(&json!({}), Utc::now(), Duration::hours(1))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }
}
