//! Provider B: restaurant marketplace API with bearer-token sessions.

use chrono::{DateTime, Duration, Utc};
use menumux_core::{
    Category, CustomizationGroup, CustomizationShape, Fees, Item, ItemDetail, Location, Provider,
    ProviderMap, Store, StoreKind, TokenData,
};
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{
    decode, expiry_from_millis, native_id, non_empty, parse_options_recursively,
    unwrap_data_envelope, ProviderAdapter,
};
use crate::error::ProviderError;

const PROVIDER: Provider = Provider::B;

pub struct ProviderB;

#[derive(Debug, Deserialize)]
struct RawStorePage {
    #[serde(default)]
    restaurant_availability: Option<RawAvailability>,
    restaurant: RawRestaurant,
}

#[derive(Debug, Deserialize)]
struct RawAvailability {
    #[serde(default)]
    delivery_fee: Option<RawAmount>,
    #[serde(default)]
    available_hours: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawAmount {
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct RawRestaurant {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    address: Option<RawAddress>,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    menu_category_list: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    #[serde(default)]
    street_address: Option<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(default, rename = "zipCode", alias = "postal_code")]
    zip_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMenuCategory {
    #[serde(deserialize_with = "native_id")]
    menu_category_id: String,
    name: String,
    #[serde(default)]
    menu_item_list: Vec<RawMenuItem>,
}

#[derive(Debug, Deserialize)]
struct RawMenuItem {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: RawAmount,
    #[serde(default)]
    media_image: Option<RawMediaImage>,
}

#[derive(Debug, Deserialize)]
struct RawMediaImage {
    base_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct RawItemDetail {
    #[serde(deserialize_with = "native_id")]
    id: String,
    minimum_price_variation: RawAmount,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    choice_category_list: Vec<RawChoiceCategory>,
}

#[derive(Debug, Deserialize)]
struct RawChoiceCategory {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    min_choice_options: Option<u32>,
    #[serde(default)]
    max_choice_options: Option<u32>,
    #[serde(default)]
    choice_option_list: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawChoiceOption {
    #[serde(deserialize_with = "native_id")]
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    min_choice_options: Option<u32>,
    #[serde(default)]
    max_choice_options: Option<u32>,
    #[serde(default)]
    price: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
struct RawTokenEnvelope {
    session_handle: RawSessionHandle,
}

#[derive(Debug, Deserialize)]
struct RawSessionHandle {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_expire_time: Option<i64>,
    #[serde(default)]
    refresh_token_expire_time: Option<i64>,
}

fn image_url(media: Option<RawMediaImage>) -> Option<String> {
    media
        .filter(|m| !m.base_url.is_empty() || !m.public_id.is_empty())
        .map(|m| format!("{}{}", m.base_url, m.public_id))
}

fn parse_category(raw: &Value) -> Option<Category> {
    let category = match RawMenuCategory::deserialize(raw) {
        Ok(category) => category,
        Err(e) => {
            tracing::debug!(provider = %PROVIDER, error = %e, "skipping unreadable menu category");
            return None;
        }
    };

    let items = category
        .menu_item_list
        .into_iter()
        .map(|item| {
            Item::from_provider(
                PROVIDER,
                item.id,
                item.name,
                non_empty(item.description),
                item.price.amount,
                image_url(item.media_image),
            )
        })
        .collect();

    Some(Category {
        category_ids: ProviderMap::only(PROVIDER, category.menu_category_id),
        name: category.name,
        items,
    })
}

impl ProviderAdapter for ProviderB {
    fn provider(&self) -> Provider {
        PROVIDER
    }

    fn parse_store(&self, raw: &Value, _kind: StoreKind) -> Result<Store, ProviderError> {
        let page: RawStorePage = decode(PROVIDER, "store", raw)?;
        let restaurant = page.restaurant;
        let (fees, hours) = match page.restaurant_availability {
            Some(availability) => (
                availability.delivery_fee.map(|fee| Fees {
                    delivery_fee: fee.amount,
                }),
                availability.available_hours,
            ),
            None => (None, None),
        };
        let address = restaurant.address.unwrap_or_default();

        Ok(Store {
            id: restaurant.id,
            name: restaurant.name,
            image_url: non_empty(restaurant.logo),
            hours,
            location: Location {
                street_address: address.street_address,
                city: address.locality,
                zip_code: address.zip_code,
                country: address.country,
            },
            fees,
            menu: restaurant
                .menu_category_list
                .iter()
                .filter_map(parse_category)
                .collect(),
        })
    }

    fn parse_item_detail(&self, raw: &Value) -> Result<ItemDetail, ProviderError> {
        let detail: RawItemDetail = decode(PROVIDER, "item detail", unwrap_data_envelope(raw))?;

        let mut customizations = Vec::with_capacity(detail.choice_category_list.len());
        for group in detail.choice_category_list {
            customizations.push(CustomizationGroup {
                options: parse_options_recursively(
                    self,
                    &group.choice_option_list,
                    self.option_children_field(),
                )?,
                id: group.id,
                title: group.name,
                min_permitted: group.min_choice_options,
                max_permitted: group.max_choice_options,
            });
        }

        Ok(ItemDetail {
            id: detail.id,
            title: non_empty(detail.name),
            description: non_empty(detail.description),
            price: detail.minimum_price_variation.amount,
            customizations,
        })
    }

    fn parse_customization_group(&self, raw: &Value) -> Result<CustomizationShape, ProviderError> {
        let option: RawChoiceOption = decode(PROVIDER, "choice option", raw)?;
        let title = non_empty(option.description)
            .or_else(|| non_empty(option.name))
            .ok_or_else(|| {
                ProviderError::malformed(PROVIDER, "choice option", "missing description and name")
            })?;

        Ok(CustomizationShape {
            max_permitted: option.max_choice_options,
            min_permitted: option.min_choice_options,
            title,
            id: option.id,
            price: option.price.map(|p| p.amount),
        })
    }

    fn option_children_field(&self) -> &'static str {
        "choice_category_list"
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn parse_token(
        &self,
        raw: &Value,
        now: DateTime<Utc>,
        default_ttl: Duration,
    ) -> Result<TokenData, ProviderError> {
        let RawTokenEnvelope { session_handle } = decode(PROVIDER, "session handle", raw)?;
        let fallback = now + default_ttl;

        Ok(TokenData {
            access_token: session_handle.access_token,
            refresh_token: non_empty(session_handle.refresh_token),
            access_token_expiry: expiry_from_millis(session_handle.token_expire_time, fallback),
            refresh_token_expiry: expiry_from_millis(
                session_handle.refresh_token_expire_time,
                fallback,
            ),
        })
    }
}
