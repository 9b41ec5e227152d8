//! Provider C: mobile storefront API.
//!
//! Restaurant pages are a flat list of typed `display_modules`; convenience
//! (retail) stores come from a separate endpoint laid out as `lego` sections.
//! Prices on restaurant pages are display strings such as `"$12.99"`.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use menumux_core::{
    Category, CustomizationGroup, CustomizationShape, Item, ItemDetail, Location, Provider,
    ProviderMap, Store, StoreKind, TokenData,
};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{
    decode, native_id, non_empty, parse_options_recursively, unwrap_data_envelope,
    ProviderAdapter,
};
use crate::error::ProviderError;

const PROVIDER: Provider = Provider::C;

static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("valid zip regex"));

pub struct ProviderC;

// --- restaurant (display module) layout -------------------------------------

#[derive(Debug, Deserialize)]
struct RawModulePage {
    #[serde(default)]
    display_modules: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStoreHeader {
    data: RawHeaderData,
    #[serde(default)]
    header_image: Option<RawImage>,
    #[serde(default)]
    cover_image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawHeaderData {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    address: Option<RawAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    display_address: Option<String>,
    #[serde(default)]
    country_shortname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMenuBook {
    data: RawMenuBookData,
}

#[derive(Debug, Deserialize)]
struct RawMenuBookData {
    #[serde(default)]
    menus: Vec<RawMenu>,
}

#[derive(Debug, Deserialize)]
struct RawMenu {
    #[serde(default)]
    open_hours: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawItemList {
    #[serde(deserialize_with = "native_id")]
    id: String,
    data: RawItemListData,
}

#[derive(Debug, Deserialize)]
struct RawItemListData {
    name: String,
    #[serde(default)]
    content: Vec<RawListItem>,
}

#[derive(Debug, Deserialize)]
struct RawListItem {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    display_price: String,
    #[serde(default)]
    image: Option<RawImage>,
}

// --- retail (lego) layout ---------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRetailPage {
    store: RawRetailStore,
    #[serde(default)]
    lego_section_body: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRetailStore {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    cover_img_url: Option<String>,
    #[serde(default)]
    address: Option<RawAddress>,
}

#[derive(Debug, Deserialize)]
struct RawLegoSection {
    logging: RawSectionLogging,
    text: RawSectionText,
    #[serde(default)]
    children: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawSectionLogging {
    #[serde(deserialize_with = "native_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawSectionText {
    title: String,
}

#[derive(Debug, Deserialize)]
struct RawLegoItem {
    custom: RawLegoCustom,
    text: RawLegoText,
    #[serde(default)]
    images: Option<RawLegoImages>,
    logging: RawLegoLogging,
}

#[derive(Debug, Deserialize)]
struct RawLegoCustom {
    #[serde(deserialize_with = "native_id")]
    item_id: String,
}

#[derive(Debug, Deserialize)]
struct RawLegoText {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLegoImages {
    #[serde(default)]
    main: Option<RawLegoImage>,
}

#[derive(Debug, Deserialize)]
struct RawLegoImage {
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLegoLogging {
    item_price: i64,
}

// --- item detail and tokens -------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemDetail {
    item_header: RawItemHeader,
    #[serde(default)]
    option_lists: Vec<RawOptionList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemHeader {
    #[serde(deserialize_with = "native_id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    unit_amount: i64,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptionList {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    min_num_options: Option<u32>,
    #[serde(default)]
    max_num_options: Option<u32>,
    #[serde(default)]
    options: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOption {
    #[serde(deserialize_with = "native_id")]
    id: String,
    name: String,
    #[serde(default)]
    min_num_options: Option<u32>,
    #[serde(default)]
    max_num_options: Option<u32>,
    #[serde(default)]
    unit_amount: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawTokenEnvelope {
    token: RawToken,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Converts a display price like `"$1,234.50"` into minor units.
fn parse_display_price(display: &str) -> Option<i64> {
    let cleaned: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let amount = Decimal::from_str(&cleaned).ok()?;
    amount.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
}

/// Last five-digit run, so a five-digit street number is never taken.
fn zip_code(display_address: &str) -> Option<String> {
    ZIP_CODE
        .captures_iter(display_address)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Country is the fourth comma-separated part of a retail display address.
fn retail_country(display_address: &str) -> Option<String> {
    display_address
        .split(',')
        .nth(3)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn parse_item_list(raw: &Value) -> Option<Category> {
    let list = match RawItemList::deserialize(raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::debug!(provider = %PROVIDER, error = %e, "skipping unreadable item list");
            return None;
        }
    };

    let items = list
        .data
        .content
        .into_iter()
        .filter_map(|item| {
            let Some(price) = parse_display_price(&item.display_price) else {
                tracing::warn!(
                    provider = %PROVIDER,
                    item_id = %item.id,
                    display_price = %item.display_price,
                    "skipping item with unparsable price"
                );
                return None;
            };
            Some(Item::from_provider(
                PROVIDER,
                item.id,
                item.name,
                non_empty(item.description),
                price,
                item.image.and_then(|i| non_empty(i.url)),
            ))
        })
        .collect();

    Some(Category {
        category_ids: ProviderMap::only(PROVIDER, list.id),
        name: list.data.name,
        items,
    })
}

fn parse_restaurant(raw: &Value) -> Result<Store, ProviderError> {
    let page: RawModulePage = decode(PROVIDER, "store", raw)?;

    let mut header: Option<RawStoreHeader> = None;
    let mut hours = None;
    let mut menu = Vec::new();

    for module in &page.display_modules {
        match module.get("type").and_then(Value::as_str) {
            Some("store_header") => header = Some(decode(PROVIDER, "store header", module)?),
            Some("menu_book") => match RawMenuBook::deserialize(module) {
                Ok(book) => hours = book.data.menus.into_iter().next().and_then(|m| m.open_hours),
                Err(e) => {
                    tracing::debug!(provider = %PROVIDER, error = %e, "ignoring unreadable menu book");
                }
            },
            Some("item_list") => menu.extend(parse_item_list(module)),
            _ => {}
        }
    }

    let header = header
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "store", "no store_header module"))?;
    let address = header.data.address.unwrap_or_default();
    let image_url = header
        .header_image
        .and_then(|i| non_empty(i.url))
        .or_else(|| header.cover_image.and_then(|i| non_empty(i.url)));

    Ok(Store {
        id: header.data.id,
        name: header.data.name,
        image_url,
        hours,
        location: Location {
            zip_code: address.display_address.as_deref().and_then(zip_code),
            street_address: address.street,
            city: address.city,
            country: address.country_shortname,
        },
        fees: None,
        menu,
    })
}

fn parse_lego_section(raw: &Value) -> Option<Category> {
    let section = match RawLegoSection::deserialize(raw) {
        Ok(section) => section,
        Err(e) => {
            tracing::debug!(provider = %PROVIDER, error = %e, "skipping unreadable retail section");
            return None;
        }
    };

    let items = section
        .children
        .iter()
        .filter_map(|child| match RawLegoItem::deserialize(child) {
            Ok(item) => Some(Item::from_provider(
                PROVIDER,
                item.custom.item_id,
                item.text.title,
                non_empty(item.text.description),
                item.logging.item_price,
                item.images.and_then(|i| i.main).and_then(|m| non_empty(m.uri)),
            )),
            Err(e) => {
                tracing::debug!(provider = %PROVIDER, error = %e, "skipping unreadable retail item");
                None
            }
        })
        .collect();

    Some(Category {
        category_ids: ProviderMap::only(PROVIDER, section.logging.id),
        name: section.text.title,
        items,
    })
}

fn parse_retail(raw: &Value) -> Result<Store, ProviderError> {
    let page: RawRetailPage = decode(PROVIDER, "retail store", raw)?;
    let address = page.store.address.unwrap_or_default();
    let display_address = address.display_address.as_deref();

    Ok(Store {
        id: page.store.id,
        name: page.store.name,
        image_url: non_empty(page.store.cover_img_url),
        hours: None,
        location: Location {
            zip_code: display_address.and_then(zip_code),
            country: display_address.and_then(retail_country),
            street_address: address.street,
            city: address.city,
        },
        fees: None,
        menu: page
            .lego_section_body
            .iter()
            .filter_map(parse_lego_section)
            .collect(),
    })
}

impl ProviderAdapter for ProviderC {
    fn provider(&self) -> Provider {
        PROVIDER
    }

    fn parse_store(&self, raw: &Value, kind: StoreKind) -> Result<Store, ProviderError> {
        match kind {
            StoreKind::Restaurant => parse_restaurant(raw),
            StoreKind::Retail => parse_retail(raw),
        }
    }

    fn parse_item_detail(&self, raw: &Value) -> Result<ItemDetail, ProviderError> {
        let detail: RawItemDetail = decode(PROVIDER, "item detail", unwrap_data_envelope(raw))?;

        let mut customizations = Vec::with_capacity(detail.option_lists.len());
        for list in detail.option_lists {
            customizations.push(CustomizationGroup {
                options: parse_options_recursively(
                    self,
                    &list.options,
                    self.option_children_field(),
                )?,
                id: list.id,
                title: list.name,
                min_permitted: list.min_num_options,
                max_permitted: list.max_num_options,
            });
        }

        let header = detail.item_header;
        Ok(ItemDetail {
            id: header.id,
            title: non_empty(header.name),
            description: non_empty(header.description),
            price: header.unit_amount,
            customizations,
        })
    }

    fn parse_customization_group(&self, raw: &Value) -> Result<CustomizationShape, ProviderError> {
        let option: RawOption = decode(PROVIDER, "option", raw)?;
        Ok(CustomizationShape {
            max_permitted: option.max_num_options,
            min_permitted: option.min_num_options,
            title: option.name,
            id: option.id,
            price: option.unit_amount,
        })
    }

    fn option_children_field(&self) -> &'static str {
        "optionLists"
    }

    fn requires_auth(&self) -> bool {
        true
    }

    /// Provider C never reports expiries, so both default to `now + default_ttl`.
    fn parse_token(
        &self,
        raw: &Value,
        now: DateTime<Utc>,
        default_ttl: Duration,
    ) -> Result<TokenData, ProviderError> {
        let RawTokenEnvelope { token } = decode(PROVIDER, "token", raw)?;
        let expiry = now + default_ttl;

        Ok(TokenData {
            access_token: token.token,
            refresh_token: non_empty(token.refresh_token),
            access_token_expiry: expiry,
            refresh_token_expiry: expiry,
        })
    }
}
