use indexmap::IndexMap;
use menumux_core::{Category, Item, Provider, ProviderMap, Store};

use crate::error::AggregateError;

/// Category names some providers inject into their menus (personalized
/// carousels and the like) that must never reach a merged menu.
pub const DENYLISTED_CATEGORIES: &[&str] = &["Picked for you"];

struct CategoryBuilder {
    category_ids: ProviderMap<String>,
    items: IndexMap<String, Item>,
}

impl CategoryBuilder {
    fn seed(category: Category) -> Self {
        let mut items = IndexMap::with_capacity(category.items.len());
        for item in category.items {
            // Duplicate names inside one provider's category keep the first
            // position with the last record, as a keyed insert would.
            items.insert(item.name.clone(), item);
        }
        Self {
            category_ids: category.category_ids,
            items,
        }
    }
}

/// Merges normalized stores into one, in input order.
///
/// The first store is the default: its scalar fields are copied verbatim
/// and never overwritten. Categories are merged by name and items by name
/// within a category. A later provider's item that matches an existing one
/// only contributes its id and price; unmatched categories and items are
/// appended in the order they are encountered.
///
/// # Errors
///
/// Returns [`AggregateError::NoProviderData`] when `stores` is empty.
pub fn merge_stores(stores: Vec<(Provider, Store)>) -> Result<Store, AggregateError> {
    let mut stores = stores.into_iter();
    let Some((_, default_store)) = stores.next() else {
        return Err(AggregateError::NoProviderData);
    };

    let Store {
        id,
        name,
        image_url,
        hours,
        location,
        fees,
        menu,
    } = default_store;

    let mut categories: IndexMap<String, CategoryBuilder> = IndexMap::with_capacity(menu.len());
    for category in menu {
        categories.insert(category.name.clone(), CategoryBuilder::seed(category));
    }

    for (provider, store) in stores {
        for category in store.menu {
            let Category {
                category_ids,
                name: category_name,
                items,
            } = category;

            let builder = categories
                .entry(category_name)
                .or_insert_with(|| CategoryBuilder {
                    category_ids: ProviderMap::new(),
                    items: IndexMap::new(),
                });
            if let Some(category_id) = category_ids.get(provider) {
                builder.category_ids.set(provider, category_id.clone());
            }

            for item in items {
                match builder.items.get_mut(&item.name) {
                    Some(existing) => {
                        if let Some(price) = item.prices.get(provider) {
                            existing.prices.set(provider, *price);
                        }
                        if let Some(item_id) = item.ids.get(provider) {
                            existing.ids.set(provider, item_id.clone());
                        }
                    }
                    None => {
                        builder.items.insert(item.name.clone(), item);
                    }
                }
            }
        }
    }

    for denied in DENYLISTED_CATEGORIES {
        categories.shift_remove(*denied);
    }

    let menu = categories
        .into_iter()
        .map(|(name, builder)| Category {
            category_ids: builder.category_ids,
            name,
            items: builder.items.into_values().collect(),
        })
        .collect();

    Ok(Store {
        id,
        name,
        image_url,
        hours,
        location,
        fees,
        menu,
    })
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
