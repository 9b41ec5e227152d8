use menumux_core::{ItemDetail, MergedCustomization, MergedDetailItem, Provider, ProviderMap};

/// Folds per-provider item details into one merged item, in input order.
///
/// Ids and prices are recorded for every provider. Title and description
/// are taken from the first provider that supplies a non-empty value.
/// Customization groups are keyed by title and the first provider to supply
/// a title owns the group: a later group with the same title is dropped
/// whole, options included.
#[must_use]
pub fn merge_item_details(details: Vec<(Provider, ItemDetail)>) -> MergedDetailItem {
    let mut merged = MergedDetailItem::default();

    for (provider, detail) in details {
        merged.ids.set(provider, detail.id);
        merged.prices.set(provider, detail.price);

        if merged.title.is_empty() {
            if let Some(title) = detail.title.filter(|t| !t.is_empty()) {
                merged.title = title;
            }
        }
        if merged.description.is_empty() {
            if let Some(description) = detail.description.filter(|d| !d.is_empty()) {
                merged.description = description;
            }
        }

        for group in detail.customizations {
            if merged.customizations.contains_key(&group.title) {
                tracing::debug!(
                    provider = %provider,
                    title = %group.title,
                    "dropping customization group already supplied by another provider"
                );
                continue;
            }
            merged.customizations.insert(
                group.title.clone(),
                MergedCustomization {
                    title: group.title,
                    min_permitted: group.min_permitted,
                    max_permitted: group.max_permitted,
                    ids: ProviderMap::only(provider, group.id),
                    options: group.options,
                    services: vec![provider],
                },
            );
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use menumux_core::{CustomizationGroup, CustomizationOption};

    use super::*;

    fn option(provider: Provider, id: &str, title: &str) -> CustomizationOption {
        CustomizationOption {
            ids: ProviderMap::only(provider, id.to_owned()),
            title: title.to_owned(),
            min_permitted: None,
            max_permitted: None,
            price: Some(0),
            options: Vec::new(),
        }
    }

    fn group(provider: Provider, id: &str, title: &str, options: &[&str]) -> CustomizationGroup {
        CustomizationGroup {
            id: id.to_owned(),
            title: title.to_owned(),
            min_permitted: Some(1),
            max_permitted: Some(1),
            options: options
                .iter()
                .enumerate()
                .map(|(i, t)| option(provider, &format!("{id}-{i}"), t))
                .collect(),
        }
    }

    fn detail(id: &str, title: Option<&str>, price: i64) -> ItemDetail {
        ItemDetail {
            id: id.to_owned(),
            title: title.map(str::to_owned),
            description: None,
            price,
            customizations: Vec::new(),
        }
    }

    #[test]
    fn empty_input_yields_empty_item() {
        let merged = merge_item_details(Vec::new());
        assert!(merged.title.is_empty());
        assert!(merged.ids.is_empty());
        assert!(merged.customizations.is_empty());
    }

    #[test]
    fn ids_and_prices_recorded_for_every_provider() {
        let merged = merge_item_details(vec![
            (Provider::A, detail("a-1", Some("Cola"), 150)),
            (Provider::C, detail("c-1", Some("Cola"), 145)),
        ]);
        assert_eq!(merged.ids.get(Provider::A).map(String::as_str), Some("a-1"));
        assert_eq!(merged.ids.get(Provider::C).map(String::as_str), Some("c-1"));
        assert_eq!(merged.prices.get(Provider::C), Some(&145));
        assert!(!merged.prices.contains(Provider::B));
    }

    #[test]
    fn first_non_empty_title_wins() {
        let merged = merge_item_details(vec![
            (Provider::A, detail("a-1", Some("Cola"), 150)),
            (Provider::B, detail("b-1", Some("Coca-Cola 12oz"), 140)),
        ]);
        assert_eq!(merged.title, "Cola");
    }

    #[test]
    fn missing_title_is_filled_by_later_provider() {
        let mut b = detail("b-1", Some("Cola"), 140);
        b.description = Some("Fizzy".to_owned());
        let merged = merge_item_details(vec![
            (Provider::A, detail("a-1", None, 150)),
            (Provider::B, b),
        ]);
        assert_eq!(merged.title, "Cola");
        assert_eq!(merged.description, "Fizzy");
    }

    #[test]
    fn colliding_customization_keeps_first_provider_only() {
        let mut a = detail("a-1", Some("Cola"), 150);
        a.customizations.push(group(Provider::A, "ga", "Size", &["Small", "Large"]));
        let mut b = detail("b-1", Some("Cola"), 140);
        b.customizations
            .push(group(Provider::B, "gb", "Size", &["Small", "Medium", "Large"]));
        b.customizations.push(group(Provider::B, "gb2", "Ice", &["No ice"]));

        let merged = merge_item_details(vec![(Provider::A, a), (Provider::B, b)]);

        assert_eq!(merged.customizations.len(), 2);
        let size = &merged.customizations["Size"];
        assert_eq!(size.services, vec![Provider::A]);
        assert_eq!(size.ids.get(Provider::A).map(String::as_str), Some("ga"));
        assert!(!size.ids.contains(Provider::B));
        assert_eq!(size.options.len(), 2);

        let ice = &merged.customizations["Ice"];
        assert_eq!(ice.services, vec![Provider::B]);
    }

    #[test]
    fn customization_order_follows_insertion() {
        let mut a = detail("a-1", Some("Burrito"), 900);
        a.customizations.push(group(Provider::A, "g1", "Tortilla", &["Flour"]));
        a.customizations.push(group(Provider::A, "g2", "Beans", &["Black"]));
        let mut c = detail("c-1", Some("Burrito"), 950);
        c.customizations.push(group(Provider::C, "g3", "Salsa", &["Mild"]));

        let merged = merge_item_details(vec![(Provider::A, a), (Provider::C, c)]);
        let titles: Vec<_> = merged.customizations.keys().map(String::as_str).collect();
        assert_eq!(titles, vec!["Tortilla", "Beans", "Salsa"]);
    }

    #[test]
    fn serializes_all_provider_slots() {
        let merged = merge_item_details(vec![(Provider::B, detail("b-1", Some("Cola"), 140))]);
        let json = serde_json::to_value(&merged).unwrap();
        assert_eq!(json["ids"], serde_json::json!({ "A": null, "B": "b-1", "C": null }));
        assert_eq!(json["prices"]["B"], 140);
    }
}
