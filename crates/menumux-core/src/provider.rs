//! Provider tags and the fixed-slot map keyed by them.
//!
//! Every merged entity carries one or more [`ProviderMap`]s so that callers
//! can recover each provider's native identifiers after a merge. The map has
//! exactly one slot per known provider; there is no way to insert a key that
//! is not a [`Provider`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// One of the three delivery platforms aggregated by menumux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
    #[serde(alias = "c")]
    C,
}

impl Provider {
    /// All known providers, in slot order.
    pub const ALL: [Provider; 3] = [Provider::A, Provider::B, Provider::C];

    /// Stable slot index in `0..3`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Provider::A => 0,
            Provider::B => 1,
            Provider::C => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::A => "A",
            Provider::B => "B",
            Provider::C => "C",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(Provider::A),
            "B" | "b" => Ok(Provider::B),
            "C" | "c" => Ok(Provider::C),
            other => Err(CoreError::UnknownProvider(other.to_owned())),
        }
    }
}

/// A mapping from every [`Provider`] to an optional value.
///
/// Serializes as a JSON object that always contains all three provider keys,
/// with `null` for empty slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMap<T> {
    slots: [Option<T>; 3],
}

impl<T> Default for ProviderMap<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None],
        }
    }
}

impl<T> ProviderMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A map with a single populated slot.
    #[must_use]
    pub fn only(provider: Provider, value: T) -> Self {
        let mut map = Self::new();
        map.set(provider, value);
        map
    }

    /// Builds a map by calling `f` once per provider, in slot order.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Provider) -> Option<T>,
    {
        Self {
            slots: Provider::ALL.map(&mut f),
        }
    }

    #[must_use]
    pub fn get(&self, provider: Provider) -> Option<&T> {
        self.slots[provider.index()].as_ref()
    }

    pub fn get_mut(&mut self, provider: Provider) -> Option<&mut T> {
        self.slots[provider.index()].as_mut()
    }

    /// Stores `value` for `provider`, returning the previous value if any.
    pub fn set(&mut self, provider: Provider, value: T) -> Option<T> {
        self.slots[provider.index()].replace(value)
    }

    #[must_use]
    pub fn contains(&self, provider: Provider) -> bool {
        self.slots[provider.index()].is_some()
    }

    /// Number of populated slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates populated slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Provider, &T)> {
        Provider::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(p, v)| v.as_ref().map(|v| (p, v)))
    }

    /// Providers with a populated slot, in slot order.
    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.iter().map(|(p, _)| p)
    }
}

impl<T: Serialize> Serialize for ProviderMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Provider::ALL.len()))?;
        for provider in Provider::ALL {
            map.serialize_entry(provider.as_str(), &self.slots[provider.index()])?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ProviderMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<Provider, Option<T>>::deserialize(deserializer)?;
        let mut map = Self::new();
        for (provider, value) in raw {
            if let Some(value) = value {
                map.set(provider, value);
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_both_cases() {
        assert_eq!("A".parse::<Provider>().unwrap(), Provider::A);
        assert_eq!("c".parse::<Provider>().unwrap(), Provider::C);
        assert!(matches!(
            "postmates".parse::<Provider>(),
            Err(CoreError::UnknownProvider(ref s)) if s == "postmates"
        ));
    }

    #[test]
    fn only_populates_a_single_slot() {
        let map = ProviderMap::only(Provider::B, "x");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(Provider::B), Some(&"x"));
        assert!(map.get(Provider::A).is_none());
        assert_eq!(map.providers().collect::<Vec<_>>(), vec![Provider::B]);
    }

    #[test]
    fn set_returns_previous_value() {
        let mut map = ProviderMap::only(Provider::A, 1);
        assert_eq!(map.set(Provider::A, 2), Some(1));
        assert_eq!(map.get(Provider::A), Some(&2));
    }

    #[test]
    fn serializes_all_three_keys() {
        let map = ProviderMap::only(Provider::C, 140_i64);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "A": null, "B": null, "C": 140 }));
    }

    #[test]
    fn deserializes_subset_of_keys() {
        let map: ProviderMap<String> =
            serde_json::from_value(serde_json::json!({ "b": "id-b", "C": null })).unwrap();
        assert_eq!(map.get(Provider::B).map(String::as_str), Some("id-b"));
        assert!(!map.contains(Provider::C));
    }

    #[test]
    fn rejects_unknown_provider_keys() {
        let result: Result<ProviderMap<String>, _> =
            serde_json::from_value(serde_json::json!({ "D": "nope" }));
        assert!(result.is_err());
    }
}
