//! # Override Store
//!
//! Keyed string overrides such as `"tile 5 / wall 2" => "3g50s"` that are
//! resolved to [`Amount`]s once, at initialization, and then looked up in O(1).
//!
//! ## Lifecycle
//!
//! ```text
//! insert()/config ──> raw entries (source of truth)
//!                          │
//!                 initialize(currency)
//!                          │
//!          ┌───────────────┴───────────────┐
//!          ▼                               ▼
//!   resolved: key -> Amount        unresolved: [key] (logged)
//! ```
//!
//! Each value is tried with the currency's grammar first and then as a plain
//! decimal number. A value neither accepts is flagged, never defaulted to zero.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::currency::Currency;
use crate::error::CoinageResult;

/// Composite key for tile/wall combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileWallKey {
    /// Tile type id.
    pub tile: u16,
    /// Wall type id.
    pub wall: u16,
}

impl TileWallKey {
    /// Creates a key.
    #[inline]
    #[must_use]
    pub const fn new(tile: u16, wall: u16) -> Self {
        Self { tile, wall }
    }
}

/// Composite key for item/prefix combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPrefixKey {
    /// Item type id.
    pub item: i32,
    /// Prefix id (0 = none).
    pub prefix: u8,
}

impl ItemPrefixKey {
    /// Creates a key.
    #[inline]
    #[must_use]
    pub const fn new(item: i32, prefix: u8) -> Self {
        Self { item, prefix }
    }
}

/// One raw override.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry<K> {
    /// Application-defined key.
    pub key: K,
    /// Unresolved amount text, e.g. `"2g"` or `"150"`.
    pub value: String,
}

/// Raw overrides plus their resolved amounts.
#[derive(Clone, Debug)]
pub struct OverrideStore<K> {
    entries: Vec<OverrideEntry<K>>,
    resolved: HashMap<K, Amount>,
    unresolved: Vec<K>,
    initialized: bool,
}

impl<K> Default for OverrideStore<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            resolved: HashMap::new(),
            unresolved: Vec::new(),
            initialized: false,
        }
    }
}

impl<K> OverrideStore<K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw value for `key`, replacing any previous one.
    ///
    /// Takes effect at the next [`OverrideStore::initialize`].
    pub fn insert(&mut self, key: K, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(OverrideEntry { key, value }),
        }
    }

    /// Removes the raw value for `key`, returning it.
    ///
    /// Takes effect at the next [`OverrideStore::initialize`].
    pub fn remove(&mut self, key: &K) -> Option<String> {
        let index = self.entries.iter().position(|e| &e.key == key)?;
        Some(self.entries.remove(index).value)
    }

    /// Raw entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[OverrideEntry<K>] {
        &self.entries
    }

    /// Number of raw entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no raw entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once `initialize` has completed successfully.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resolves every raw entry through `currency`.
    ///
    /// Returns the number of entries resolved. Entries that fail both the
    /// currency grammar and plain decimal parsing are listed in
    /// [`OverrideStore::unresolved`].
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::EmptyCurrency` if `currency` cannot build a
    /// converter; the store is then left empty and uninitialized.
    pub fn initialize(&mut self, currency: &Currency) -> CoinageResult<usize> {
        self.resolved.clear();
        self.unresolved.clear();
        self.initialized = false;

        let converter = currency.converter()?;
        for entry in &self.entries {
            let value = converter
                .parse(&entry.value)
                .or_else(|| Amount::parse_decimal(&entry.value));
            match value {
                Some(value) => {
                    self.resolved.insert(entry.key.clone(), value);
                }
                None => {
                    tracing::warn!(
                        "Override {:?} = '{}' is not an amount in '{}'",
                        entry.key,
                        entry.value,
                        currency.name()
                    );
                    self.unresolved.push(entry.key.clone());
                }
            }
        }

        self.initialized = true;
        Ok(self.resolved.len())
    }

    /// Resolved amount for `key`.
    #[must_use]
    pub fn try_get(&self, key: &K) -> Option<Amount> {
        self.resolved.get(key).copied()
    }

    /// Keys whose values did not resolve at the last initialization.
    #[must_use]
    pub fn unresolved(&self) -> &[K] {
        &self.unresolved
    }
}

impl<K> FromIterator<(K, String)> for OverrideStore<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn from_iter<I: IntoIterator<Item = (K, String)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.insert(key, value);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denomination::Denomination;
    use crate::error::CoinageError;

    fn coins() -> Currency {
        Currency::new(
            "coins",
            vec![
                Denomination::new(1, "c"),
                Denomination::new(100, "s"),
                Denomination::new(10_000, "g"),
            ],
        )
    }

    #[test]
    fn test_initialize_resolves_grammar_and_numbers() {
        let mut store: OverrideStore<String> = OverrideStore::new();
        store.insert("sword".to_string(), "2g50s");
        store.insert("apple".to_string(), "150");
        store.insert("dust".to_string(), "0.5");

        assert_eq!(store.initialize(&coins()).unwrap(), 3);
        assert_eq!(store.try_get(&"sword".to_string()), Some(Amount::from_units(25_000)));
        assert_eq!(store.try_get(&"apple".to_string()), Some(Amount::from_units(150)));
        assert_eq!(store.try_get(&"dust".to_string()), Some(Amount::from_parts(0, 500_000)));
        assert!(store.unresolved().is_empty());
    }

    #[test]
    fn test_unresolved_flagged_not_zeroed() {
        let mut store = OverrideStore::new();
        store.insert(TileWallKey::new(5, 2), "lots");
        store.insert(TileWallKey::new(6, 0), "1s");

        assert_eq!(store.initialize(&coins()).unwrap(), 1);
        assert_eq!(store.try_get(&TileWallKey::new(5, 2)), None);
        assert_eq!(store.unresolved(), &[TileWallKey::new(5, 2)]);
        assert_eq!(store.try_get(&TileWallKey::new(6, 0)), Some(Amount::from_units(100)));
    }

    #[test]
    fn test_reinitialize_picks_up_changes() {
        let mut store = OverrideStore::new();
        let key = ItemPrefixKey::new(1337, 4);
        store.insert(key, "1g");
        store.initialize(&coins()).unwrap();
        assert_eq!(store.try_get(&key), Some(Amount::from_units(10_000)));

        // Raw changes are invisible until the next initialize
        store.insert(key, "2g");
        assert_eq!(store.try_get(&key), Some(Amount::from_units(10_000)));
        assert_eq!(store.len(), 1);

        store.initialize(&coins()).unwrap();
        assert_eq!(store.try_get(&key), Some(Amount::from_units(20_000)));

        assert_eq!(store.remove(&key).as_deref(), Some("2g"));
        store.initialize(&coins()).unwrap();
        assert_eq!(store.try_get(&key), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_initialize_with_empty_currency_fails() {
        let mut store: OverrideStore<String> =
            [("a".to_string(), "1c".to_string())].into_iter().collect();
        store.initialize(&coins()).unwrap();
        assert!(store.is_initialized());

        let err = store.initialize(&Currency::new("void", Vec::new())).unwrap_err();
        assert!(matches!(err, CoinageError::EmptyCurrency(_)));
        assert!(!store.is_initialized());
        assert_eq!(store.try_get(&"a".to_string()), None);
    }

    #[test]
    fn test_composite_keys_from_toml() {
        #[derive(Deserialize)]
        struct Table {
            walls: Vec<OverrideEntry<TileWallKey>>,
            items: Vec<OverrideEntry<ItemPrefixKey>>,
        }

        let table: Table = toml::from_str(
            r#"
walls = [{ key = { tile = 5, wall = 2 }, value = "3g" }]
items = [{ key = { item = -7, prefix = 81 }, value = "12s" }]
"#,
        )
        .unwrap();

        let mut walls: OverrideStore<TileWallKey> =
            table.walls.into_iter().map(|e| (e.key, e.value)).collect();
        let mut items: OverrideStore<ItemPrefixKey> =
            table.items.into_iter().map(|e| (e.key, e.value)).collect();
        walls.initialize(&coins()).unwrap();
        items.initialize(&coins()).unwrap();

        assert_eq!(walls.try_get(&TileWallKey::new(5, 2)), Some(Amount::from_units(30_000)));
        assert_eq!(items.try_get(&ItemPrefixKey::new(-7, 81)), Some(Amount::from_units(1_200)));
    }

    #[test]
    fn test_get_before_initialize_is_none() {
        let mut store = OverrideStore::new();
        store.insert(1u32, "1g");
        assert!(!store.is_initialized());
        assert_eq!(store.try_get(&1), None);
    }
}
