//! # Currency Configuration
//!
//! Currencies are data, loaded once from TOML:
//!
//! ```toml
//! [[currencies]]
//! name = "coins"
//!
//! [[currencies.denominations]]
//! multiplier = 10000
//! full_name = "gold"
//! short_name = "gp"
//! abbreviation = "g"
//! primary_color = "#ffd700"
//!
//! [[overrides]]
//! currency = "coins"
//! key = "iron_sword"
//! value = "2g50s"
//!
//! [display]
//! style = "full_name"
//! separators = false
//! ```
//!
//! Loading only checks that the file is well-formed. Semantic problems (zero
//! multipliers, duplicate tokens, empty currencies) surface as warnings when
//! the registry is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::denomination::{ColorHint, Denomination, DisplayStyle};
use crate::error::CoinageResult;
use crate::overrides::OverrideStore;
use crate::registry::Registry;

const fn default_color() -> ColorHint {
    ColorHint::WHITE
}

const fn default_separators() -> bool {
    true
}

/// One denomination record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationConfig {
    /// Conversion factor to the base unit.
    pub multiplier: u64,
    /// Full name.
    #[serde(default)]
    pub full_name: String,
    /// Short name.
    #[serde(default)]
    pub short_name: String,
    /// Parsing token.
    pub abbreviation: String,
    /// Label for alternate display.
    #[serde(default)]
    pub alternate_label: Option<String>,
    /// Primary color (`#rrggbb[aa]`).
    #[serde(default = "default_color")]
    pub primary_color: ColorHint,
    /// Secondary color (`#rrggbb[aa]`).
    #[serde(default = "default_color")]
    pub secondary_color: ColorHint,
}

impl From<DenominationConfig> for Denomination {
    fn from(config: DenominationConfig) -> Self {
        Self {
            multiplier: config.multiplier,
            full_name: config.full_name,
            short_name: config.short_name,
            abbreviation: config.abbreviation,
            alternate_label: config.alternate_label,
            primary_color: config.primary_color,
            secondary_color: config.secondary_color,
        }
    }
}

/// One currency record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Unique name.
    pub name: String,
    /// Denominations in any order.
    #[serde(default)]
    pub denominations: Vec<DenominationConfig>,
}

impl From<CurrencyConfig> for Currency {
    fn from(config: CurrencyConfig) -> Self {
        Currency::new(
            config.name,
            config.denominations.into_iter().map(Denomination::from).collect(),
        )
    }
}

/// One string-keyed override bound to a currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideConfig {
    /// Currency the value is written in.
    pub currency: String,
    /// Application key.
    pub key: String,
    /// Amount text.
    pub value: String,
}

/// Default output settings for tools that format amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Label style.
    #[serde(default)]
    pub style: DisplayStyle,
    /// Whether parts are followed by `", "`.
    #[serde(default = "default_separators")]
    pub separators: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            style: DisplayStyle::default(),
            separators: default_separators(),
        }
    }
}

/// A whole configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinageConfig {
    /// Currencies in registration order.
    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,
    /// String-keyed overrides.
    #[serde(default)]
    pub overrides: Vec<OverrideConfig>,
    /// Output defaults.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl CoinageConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::InvalidConfig` if the document is malformed.
    pub fn from_toml_str(text: &str) -> CoinageResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::Io` if the file cannot be read, or
    /// `CoinageError::InvalidConfig` if it is malformed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CoinageResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            "Loaded {} currencies and {} overrides from {}",
            config.currencies.len(),
            config.overrides.len(),
            path.display()
        );
        Ok(config)
    }

    /// Builds fresh currencies from this configuration.
    #[must_use]
    pub fn build_currencies(&self) -> Vec<Currency> {
        self.currencies.iter().cloned().map(Currency::from).collect()
    }

    /// Builds a generation-0 registry from this configuration.
    #[must_use]
    pub fn build_registry(&self) -> Registry {
        Registry::new(self.build_currencies())
    }

    /// Raw overrides written in `currency`, ready for `initialize`.
    #[must_use]
    pub fn override_store(&self, currency: &str) -> OverrideStore<String> {
        self.overrides
            .iter()
            .filter(|o| o.currency == currency)
            .map(|o| (o.key.clone(), o.value.clone()))
            .collect()
    }
}
