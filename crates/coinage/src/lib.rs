//! # Coinage - Multi-Denomination Amount Codec
//!
//! Turns human-typed amounts such as `"2g50s10c"` into canonical quantities,
//! turns quantities back into text using the largest denominations first, and
//! attributes arbitrary amount strings to the currency they were written in.
//!
//! ## Design Principles
//!
//! 1. **Zero floating point** - All quantities are fixed-point [`Amount`]s
//! 2. **Bad input is not an error** - Unparseable text yields `None`, never a panic
//! 3. **Immutable currencies** - A reload builds a new [`Registry`] and bumps its generation
//! 4. **External configuration** - Currencies come from TOML files
//!
//! ## Thread Safety
//!
//! Everything is read-mostly. Converters are built lazily and published once;
//! registry swaps go through [`RegistryHandle`].
//!
//! ## Example
//!
//! ```rust
//! use coinage::{Amount, Currency, Denomination, DisplayStyle, Registry};
//!
//! let coins = Currency::new(
//!     "coins",
//!     vec![
//!         Denomination::new(1, "c"),
//!         Denomination::new(100, "s"),
//!         Denomination::new(10_000, "g"),
//!     ],
//! );
//! let registry = Registry::new(vec![coins]);
//!
//! let money = registry.parse_money("2g50s10c").unwrap();
//! assert_eq!(money.value, Amount::from_units(25_010));
//!
//! let text = registry
//!     .format_money(&money, DisplayStyle::Abbreviation, true)
//!     .unwrap();
//! assert_eq!(text.text, "2g, 50s, 10c");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod amount;
pub mod config;
pub mod converter;
pub mod currency;
pub mod denomination;
pub mod error;
pub mod money;
pub mod overrides;
pub mod registry;

pub use amount::Amount;
pub use config::{
    CoinageConfig, CurrencyConfig, DenominationConfig, DisplayConfig, OverrideConfig,
};
pub use converter::{Converter, Decomposition, FormattedAmount, Share};
pub use currency::{Currency, CurrencyId, ValidationReport};
pub use denomination::{ColorHint, ConfigIssue, Denomination, DisplayStyle, IssueKind, Severity};
pub use error::{CoinageError, CoinageResult};
pub use money::Money;
pub use overrides::{ItemPrefixKey, OverrideEntry, OverrideStore, TileWallKey};
pub use registry::{Registry, RegistryHandle, RegistryWarning};
