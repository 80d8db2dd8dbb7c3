//! # Currency Registry
//!
//! Owns every configured [`Currency`], hands out stable ids, and attributes
//! arbitrary amount strings to the currency they belong to.
//!
//! ## Attribution
//!
//! ```text
//! "3g 20s"  ──> tokens [3g, 20s] ──> [coins, coins] ──> coins
//! "3g 20cr" ──> tokens [3g, 20cr] ──> [coins, credits] ──> rejected
//! ```
//!
//! A token is `digit+ label` where the label is any registered abbreviation or
//! full name; the longest label wins at each position.
//!
//! ## Reloads
//!
//! A registry is never mutated after construction. A reload builds a new one
//! with `generation + 1` and swaps it into a [`RegistryHandle`] in one step, so
//! readers see either the old registry or the new one, never a mix.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::converter::FormattedAmount;
use crate::currency::{Currency, CurrencyId};
use crate::denomination::{ConfigIssue, DisplayStyle};
use crate::error::{CoinageError, CoinageResult};
use crate::money::Money;

/// Something questionable found while building a registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryWarning {
    /// Two currencies claim the same token; `winner` was registered later.
    TokenCollision {
        /// The contested token.
        token: String,
        /// Currency that lost the token.
        previous: String,
        /// Currency that now owns the token.
        winner: String,
    },
    /// Two currencies share a name; the later one is returned by name lookups.
    DuplicateName {
        /// The shared name.
        name: String,
    },
    /// A currency failed validation.
    Invalid {
        /// Currency name.
        currency: String,
        /// The finding.
        issue: ConfigIssue,
    },
}

impl fmt::Display for RegistryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenCollision { token, previous, winner } => {
                write!(f, "token '{token}' of '{previous}' overridden by '{winner}'")
            }
            Self::DuplicateName { name } => write!(f, "duplicate currency name '{name}'"),
            Self::Invalid { currency, issue } => write!(f, "currency '{currency}': {issue}"),
        }
    }
}

/// The set of all currencies for one configuration generation.
#[derive(Debug)]
pub struct Registry {
    currencies: Vec<Currency>,
    by_name: HashMap<String, CurrencyId>,
    by_token: HashMap<String, CurrencyId>,
    /// Longest registered token in bytes, bounds the attribution lookahead.
    longest_token: usize,
    generation: u64,
    warnings: Vec<RegistryWarning>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Registry {
    /// Builds generation 0 from `currencies`; ids follow list order.
    #[must_use]
    pub fn new(currencies: Vec<Currency>) -> Self {
        Self::with_generation(currencies, 0)
    }

    /// Builds a registry stamped with `generation`.
    #[must_use]
    pub fn with_generation(currencies: Vec<Currency>, generation: u64) -> Self {
        let mut by_name = HashMap::with_capacity(currencies.len());
        let mut by_token: HashMap<String, CurrencyId> = HashMap::new();
        let mut warnings = Vec::new();

        for (index, currency) in currencies.iter().enumerate() {
            let id = CurrencyId(u32::try_from(index).unwrap_or(u32::MAX));

            for issue in currency.validate().issues {
                warnings.push(RegistryWarning::Invalid {
                    currency: currency.name().to_string(),
                    issue,
                });
            }

            if by_name.insert(currency.name().to_string(), id).is_some() {
                warnings.push(RegistryWarning::DuplicateName {
                    name: currency.name().to_string(),
                });
            }

            for denomination in currency.denominations() {
                for token in [&denomination.abbreviation, &denomination.full_name] {
                    if token.is_empty() {
                        continue;
                    }
                    let Some(previous) = by_token.insert(token.clone(), id) else {
                        continue;
                    };
                    if previous != id {
                        warnings.push(RegistryWarning::TokenCollision {
                            token: token.clone(),
                            previous: currencies[previous.index()].name().to_string(),
                            winner: currency.name().to_string(),
                        });
                    }
                }
            }
        }

        for warning in &warnings {
            tracing::warn!("Currency registry (generation {}): {}", generation, warning);
        }

        let longest_token = by_token.keys().map(String::len).max().unwrap_or(0);

        Self {
            currencies,
            by_name,
            by_token,
            longest_token,
            generation,
            warnings,
        }
    }

    /// Generation this registry was built as.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Warnings recorded while building.
    #[must_use]
    pub fn warnings(&self) -> &[RegistryWarning] {
        &self.warnings
    }

    /// Number of currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// True if no currencies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// All currencies with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (CurrencyId, &Currency)> {
        self.currencies
            .iter()
            .enumerate()
            .map(|(i, c)| (CurrencyId(u32::try_from(i).unwrap_or(u32::MAX)), c))
    }

    /// Gets a currency by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry. Use
    /// [`Registry::try_get_by_id`] for ids of unknown provenance.
    #[must_use]
    pub fn get_by_id(&self, id: CurrencyId) -> &Currency {
        &self.currencies[id.index()]
    }

    /// Gets a currency by id, `None` if out of range.
    #[must_use]
    pub fn try_get_by_id(&self, id: CurrencyId) -> Option<&Currency> {
        self.currencies.get(id.index())
    }

    /// Gets a currency by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Currency> {
        self.id_of(name).map(|id| self.get_by_id(id))
    }

    /// Gets the id registered for `name`.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<CurrencyId> {
        self.by_name.get(name).copied()
    }

    /// Gets the currency owning an abbreviation or full name.
    #[must_use]
    pub fn get_by_token(&self, token: &str) -> Option<&Currency> {
        self.by_token.get(token).map(|&id| self.get_by_id(id))
    }

    /// Finds the single currency every token in `text` belongs to.
    ///
    /// Returns `None` if there are no tokens or if tokens from two different
    /// currencies are mixed.
    #[must_use]
    pub fn find_currency_for_amount_string(&self, text: &str) -> Option<&Currency> {
        self.attribute(text).map(|id| self.get_by_id(id))
    }

    /// Id-returning form of [`Registry::find_currency_for_amount_string`].
    #[must_use]
    pub fn attribute(&self, text: &str) -> Option<CurrencyId> {
        let mut found = self.tokens_in(text).into_iter();
        let first = found.next()?;
        found.all(|id| id == first).then_some(first)
    }

    /// Currency of every token in `text`, in order of appearance.
    fn tokens_in(&self, text: &str) -> Vec<CurrencyId> {
        let bytes = text.as_bytes();
        let mut found = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() {
            if !bytes[pos].is_ascii_digit() {
                pos += 1;
                continue;
            }
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if let Some((id, len)) = self.longest_token_at(text, pos) {
                found.push(id);
                pos += len;
            }
        }

        found
    }

    /// Longest registered token starting at byte `pos`.
    fn longest_token_at(&self, text: &str, pos: usize) -> Option<(CurrencyId, usize)> {
        let available = text.len() - pos;
        (1..=self.longest_token.min(available)).rev().find_map(|len| {
            let candidate = text.get(pos..pos + len)?;
            self.by_token.get(candidate).map(|&id| (id, len))
        })
    }

    /// Attributes `text` to a currency and parses it there.
    ///
    /// Returns `None` when attribution fails, when the currency is unusable,
    /// or when its grammar finds no amount.
    #[must_use]
    pub fn parse_money(&self, text: &str) -> Option<Money> {
        let id = self.attribute(text)?;
        let value = self.get_by_id(id).converter().ok()?.parse(text)?;
        Some(Money::new(value, id, self.generation))
    }

    /// Checks that `money` belongs to this generation and returns its currency.
    ///
    /// # Errors
    ///
    /// - `StaleReference` if the registry was rebuilt since `money` was made
    /// - `UnknownCurrency` if the id is out of range
    pub fn resolve(&self, money: &Money) -> CoinageResult<&Currency> {
        if money.is_stale(self) {
            return Err(CoinageError::StaleReference {
                held: money.generation,
                current: self.generation,
            });
        }
        self.try_get_by_id(money.currency)
            .ok_or_else(|| CoinageError::UnknownCurrency(money.currency.to_string()))
    }

    /// Formats `money` in its own currency.
    ///
    /// # Errors
    ///
    /// See [`Registry::resolve`] and [`Currency::converter`].
    pub fn format_money(
        &self,
        money: &Money,
        style: DisplayStyle,
        use_separators: bool,
    ) -> CoinageResult<FormattedAmount> {
        self.resolve(money)?.format(money.value, style, use_separators)
    }
}

// =============================================================================
// RegistryHandle - atomic reloads
// =============================================================================

/// Shared owner of the current registry.
///
/// ## Thread Safety
///
/// Readers take an `Arc` snapshot and keep using it for as long as they like;
/// a reload only replaces the pointer. Reloads are serialised through an
/// upgradable read lock so generations stay strictly increasing.
#[derive(Debug)]
pub struct RegistryHandle {
    current: RwLock<Arc<Registry>>,
}

impl RegistryHandle {
    /// Wraps an initial registry.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// Snapshot of the current registry.
    #[must_use]
    pub fn current(&self) -> Arc<Registry> {
        Arc::clone(&*self.current.read())
    }

    /// Generation of the current registry.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.current.read().generation()
    }

    /// Replaces the registry with one built from `currencies`.
    ///
    /// Returns the newly installed registry.
    pub fn reload(&self, currencies: Vec<Currency>) -> Arc<Registry> {
        let guard = self.current.upgradable_read();
        let generation = guard.generation() + 1;
        let registry = Arc::new(Registry::with_generation(currencies, generation));

        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        *guard = Arc::clone(&registry);
        drop(guard);

        tracing::info!(
            "Currency registry reloaded: generation {} with {} currencies",
            generation,
            registry.len()
        );
        registry
    }
}
