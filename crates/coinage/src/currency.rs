//! # Currencies
//!
//! A named, ordered set of denominations plus its lazily built
//! [`Converter`].
//!
//! ## Thread Safety
//!
//! `Currency` is `Send + Sync`. The converter lives in a `OnceLock`: two
//! threads racing on first use may both build one, but exactly one is
//! published and both callers observe it. Builds are pure, so the loser's work
//! is simply dropped.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use crate::amount::Amount;
use crate::converter::{Converter, FormattedAmount};
use crate::denomination::{ConfigIssue, Denomination, DisplayStyle, IssueKind};
use crate::error::CoinageResult;

/// Stable index of a currency inside one registry generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurrencyId(pub u32);

impl CurrencyId {
    /// Returns the id as a slice index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named set of denominations.
#[derive(Debug)]
pub struct Currency {
    name: String,
    denominations: Vec<Denomination>,
    converter: OnceLock<Converter>,
}

impl Currency {
    /// Creates a currency. Denominations keep their configured order.
    #[must_use]
    pub fn new(name: impl Into<String>, denominations: Vec<Denomination>) -> Self {
        Self {
            name: name.into(),
            denominations,
            converter: OnceLock::new(),
        }
    }

    /// Unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Denominations in configured order.
    #[must_use]
    pub fn denominations(&self) -> &[Denomination] {
        &self.denominations
    }

    /// Returns the converter, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::EmptyCurrency` if there are no denominations.
    /// The failure is not cached; every call fails until the currency is
    /// rebuilt from corrected configuration.
    pub fn converter(&self) -> CoinageResult<&Converter> {
        if let Some(converter) = self.converter.get() {
            return Ok(converter);
        }
        let built = Converter::build(self)?;
        Ok(self.converter.get_or_init(|| built))
    }

    /// Parses `text` with this currency's converter.
    ///
    /// `Ok(None)` means the text holds no amount; `Err` means the currency
    /// itself is unusable.
    ///
    /// # Errors
    ///
    /// See [`Currency::converter`].
    pub fn parse(&self, text: &str) -> CoinageResult<Option<Amount>> {
        Ok(self.converter()?.parse(text))
    }

    /// Formats `value` with this currency's converter.
    ///
    /// # Errors
    ///
    /// See [`Currency::converter`].
    pub fn format(
        &self,
        value: Amount,
        style: DisplayStyle,
        use_separators: bool,
    ) -> CoinageResult<FormattedAmount> {
        Ok(self.converter()?.format(value, style, use_separators))
    }

    /// Validates the currency and every denomination in it.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut issues = Vec::new();

        if self.denominations.is_empty() {
            issues.push(ConfigIssue::error(IssueKind::EmptyCurrency, self.name.clone()));
            return ValidationReport { currency: self.name.clone(), issues };
        }

        let mut abbreviations = HashSet::new();
        let mut multipliers: HashMap<u64, usize> = HashMap::new();
        for denomination in &self.denominations {
            issues.extend(denomination.validate());

            if !denomination.abbreviation.is_empty()
                && !abbreviations.insert(denomination.abbreviation.as_str())
            {
                issues.push(ConfigIssue::warning(
                    IssueKind::DuplicateAbbreviation,
                    denomination.abbreviation.clone(),
                ));
            }
            *multipliers.entry(denomination.multiplier).or_insert(0) += 1;
        }

        for denomination in &self.denominations {
            let seen = multipliers.get_mut(&denomination.multiplier);
            if let Some(count) = seen {
                // Report each shared multiplier once
                if *count > 1 {
                    issues.push(ConfigIssue::warning(
                        IssueKind::DuplicateMultiplier,
                        denomination.abbreviation.clone(),
                    ));
                    *count = 0;
                }
            }
        }

        if !multipliers.contains_key(&1) {
            issues.push(ConfigIssue::warning(IssueKind::NoBaseUnit, self.name.clone()));
        }

        ValidationReport { currency: self.name.clone(), issues }
    }
}

/// Everything `Currency::validate` found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Currency name.
    pub currency: String,
    /// All findings, warnings and errors mixed, in discovery order.
    pub issues: Vec<ConfigIssue>,
}

impl ValidationReport {
    /// Warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    /// Errors only.
    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    /// True if the currency cannot be used at all.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.issues.iter().any(ConfigIssue::is_error)
    }

    /// True if nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoinageError;

    fn coins() -> Currency {
        Currency::new(
            "coins",
            vec![
                Denomination::new(1, "c").with_full_name("copper"),
                Denomination::new(100, "s").with_full_name("silver"),
                Denomination::new(10_000, "g").with_full_name("gold"),
            ],
        )
    }

    #[test]
    fn test_converter_is_memoized() {
        let currency = coins();
        let first = currency.converter().unwrap() as *const Converter;
        let second = currency.converter().unwrap() as *const Converter;
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_currency_fails_every_time() {
        let currency = Currency::new("void", Vec::new());
        for _ in 0..2 {
            assert!(matches!(currency.converter(), Err(CoinageError::EmptyCurrency(_))));
        }
        assert!(currency.parse("1c").is_err());
        assert!(currency.validate().is_fatal());
    }

    #[test]
    fn test_clean_currency_validates() {
        let report = coins().validate();
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn test_duplicate_abbreviation_warns() {
        let currency = Currency::new(
            "dupes",
            vec![Denomination::new(1, "c"), Denomination::new(10, "c")],
        );
        let report = currency.validate();
        assert!(!report.is_fatal());
        assert!(report
            .warnings()
            .any(|i| i.kind == IssueKind::DuplicateAbbreviation));
    }

    #[test]
    fn test_duplicate_multiplier_reported_once() {
        let currency = Currency::new(
            "twins",
            vec![
                Denomination::new(1, "a"),
                Denomination::new(1, "b"),
                Denomination::new(1, "c"),
            ],
        );
        let report = currency.validate();
        let count = report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::DuplicateMultiplier)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_base_unit_warns() {
        let currency = Currency::new("big", vec![Denomination::new(5, "f")]);
        assert!(currency
            .validate()
            .warnings()
            .any(|i| i.kind == IssueKind::NoBaseUnit));
    }

    #[test]
    fn test_racing_builders_publish_one_converter() {
        let currency = std::sync::Arc::new(coins());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let currency = std::sync::Arc::clone(&currency);
                std::thread::spawn(move || {
                    currency.converter().unwrap() as *const Converter as usize
                })
            })
            .collect();
        let addrs: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(addrs.len(), 1);
    }
}
