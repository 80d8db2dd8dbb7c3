//! # Amount References
//!
//! A [`Money`] ties an [`Amount`] to the currency it was parsed in and to the
//! registry generation that currency id belongs to.
//!
//! Currency ids are only meaningful within one registry generation. After a
//! reload the same id may name a different currency, so holders compare the
//! stamped generation before trusting the id. The codec never migrates a
//! stale reference on its own.

use crate::amount::Amount;
use crate::currency::CurrencyId;
use crate::error::{CoinageError, CoinageResult};
use crate::registry::Registry;

/// An amount in a specific currency, stamped with a registry generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Money {
    /// Canonical quantity in base units.
    pub value: Amount,
    /// Currency the value is measured in.
    pub currency: CurrencyId,
    /// Registry generation the currency id was issued under.
    pub generation: u64,
}

impl Money {
    /// Creates a reference.
    #[inline]
    #[must_use]
    pub const fn new(value: Amount, currency: CurrencyId, generation: u64) -> Self {
        Self { value, currency, generation }
    }

    /// Same currency and generation, different value.
    #[inline]
    #[must_use]
    pub const fn with_value(self, value: Amount) -> Self {
        Self { value, ..self }
    }

    /// True if `registry` was rebuilt since this reference was created.
    #[inline]
    #[must_use]
    pub fn is_stale(&self, registry: &Registry) -> bool {
        self.generation != registry.generation()
    }

    /// Adds two references of the same currency.
    ///
    /// # Errors
    ///
    /// - `StaleReference` if the generations differ
    /// - `CurrencyMismatch` if the currencies differ
    /// - `ArithmeticOverflow` if the sum does not fit
    pub fn checked_add(self, rhs: Self) -> CoinageResult<Self> {
        self.ensure_compatible(rhs)?;
        Ok(self.with_value(self.value.safe_add(rhs.value)?))
    }

    /// Subtracts two references of the same currency.
    ///
    /// # Errors
    ///
    /// Same as [`Money::checked_add`].
    pub fn checked_sub(self, rhs: Self) -> CoinageResult<Self> {
        self.ensure_compatible(rhs)?;
        Ok(self.with_value(self.value.safe_sub(rhs.value)?))
    }

    fn ensure_compatible(self, rhs: Self) -> CoinageResult<()> {
        if self.generation != rhs.generation {
            return Err(CoinageError::StaleReference {
                held: rhs.generation,
                current: self.generation,
            });
        }
        if self.currency != rhs.currency {
            return Err(CoinageError::CurrencyMismatch {
                left: self.currency.0,
                right: rhs.currency.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_same_currency() {
        let a = Money::new(Amount::from_units(10), CurrencyId(0), 3);
        let b = Money::new(Amount::from_units(5), CurrencyId(0), 3);
        assert_eq!(a.checked_add(b).unwrap().value, Amount::from_units(15));
        assert_eq!(a.checked_sub(b).unwrap().value, Amount::from_units(5));
    }

    #[test]
    fn test_add_rejects_other_currency() {
        let a = Money::new(Amount::from_units(10), CurrencyId(0), 0);
        let b = Money::new(Amount::from_units(5), CurrencyId(1), 0);
        assert!(matches!(
            a.checked_add(b),
            Err(CoinageError::CurrencyMismatch { left: 0, right: 1 })
        ));
    }

    #[test]
    fn test_add_rejects_other_generation() {
        let a = Money::new(Amount::from_units(10), CurrencyId(0), 2);
        let b = Money::new(Amount::from_units(5), CurrencyId(0), 1);
        assert!(matches!(
            a.checked_add(b),
            Err(CoinageError::StaleReference { held: 1, current: 2 })
        ));
    }

    #[test]
    fn test_add_overflow() {
        let a = Money::new(Amount::MAX, CurrencyId(0), 0);
        let b = Money::new(Amount::ONE, CurrencyId(0), 0);
        assert!(matches!(a.checked_add(b), Err(CoinageError::ArithmeticOverflow)));
    }
}
