//! # Fixed-Point Amounts
//!
//! **NO FLOATING POINT IN AMOUNTS**
//!
//! Every canonical quantity handled by the codec is an [`Amount`]: a signed
//! fixed-point decimal measured in base units (the denomination with
//! multiplier 1).
//!
//! ## Precision
//!
//! Internally stores value * 10^6 as an `i128`. Six decimal places are more
//! than any denomination table needs (amounts produced by parsing are always
//! whole base units) while still letting plain numeric overrides such as
//! `"0.25"` survive without rounding.
//!
//! ## Range
//!
//! - Minimum: -170,141,183,460,469,231,731,687,303,715,884.105728
//! - Maximum:  170,141,183,460,469,231,731,687,303,715,884.105727

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoinageError, CoinageResult};

/// Number of decimal places carried below one base unit.
pub const DECIMAL_PLACES: u32 = 6;

/// The raw multiplier for one base unit.
const SCALE: i128 = 10i128.pow(DECIMAL_PLACES);

/// Signed fixed-point quantity of base units.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Amount(i128);

impl Amount {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One base unit (1.000000).
    pub const ONE: Self = Self(SCALE);

    /// Raw value of one base unit.
    pub const SCALE: i128 = SCALE;

    /// Maximum representable value.
    pub const MAX: Self = Self(i128::MAX);

    /// Minimum representable value.
    pub const MIN: Self = Self(i128::MIN);

    /// Creates an amount from a whole number of base units.
    ///
    /// ```rust,ignore
    /// let ten = Amount::from_units(10); // 10.000000
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        // i64 * 10^6 always fits in i128
        Self(units as i128 * SCALE)
    }

    /// Creates an amount from a wide whole number, `None` if out of range.
    #[inline]
    #[must_use]
    pub const fn checked_from_units(units: i128) -> Option<Self> {
        match units.checked_mul(SCALE) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Creates an amount from a whole part and a millionths part.
    ///
    /// The sign is taken from `units`; `micros` is always a magnitude.
    ///
    /// ```rust,ignore
    /// let value = Amount::from_parts(3, 250_000); // 3.250000
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_parts(units: i64, micros: u32) -> Self {
        let frac = (micros as i128) % SCALE;
        if units < 0 {
            Self(units as i128 * SCALE - frac)
        } else {
            Self(units as i128 * SCALE + frac)
        }
    }

    /// Creates an amount from its raw internal value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// Returns the raw internal value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Returns the whole number of base units, truncated toward zero.
    #[inline]
    #[must_use]
    pub const fn units(self) -> i128 {
        self.0 / SCALE
    }

    /// Returns the magnitude of the part below one base unit (0-999999).
    #[inline]
    #[must_use]
    pub const fn fraction(self) -> u32 {
        (self.0 % SCALE).unsigned_abs() as u32
    }

    /// Returns true if this value is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this value is below zero.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value. `MIN` saturates to `MAX`.
    #[inline]
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// -1, 0 or 1 depending on the sign.
    #[inline]
    #[must_use]
    pub const fn signum(self) -> i32 {
        self.0.signum() as i32
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication by an integer.
    #[inline]
    #[must_use]
    pub const fn checked_mul_int(self, rhs: i128) -> Option<Self> {
        match self.0.checked_mul(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked negation.
    #[inline]
    #[must_use]
    pub const fn checked_neg(self) -> Option<Self> {
        match self.0.checked_neg() {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Safe addition with error on overflow.
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::ArithmeticOverflow` if the addition would overflow.
    #[inline]
    pub fn safe_add(self, rhs: Self) -> CoinageResult<Self> {
        self.checked_add(rhs).ok_or(CoinageError::ArithmeticOverflow)
    }

    /// Safe subtraction with error on overflow.
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::ArithmeticOverflow` if the subtraction would overflow.
    #[inline]
    pub fn safe_sub(self, rhs: Self) -> CoinageResult<Self> {
        self.checked_sub(rhs).ok_or(CoinageError::ArithmeticOverflow)
    }

    /// Parses a plain decimal number such as `"12"`, `"-3.5"` or `"+0.000001"`.
    ///
    /// At most [`DECIMAL_PLACES`] fractional digits are accepted. Surrounding
    /// whitespace is ignored. Returns `None` for anything else.
    #[must_use]
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if frac.len() > DECIMAL_PLACES as usize {
            return None;
        }

        let mut raw: i128 = 0;
        for digit in whole.bytes() {
            raw = raw.checked_mul(10)?.checked_add(i128::from(digit - b'0'))?;
        }
        raw = raw.checked_mul(SCALE)?;

        let mut frac_raw: i128 = 0;
        for digit in frac.bytes() {
            frac_raw = frac_raw * 10 + i128::from(digit - b'0');
        }
        for _ in frac.len()..DECIMAL_PLACES as usize {
            frac_raw *= 10;
        }
        raw = raw.checked_add(frac_raw)?;

        Some(Self(if negative { -raw } else { raw }))
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Amount {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Mul<i128> for Amount {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i128) -> Self::Output {
        Self(self.0.wrapping_mul(rhs))
    }
}

impl Neg for Amount {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self::from_units(units)
    }
}

impl FromStr for Amount {
    type Err = CoinageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s).ok_or_else(|| CoinageError::InvalidNumber(s.to_string()))
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:06}", magnitude / scale, magnitude % scale)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let value = Amount::from_units(100);
        assert_eq!(value.units(), 100);
        assert_eq!(value.fraction(), 0);
        assert_eq!(value.raw(), 100_000_000);
    }

    #[test]
    fn test_from_parts_negative() {
        let value = Amount::from_parts(-3, 250_000);
        assert_eq!(value.units(), -3);
        assert_eq!(value.fraction(), 250_000);
        assert_eq!(format!("{value}"), "-3.250000");
    }

    #[test]
    fn test_units_truncate_toward_zero() {
        assert_eq!(Amount::from_parts(2, 999_999).units(), 2);
        assert_eq!(Amount::from_parts(-2, 999_999).units(), -2);
        assert_eq!(Amount::from_raw(-1).units(), 0);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Amount::parse_decimal("42"), Some(Amount::from_units(42)));
        assert_eq!(Amount::parse_decimal(" -3.5 "), Some(Amount::from_parts(-3, 500_000)));
        assert_eq!(Amount::parse_decimal("+.25"), Some(Amount::from_parts(0, 250_000)));
        assert_eq!(Amount::parse_decimal("7."), Some(Amount::from_units(7)));
        assert_eq!(Amount::parse_decimal("0.000001"), Some(Amount::from_raw(1)));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for bad in ["", "-", ".", "abc", "1.2.3", "1e5", "1.0000001", "2g", "--1"] {
            assert_eq!(Amount::parse_decimal(bad), None, "accepted {bad:?}");
        }
    }

    #[test]
    fn test_parse_decimal_overflow() {
        let huge = "9".repeat(60);
        assert_eq!(Amount::parse_decimal(&huge), None);
    }

    #[test]
    fn test_serde_as_decimal_string() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Price {
            value: Amount,
        }

        let price = Price { value: Amount::from_parts(2, 500_000) };
        let text = toml::to_string(&price).unwrap();
        assert_eq!(text.trim(), "value = \"2.500000\"");
        assert_eq!(toml::from_str::<Price>(&text).unwrap(), price);
        assert!(toml::from_str::<Price>("value = \"2g\"").is_err());
    }

    #[test]
    fn test_from_str_error() {
        let err = "nope".parse::<Amount>().unwrap_err();
        assert!(matches!(err, CoinageError::InvalidNumber(_)));
    }

    #[test]
    fn test_checked_add_overflow() {
        assert!(Amount::MAX.checked_add(Amount::ONE).is_none());
        assert!(Amount::MIN.checked_neg().is_none());
        assert!(Amount::MAX.safe_add(Amount::ONE).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Amount::from_parts(42, 123_456)), "42.123456");
        assert_eq!(format!("{}", Amount::from_raw(-500_000)), "-0.500000");
        assert_eq!(format!("{:?}", Amount::ZERO), "Amount(0.000000)");
    }

    #[test]
    fn test_abs_and_sign() {
        let value = Amount::from_units(-7);
        assert!(value.is_negative());
        assert_eq!(value.abs(), Amount::from_units(7));
        assert_eq!(value.signum(), -1);
        assert_eq!(Amount::ZERO.signum(), 0);
    }
}
