//! # Converter - Amount Grammar
//!
//! Turns `"2g50s10c"` into `25010` and back.
//!
//! ## Grammar
//!
//! Built once per currency from its denominations sorted by multiplier,
//! largest first:
//!
//! ```text
//! amount := sign? token(d1)? sep* token(d2)? sep* ... token(dn)?
//! token(d) := digit+ abbreviation(d)
//! sign := '+' | '-'
//! sep := whitespace | ','
//! ```
//!
//! Every token is optional but at least one must match. Tokens are only
//! recognised in descending-multiplier order, so in `"10c2g"` the `2g` is
//! ignored. The match is unanchored: it starts at the leftmost position where
//! a sign or a token can be read, and anything after the last token is
//! ignored. A sign that no token follows ends the parse, so `"- 5g"` fails
//! instead of reading as `5g`.
//!
//! ## Formatting
//!
//! Greedy making-change over the same ordering. Precision below the smallest
//! denomination is truncated, never rounded. With separators on, every
//! emitted part except one for the last denomination in the list is followed
//! by `", "`, so `20000` in `g/s/c` formats as `"2g, "`.

use std::fmt;

use crate::amount::Amount;
use crate::currency::Currency;
use crate::denomination::{ColorHint, Denomination, DisplayStyle};
use crate::error::{CoinageError, CoinageResult};

/// Text appended after a formatted part when separators are requested.
pub const SEPARATOR: &str = ", ";

/// Output of [`Converter::format`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedAmount {
    /// Human-readable amount, e.g. `"2g, 50s, 10c"`.
    pub text: String,
    /// Color of the largest contributing denomination.
    pub color: ColorHint,
}

impl fmt::Display for FormattedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One line of a greedy decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Share {
    /// Multiplier of the denomination.
    pub multiplier: u64,
    /// How many of it were taken.
    pub count: u128,
}

/// Result of [`Converter::decompose`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decomposition {
    /// One entry per denomination with a non-zero multiplier, largest first.
    pub shares: Vec<Share>,
    /// Magnitude left over below the smallest denomination.
    pub remainder: Amount,
}

/// Outcome of trying the grammar at one start position.
enum Scan {
    NoToken,
    SignOnly,
    Overflow,
    Matched(Amount),
}

/// Parser and formatter for one currency.
#[derive(Clone, Debug)]
pub struct Converter {
    currency: String,
    /// Denominations sorted by multiplier, descending.
    rules: Vec<Denomination>,
}

impl Converter {
    /// Builds the grammar for `currency`.
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::EmptyCurrency` if the currency has no denominations.
    pub fn build(currency: &Currency) -> CoinageResult<Self> {
        if currency.denominations().is_empty() {
            return Err(CoinageError::EmptyCurrency(currency.name().to_string()));
        }

        let mut rules = currency.denominations().to_vec();
        // Stable: equal multipliers keep configured order
        rules.sort_by(|a, b| b.multiplier.cmp(&a.multiplier));

        tracing::debug!(
            "Built converter for '{}' with {} denominations",
            currency.name(),
            rules.len()
        );

        Ok(Self {
            currency: currency.name().to_string(),
            rules,
        })
    }

    /// Name of the currency this converter was built for.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Denominations in grammar order (largest multiplier first).
    #[must_use]
    pub fn rules(&self) -> &[Denomination] {
        &self.rules
    }

    /// Parses a human-typed amount.
    ///
    /// Returns `None` when no denomination token is found, when the first
    /// sign in the input is not followed by a token, or when the total does
    /// not fit in an [`Amount`].
    #[must_use]
    pub fn parse(&self, input: &str) -> Option<Amount> {
        for (start, _) in input.char_indices() {
            match self.scan_at(input, start) {
                Scan::Matched(value) => return Some(value),
                Scan::SignOnly | Scan::Overflow => return None,
                Scan::NoToken => {}
            }
        }
        None
    }

    /// Tries the whole grammar starting exactly at `start`.
    fn scan_at(&self, input: &str, start: usize) -> Scan {
        let bytes = input.as_bytes();
        let signed = matches!(bytes[start], b'-' | b'+');
        let negative = bytes[start] == b'-';
        let mut pos = if signed { start + 1 } else { start };

        let mut total: i128 = 0;
        let mut matched = false;
        for rule in &self.rules {
            let cursor = if matched { skip_separators(bytes, pos) } else { pos };
            let Some((digits, end)) = read_token(input, cursor, &rule.abbreviation) else {
                continue;
            };
            let Some(contribution) = parse_count(digits)
                .and_then(|count| count.checked_mul(i128::from(rule.multiplier)))
            else {
                return Scan::Overflow;
            };
            let Some(sum) = total.checked_add(contribution) else {
                return Scan::Overflow;
            };
            total = sum;
            pos = end;
            matched = true;
        }

        if !matched {
            return if signed { Scan::SignOnly } else { Scan::NoToken };
        }
        let total = if negative { -total } else { total };
        match Amount::checked_from_units(total) {
            Some(value) => Scan::Matched(value),
            None => Scan::Overflow,
        }
    }

    /// Greedy decomposition of `|value|`, largest denomination first.
    ///
    /// Each share takes `floor(remaining / multiplier)`; summing
    /// `count * multiplier` over all shares plus `remainder` gives back `|value|`.
    #[must_use]
    pub fn decompose(&self, value: Amount) -> Decomposition {
        let mut remaining = value.raw().unsigned_abs();
        let scale = Amount::SCALE.unsigned_abs();
        let mut shares = Vec::with_capacity(self.rules.len());

        for rule in self.rules.iter().filter(|r| r.multiplier > 0) {
            let unit = u128::from(rule.multiplier) * scale;
            let count = remaining / unit;
            remaining -= count * unit;
            shares.push(Share {
                multiplier: rule.multiplier,
                count,
            });
        }

        // Only the magnitude of i128::MIN falls outside i128
        let remainder = Amount::from_raw(i128::try_from(remaining).unwrap_or(i128::MAX));
        Decomposition { shares, remainder }
    }

    /// Formats `value` using the largest denominations first.
    ///
    /// A minus sign is only printed when `value <= -1` base unit; values in
    /// `(-1, 0)` print unsigned.
    #[must_use]
    pub fn format(
        &self,
        value: Amount,
        style: DisplayStyle,
        use_separators: bool,
    ) -> FormattedAmount {
        let decomposition = self.decompose(value);
        let mut shares = decomposition.shares.iter();
        let last = self.rules.len() - 1;
        let mut text = String::new();
        let mut color = None;

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.multiplier == 0 {
                continue;
            }
            let Some(share) = shares.next() else {
                break;
            };
            if share.count == 0 {
                continue;
            }
            text.push_str(&share.count.to_string());
            text.push_str(rule.label(style));
            color.get_or_insert(rule.primary_color);
            if use_separators && index != last {
                text.push_str(SEPARATOR);
            }
        }

        let (mut text, color) = match color {
            Some(color) => (text, color),
            None => {
                let smallest = self.smallest();
                (format!("0{}", smallest.label(style)), smallest.primary_color)
            }
        };

        if value.raw() <= -Amount::SCALE {
            text.insert(0, '-');
        }

        FormattedAmount { text, color }
    }

    /// Smallest denomination that can contribute, or the last rule if none can.
    fn smallest(&self) -> &Denomination {
        self.rules
            .iter()
            .rev()
            .find(|r| r.multiplier > 0)
            .unwrap_or(&self.rules[self.rules.len() - 1])
    }
}

/// Reads `digit+ abbreviation` at `pos`, returning the digits and the end offset.
fn read_token<'a>(input: &'a str, pos: usize, abbreviation: &str) -> Option<(&'a str, usize)> {
    if abbreviation.is_empty() {
        return None;
    }
    let rest = input.get(pos..)?;
    let digit_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digit_len == 0 || !rest[digit_len..].starts_with(abbreviation) {
        return None;
    }
    Some((&rest[..digit_len], pos + digit_len + abbreviation.len()))
}

fn skip_separators(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
        pos += 1;
    }
    pos
}

fn parse_count(digits: &str) -> Option<i128> {
    digits.bytes().try_fold(0i128, |acc, digit| {
        acc.checked_mul(10)?.checked_add(i128::from(digit - b'0'))
    })
}
