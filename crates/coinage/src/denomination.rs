//! # Denominations
//!
//! One unit of a currency: its conversion factor to the base unit, the labels
//! it is written with, and the colors a UI may paint it in.
//!
//! Denominations are immutable once built. Validation never rejects a
//! denomination outright; it produces [`ConfigIssue`]s that the registry logs
//! and that callers may inspect.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoinageError;

// =============================================================================
// ColorHint
// =============================================================================

/// Opaque RGBA display hint, passed through the codec untouched.
///
/// Configured as `"#rrggbb"` (alpha defaults to `ff`) or `"#rrggbbaa"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorHint(u32);

impl ColorHint {
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Creates a hint from packed `0xRRGGBBAA`.
    #[inline]
    #[must_use]
    pub const fn from_rgba(rgba: u32) -> Self {
        Self(rgba)
    }

    /// Creates an opaque hint from its channels.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | 0xFF)
    }

    /// Returns packed `0xRRGGBBAA`.
    #[inline]
    #[must_use]
    pub const fn rgba(self) -> u32 {
        self.0
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    ///
    /// # Errors
    ///
    /// Returns `CoinageError::InvalidColor` for any other shape.
    pub fn from_hex(text: &str) -> Result<Self, CoinageError> {
        let hex = text.trim().trim_start_matches('#');
        let invalid = || CoinageError::InvalidColor(text.to_string());
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        match hex.len() {
            6 => Ok(Self(value << 8 | 0xFF)),
            8 => Ok(Self(value)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ColorHint {
    type Error = CoinageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ColorHint> for String {
    fn from(color: ColorHint) -> Self {
        color.to_string()
    }
}

impl fmt::Display for ColorHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

impl fmt::Debug for ColorHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColorHint({self})")
    }
}

// =============================================================================
// DisplayStyle
// =============================================================================

/// Which label a formatted amount is written with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    /// `2g, 50s` - the parseable form.
    #[default]
    Abbreviation,
    /// Short name, e.g. `2gp`.
    ShortName,
    /// Full name, e.g. `2gold`.
    FullName,
    /// Alternate label (special display modes). Falls back to the abbreviation.
    Alternate,
}

// =============================================================================
// Denomination
// =============================================================================

/// One unit of a currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Denomination {
    /// Conversion factor to the base unit (1 = base unit).
    pub multiplier: u64,
    /// Full name, e.g. "gold".
    pub full_name: String,
    /// Short name, e.g. "gp".
    pub short_name: String,
    /// Parsing token, e.g. "g". Should be unique within its currency.
    pub abbreviation: String,
    /// Label used by [`DisplayStyle::Alternate`].
    pub alternate_label: Option<String>,
    /// Primary display color.
    pub primary_color: ColorHint,
    /// Secondary display color.
    pub secondary_color: ColorHint,
}

impl Denomination {
    /// Creates a denomination whose labels are all `abbreviation`.
    ///
    /// Use the `with_*` builders to fill in the rest.
    #[must_use]
    pub fn new(multiplier: u64, abbreviation: impl Into<String>) -> Self {
        let abbreviation = abbreviation.into();
        Self {
            multiplier,
            full_name: abbreviation.clone(),
            short_name: abbreviation.clone(),
            abbreviation,
            alternate_label: None,
            primary_color: ColorHint::WHITE,
            secondary_color: ColorHint::WHITE,
        }
    }

    /// Sets the full name.
    #[must_use]
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    /// Sets the short name.
    #[must_use]
    pub fn with_short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = name.into();
        self
    }

    /// Sets the alternate label.
    #[must_use]
    pub fn with_alternate_label(mut self, label: impl Into<String>) -> Self {
        self.alternate_label = Some(label.into());
        self
    }

    /// Sets both display colors.
    #[must_use]
    pub const fn with_colors(mut self, primary: ColorHint, secondary: ColorHint) -> Self {
        self.primary_color = primary;
        self.secondary_color = secondary;
        self
    }

    /// Returns the label for `style`.
    #[must_use]
    pub fn label(&self, style: DisplayStyle) -> &str {
        match style {
            DisplayStyle::Abbreviation => &self.abbreviation,
            DisplayStyle::ShortName => &self.short_name,
            DisplayStyle::FullName => &self.full_name,
            DisplayStyle::Alternate => self
                .alternate_label
                .as_deref()
                .unwrap_or(&self.abbreviation),
        }
    }

    /// Returns structured warnings and errors about this denomination.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let subject = || self.abbreviation.clone();

        if self.abbreviation.is_empty() {
            issues.push(ConfigIssue::error(IssueKind::EmptyAbbreviation, subject()));
        } else if self.abbreviation.bytes().any(|b| b.is_ascii_digit()) {
            issues.push(ConfigIssue::warning(IssueKind::DigitInAbbreviation, subject()));
        }
        if self.multiplier == 0 {
            issues.push(ConfigIssue::warning(IssueKind::ZeroMultiplier, subject()));
        }
        if self.full_name.is_empty() {
            issues.push(ConfigIssue::warning(IssueKind::MissingFullName, subject()));
        }
        if self.short_name.is_empty() {
            issues.push(ConfigIssue::warning(IssueKind::MissingShortName, subject()));
        }

        issues
    }
}

// =============================================================================
// Validation
// =============================================================================

/// How serious a configuration issue is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Logged; processing continues with degraded behavior.
    Warning,
    /// The currency cannot be used for parse/format.
    Error,
}

/// What is wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Abbreviation is empty and can never be tokenised.
    EmptyAbbreviation,
    /// Abbreviation contains digits, which the token grammar would swallow.
    DigitInAbbreviation,
    /// Multiplier is 0; the denomination never contributes to a decomposition.
    ZeroMultiplier,
    /// No full name.
    MissingFullName,
    /// No short name.
    MissingShortName,
    /// Two denominations in one currency share an abbreviation.
    DuplicateAbbreviation,
    /// Two denominations in one currency share a multiplier.
    DuplicateMultiplier,
    /// No denomination has multiplier 1.
    NoBaseUnit,
    /// The currency has no denominations at all.
    EmptyCurrency,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyAbbreviation => "empty abbreviation",
            Self::DigitInAbbreviation => "abbreviation contains digits",
            Self::ZeroMultiplier => "zero multiplier",
            Self::MissingFullName => "missing full name",
            Self::MissingShortName => "missing short name",
            Self::DuplicateAbbreviation => "duplicate abbreviation",
            Self::DuplicateMultiplier => "duplicate multiplier",
            Self::NoBaseUnit => "no base unit (multiplier 1)",
            Self::EmptyCurrency => "no denominations",
        };
        f.write_str(text)
    }
}

/// A single validation finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Warning or error.
    pub severity: Severity,
    /// What is wrong.
    pub kind: IssueKind,
    /// The denomination abbreviation or currency name concerned.
    pub subject: String,
}

impl ConfigIssue {
    /// Creates a warning.
    #[must_use]
    pub fn warning(kind: IssueKind, subject: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, kind, subject: subject.into() }
    }

    /// Creates an error.
    #[must_use]
    pub fn error(kind: IssueKind, subject: impl Into<String>) -> Self {
        Self { severity: Severity::Error, kind, subject: subject.into() }
    }

    /// Returns true for errors.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} ('{}')", self.severity, self.kind, self.subject)
    }
}
