//! # Codec Error Types
//!
//! Errors for configuration and programmer-level failures.
//!
//! A user typing a malformed amount is NOT an error: parsing returns `None`
//! so callers can simply prompt again.

use thiserror::Error;

/// Errors that can occur in the amount codec.
#[derive(Error, Debug)]
pub enum CoinageError {
    /// A currency with no denominations cannot build a converter.
    #[error("currency '{0}' has no denominations")]
    EmptyCurrency(String),

    /// A currency name or id did not resolve in the registry.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// An amount reference was captured under an older registry generation.
    #[error("stale amount reference: captured at generation {held}, registry is at {current}")]
    StaleReference {
        /// Generation stamped on the reference.
        held: u64,
        /// Generation of the registry it was checked against.
        current: u64,
    },

    /// Two amounts of different currencies were combined.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency id of the left operand.
        left: u32,
        /// Currency id of the right operand.
        right: u32,
    },

    /// Arithmetic overflow in fixed-point calculation.
    #[error("arithmetic overflow in amount calculation")]
    ArithmeticOverflow,

    /// Text was not a plain decimal number.
    #[error("invalid number: '{0}'")]
    InvalidNumber(String),

    /// Text was not a `#rrggbb` / `#rrggbbaa` color.
    #[error("invalid color hint: '{0}'")]
    InvalidColor(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for CoinageError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Result type for codec operations.
pub type CoinageResult<T> = Result<T, CoinageError>;
