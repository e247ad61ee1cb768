//! Currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The reference currency every amount is entered in.
pub const REFERENCE_CURRENCY: &str = "UAH";

/// Codes shown when no currency list is configured, in display order.
pub const DEFAULT_CURRENCIES: &[&str] = &["USD", "EUR", "CNY", "RUB", "JPY", "CHF"];

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new currency code. The code is upper-cased and trimmed.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the code as a string slice.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// The reference currency.
    pub fn reference() -> Self {
        Self::new(REFERENCE_CURRENCY)
    }

    /// The default ordered set of target currencies.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CURRENCIES.iter().map(|c| Self::new(*c)).collect()
    }

    /// Parse a comma separated list such as `"usd, EUR,jpy"`.
    ///
    /// Blank items are skipped and duplicates keep their first position.
    pub fn parse_list(list: &str) -> Vec<Self> {
        let mut codes: Vec<Self> = Vec::new();
        for code in list.split(',').map(Self::new) {
            if !code.0.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
