//! FX engine error types.

use ratedesk_common::CurrencyCode;
use thiserror::Error;

/// Why a piece of reference-amount text was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    /// Text is not of the form `digits[.digits]`.
    #[error("Input is not a decimal number")]
    Syntax,

    /// Text looks numeric but does not parse or is out of range.
    #[error("Amount is outside the accepted range")]
    Semantic,
}

/// Failure to obtain a rate table.
///
/// Callers treat every variant the same way; the split exists for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, TLS, or timeout failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The payload was not a valid rate table.
    #[error("Malformed rate table: {0}")]
    Malformed(String),
}

impl FetchError {
    /// One-shot alert text for the presentation layer.
    pub fn alert_message(&self, host: &str) -> String {
        format!("{} is not available.\nCannot connect to the server.", host)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None if e.is_decode() => FetchError::Malformed(e.to_string()),
            None => FetchError::Network(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

/// Errors that can occur in the FX engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// Reference text was rejected.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Rate table could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A configured currency is absent from the fetched table.
    #[error("Currency {0} is missing from the rate table")]
    MissingCurrency(CurrencyCode),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message_names_host() {
        let err = FetchError::Status(503);
        assert_eq!(
            err.alert_message("bank.gov.ua"),
            "bank.gov.ua is not available.\nCannot connect to the server."
        );
    }

    #[test]
    fn test_fx_error_from_parts() {
        let err: FxError = InputError::Syntax.into();
        assert!(matches!(err, FxError::Input(InputError::Syntax)));

        let err: FxError = FetchError::Status(500).into();
        assert_eq!(err.to_string(), "Unexpected HTTP status 500");

        let err = FxError::MissingCurrency(CurrencyCode::jpy());
        assert_eq!(err.to_string(), "Currency JPY is missing from the rate table");
    }
}
