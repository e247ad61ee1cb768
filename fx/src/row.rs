//! One target currency's rate and converted amount.

use ratedesk_common::CurrencyCode;
use serde::Serialize;
use tracing::debug;

use crate::rounding::{sci_round, DisplayValue};

/// Significant figures kept in a converted amount.
const SIGNIFICANT_DIGITS: i32 = 6;
/// Decimal places a converted amount may carry.
const MAX_DECIMAL_DIGITS: i32 = 5;

/// A row of the conversion table.
#[derive(Debug, Clone)]
pub struct ConversionRow {
    code: CurrencyCode,
    rate: Option<f64>,
    converted: DisplayValue,
}

/// Snapshot of a row for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub code: CurrencyCode,
    pub rate: Option<String>,
    pub converted: String,
}

impl ConversionRow {
    /// Create a row with no rate yet.
    pub fn new(code: CurrencyCode) -> Self {
        Self {
            code,
            rate: None,
            converted: DisplayValue::Empty,
        }
    }

    pub fn code(&self) -> &CurrencyCode {
        &self.code
    }

    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    /// Last value produced by [`set_reference_amount`](Self::set_reference_amount).
    pub fn converted(&self) -> DisplayValue {
        self.converted
    }

    /// Store a new rate. `None` clears it.
    ///
    /// The converted amount is left alone until the next broadcast.
    pub fn set_rate(&mut self, rate: Option<f64>) {
        self.rate = rate;
    }

    /// Recompute the converted amount for a reference amount.
    pub fn set_reference_amount(&mut self, amount: Option<f64>) -> DisplayValue {
        self.converted = match (amount, self.rate) {
            (Some(amount), Some(rate)) if rate != 0.0 => {
                let rounded = sci_round(amount / rate, SIGNIFICANT_DIGITS, MAX_DECIMAL_DIGITS);
                DisplayValue::from_rounded(rounded)
            }
            _ => DisplayValue::Empty,
        };

        debug!(code = %self.code, converted = %self.converted, "Row recomputed");
        self.converted
    }

    /// Rate as fetched, for display.
    pub fn rate_display(&self) -> Option<String> {
        self.rate.map(|r| r.to_string())
    }

    pub fn view(&self) -> RowView {
        RowView {
            code: self.code.clone(),
            rate: self.rate_display(),
            converted: self.converted.to_string(),
        }
    }
}
