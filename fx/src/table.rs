//! Rate table parsed from the remote feed.

use chrono::{DateTime, Utc};
use ratedesk_common::CurrencyCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FetchError, FxError, FxResult};

/// One currency's rate against the reference currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateEntry {
    /// Currency code.
    pub code: CurrencyCode,
    /// Units of reference currency per one unit of `code`.
    pub rate: f64,
}

/// Element of the NBU JSON array. Other fields (`r030`, `txt`) are ignored.
#[derive(Debug, Deserialize)]
struct WireEntry {
    cc: String,
    rate: f64,
    exchangedate: String,
}

/// A complete rate table from one successful fetch.
#[derive(Debug, Clone)]
pub struct RateTable {
    entries: Vec<RateEntry>,
    index: HashMap<CurrencyCode, usize>,
    exchange_date: String,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Build a table, checking that codes are unique and rates usable.
    pub fn new(
        entries: Vec<RateEntry>,
        exchange_date: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if !entry.rate.is_finite() || entry.rate < 0.0 {
                return Err(FetchError::Malformed(format!(
                    "rate {} for {} is not a non-negative number",
                    entry.rate, entry.code
                )));
            }
            if index.insert(entry.code.clone(), i).is_some() {
                return Err(FetchError::Malformed(format!(
                    "duplicate currency {}",
                    entry.code
                )));
            }
        }

        Ok(Self {
            entries,
            index,
            exchange_date: exchange_date.into(),
            fetched_at: Utc::now(),
        })
    }

    /// Parse the NBU JSON payload.
    ///
    /// The array must be non-empty and every element must share one
    /// `exchangedate`.
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        let wire: Vec<WireEntry> = serde_json::from_slice(body)?;

        let exchange_date = match wire.first() {
            Some(first) => first.exchangedate.clone(),
            None => return Err(FetchError::Malformed("empty rate table".to_string())),
        };

        if let Some(odd) = wire.iter().find(|w| w.exchangedate != exchange_date) {
            return Err(FetchError::Malformed(format!(
                "mixed exchange dates {} and {}",
                exchange_date, odd.exchangedate
            )));
        }

        let entries = wire
            .into_iter()
            .map(|w| RateEntry {
                code: CurrencyCode::new(w.cc),
                rate: w.rate,
            })
            .collect();

        Self::new(entries, exchange_date)
    }

    /// Rate for a currency code.
    pub fn rate_for(&self, code: &CurrencyCode) -> FxResult<f64> {
        self.index
            .get(code)
            .map(|&i| self.entries[i].rate)
            .ok_or_else(|| FxError::MissingCurrency(code.clone()))
    }

    /// Entries in feed order.
    pub fn entries(&self) -> &[RateEntry] {
        &self.entries
    }

    /// Exchange date shared by every entry, as sent by the feed.
    pub fn exchange_date(&self) -> &str {
        &self.exchange_date
    }

    /// When this table was built.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
