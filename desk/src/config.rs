//! Desk configuration.

use std::time::Duration;

use ratedesk_common::CurrencyCode;
use ratedesk_fx::source::{RateSourceConfig, NBU_ENDPOINT};

/// Main desk configuration.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// URL of the JSON rate feed.
    pub endpoint: String,
    /// Target currencies, in display order.
    pub currencies: Vec<CurrencyCode>,
    /// Timeout for one rate request.
    pub request_timeout: Duration,
    /// How long the exchange date stays highlighted after a refresh.
    pub date_highlight_delay: Duration,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            endpoint: NBU_ENDPOINT.to_string(),
            currencies: CurrencyCode::defaults(),
            request_timeout: ratedesk_common::default_request_timeout(),
            date_highlight_delay: ratedesk_common::date_highlight_delay(),
            log_level: "info".to_string(),
        }
    }
}

impl DeskConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("RATEDESK_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Some(list) = lookup("RATEDESK_CURRENCIES") {
            config.currencies = CurrencyCode::parse_list(&list);
        }

        if let Some(secs) = lookup("RATEDESK_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(ms) = lookup("RATEDESK_HIGHLIGHT_MS") {
            if let Ok(ms) = ms.parse() {
                config.date_highlight_delay = Duration::from_millis(ms);
            }
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("Endpoint cannot be empty".to_string());
        }

        if self.currencies.is_empty() {
            return Err("At least one currency must be configured".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }

    pub fn source_config(&self) -> RateSourceConfig {
        RateSourceConfig {
            endpoint: self.endpoint.clone(),
            timeout: self.request_timeout,
        }
    }
}
