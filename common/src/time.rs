//! Timing constants for rate fetching and presentation.

use std::time::Duration;

/// Default timeout for a single rate fetch (30 seconds).
pub fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// How long the exchange date stays highlighted after a refresh (1 second).
pub fn date_highlight_delay() -> Duration {
    Duration::from_millis(1000)
}
