//! Ratedesk FX Engine
//!
//! Converts an amount in the reference currency into a fixed set of target
//! currencies and keeps every converted amount in step with the input.
//!
//! # Features
//!
//! - Rate table fetching from the NBU JSON feed
//! - Significant-figure rounding with a scientific-notation display rule
//! - Input validation with an explicit `Empty` / `Invalid` / `Valid` state
//! - Sequence-numbered refreshes so stale fetches never overwrite newer ones
//!
//! # Example
//!
//! ```rust,ignore
//! use ratedesk_common::CurrencyCode;
//! use ratedesk_fx::{ConversionEngine, NbuRateSource};
//!
//! let source = NbuRateSource::new(Default::default())?;
//! let mut engine = ConversionEngine::new(CurrencyCode::defaults());
//!
//! engine.refresh(&source).await;
//! let amounts = engine.on_reference_text_changed("1000");
//! ```

pub mod engine;
pub mod error;
pub mod input;
pub mod rounding;
pub mod row;
pub mod source;
pub mod table;

pub use engine::{ConversionEngine, RefreshOutcome, RefreshTicket};
pub use error::{FetchError, FxError, FxResult, InputError};
pub use input::{parse_reference_text, InputState, MAX_REFERENCE_AMOUNT};
pub use rounding::{sci_round, DisplayValue, SCIENTIFIC_THRESHOLD};
pub use row::{ConversionRow, RowView};
pub use source::{NbuRateSource, RateSource, RateSourceConfig};
pub use table::{RateEntry, RateTable};

#[cfg(any(test, feature = "test-utils"))]
pub use source::StaticRateSource;
