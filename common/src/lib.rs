//! Ratedesk Common Types
//!
//! Shared types used across the ratedesk workspace: currency codes and the
//! timing constants the engine and its front end agree on.

pub mod currency;
pub mod time;

pub use currency::*;
pub use time::*;
