//! Reference-amount text validation.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::InputError;

/// Exclusive upper bound for a reference amount.
pub const MAX_REFERENCE_AMOUNT: f64 = 1e80;

const AMOUNT_PATTERN: &str = r"^\s*[0-9]*\.?[0-9]*\s*$";

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(AMOUNT_PATTERN).expect("amount pattern is valid"))
}

/// State of the reference-amount field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// Blank or whitespace-only text.
    #[default]
    Empty,
    /// Text was rejected.
    Invalid(InputError),
    /// A usable amount in `[0, 1e80)`.
    Valid(f64),
}

impl InputState {
    /// Classify a piece of raw text.
    pub fn from_text(text: &str) -> Self {
        match parse_reference_text(text) {
            Ok(Some(amount)) => InputState::Valid(amount),
            Ok(None) => InputState::Empty,
            Err(e) => InputState::Invalid(e),
        }
    }

    /// The amount used for conversion; `None` unless the state is `Valid`.
    pub fn effective_amount(&self) -> Option<f64> {
        match self {
            InputState::Valid(amount) => Some(*amount),
            _ => None,
        }
    }

    /// Whether the field should be flagged as acceptable.
    pub fn is_valid(&self) -> bool {
        !matches!(self, InputState::Invalid(_))
    }
}

/// Parse reference-amount text.
///
/// Returns `Ok(None)` for blank text and `Ok(Some(amount))` for a number in
/// `[0, 1e80)`.
pub fn parse_reference_text(text: &str) -> Result<Option<f64>, InputError> {
    if !amount_pattern().is_match(text) {
        return Err(InputError::Syntax);
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let amount: f64 = trimmed.parse().map_err(|_| InputError::Semantic)?;
    if !(0.0..MAX_REFERENCE_AMOUNT).contains(&amount) {
        return Err(InputError::Semantic);
    }

    Ok(Some(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_amounts() {
        assert_eq!(parse_reference_text("1000"), Ok(Some(1000.0)));
        assert_eq!(parse_reference_text("  12.5 "), Ok(Some(12.5)));
        assert_eq!(parse_reference_text("12."), Ok(Some(12.0)));
        assert_eq!(parse_reference_text(".5"), Ok(Some(0.5)));
        assert_eq!(parse_reference_text("0"), Ok(Some(0.0)));
        assert_eq!(parse_reference_text("\t7\n"), Ok(Some(7.0)));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_reference_text(""), Ok(None));
        assert_eq!(parse_reference_text("   "), Ok(None));
        assert_eq!(InputState::from_text(" "), InputState::Empty);
    }

    #[test]
    fn test_syntax_invalid() {
        for text in ["abc", "-5", "1,5", "1.2.3", "1e5", "+1", "1 2", "١٢"] {
            assert_eq!(
                parse_reference_text(text),
                Err(InputError::Syntax),
                "{text:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn test_semantic_invalid() {
        assert_eq!(parse_reference_text("."), Err(InputError::Semantic));
        assert_eq!(parse_reference_text(" . "), Err(InputError::Semantic));

        let too_big = format!("1{}", "0".repeat(80));
        assert_eq!(parse_reference_text(&too_big), Err(InputError::Semantic));

        let overflow = "9".repeat(400);
        assert_eq!(parse_reference_text(&overflow), Err(InputError::Semantic));
    }

    #[test]
    fn test_upper_bound_is_exclusive() {
        let just_below = format!("9{}", "9".repeat(78));
        assert!(parse_reference_text(&just_below).unwrap().is_some());
    }

    #[test]
    fn test_state_helpers() {
        let valid = InputState::from_text("42");
        assert_eq!(valid, InputState::Valid(42.0));
        assert_eq!(valid.effective_amount(), Some(42.0));
        assert!(valid.is_valid());

        let syntax = InputState::from_text("x");
        assert_eq!(syntax, InputState::Invalid(InputError::Syntax));
        assert_eq!(syntax.effective_amount(), None);
        assert!(!syntax.is_valid());

        let semantic = InputState::from_text(".");
        assert!(!semantic.is_valid());
        assert_eq!(semantic.effective_amount(), None);

        assert!(InputState::Empty.is_valid());
        assert_eq!(InputState::Empty.effective_amount(), None);
    }
}
