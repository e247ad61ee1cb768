//! Significant-figure rounding and the converted-amount display rule.

use serde::{Serialize, Serializer};
use std::fmt;

/// Rounded magnitudes at or above this switch to scientific notation.
pub const SCIENTIFIC_THRESHOLD: f64 = 1e9;

/// Significant digits kept in scientific notation.
const SCIENTIFIC_DIGITS: usize = 5;

/// Round `value` to `significant_digits` significant figures, keeping at most
/// `max_decimal_digits` digits after the decimal point.
///
/// The rounding position is `significant_digits - floor(log10(|value| / 2)) - 1`.
/// The halving moves the boundary between magnitudes from `10^k` to `2 * 10^k`.
/// Ties round half to even. Zero and non-finite values are returned as is.
pub fn sci_round(value: f64, significant_digits: i32, max_decimal_digits: i32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    if !value.is_finite() {
        return value;
    }

    let magnitude = (value.abs() / 2.0).log10().floor() as i32;
    let places = (significant_digits - magnitude - 1).min(max_decimal_digits);

    round_to_places(value, places)
}

// Both paths round the decimal expansion of the exact binary value, so ties
// are real ties and the result is the double nearest the rounded decimal.
fn round_to_places(value: f64, places: i32) -> f64 {
    if places > 0 {
        let places = places as usize;
        return format!("{:.*}", places, value).parse().unwrap_or(value);
    }

    let digits = decimal_exponent(value) + places + 1;
    if digits < 1 {
        // The rounding position is above the leading digit.
        let scale = 10f64.powi(-places);
        return (value / scale).round_ties_even() * scale;
    }

    format!("{:.*e}", (digits - 1) as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Power of ten of the leading digit, `4` for `27345.9`.
fn decimal_exponent(value: f64) -> i32 {
    let text = format!("{:e}", value);
    text.split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or_else(|| value.abs().log10().floor() as i32)
}

/// A converted amount as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DisplayValue {
    /// No amount, no rate, or a zero rate.
    #[default]
    Empty,
    /// A rounded amount below the scientific threshold.
    Decimal(f64),
    /// A rounded amount at or above the scientific threshold.
    Scientific(f64),
}

impl DisplayValue {
    /// Pick the display form for an already rounded value.
    pub fn from_rounded(rounded: f64) -> Self {
        if rounded.abs() >= SCIENTIFIC_THRESHOLD {
            DisplayValue::Scientific(rounded)
        } else {
            DisplayValue::Decimal(rounded)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DisplayValue::Empty)
    }

    /// The underlying number, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            DisplayValue::Empty => None,
            DisplayValue::Decimal(v) | DisplayValue::Scientific(v) => Some(*v),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Empty => Ok(()),
            DisplayValue::Decimal(v) => write!(f, "{}", v),
            DisplayValue::Scientific(v) => write!(f, "{}", format_scientific(*v)),
        }
    }
}

impl Serialize for DisplayValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `2734590000.0` becomes `2.7346E+09`.
fn format_scientific(value: f64) -> String {
    let raw = format!("{:.*E}", SCIENTIFIC_DIGITS - 1, value);
    match raw.split_once('E') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}E{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => raw,
        },
        None => raw,
    }
}
