//! Quote encoding
//!
//! Converts a percentage-of-par decimal price into an integer number of cents
//! of the bond's notional:
//!
//! ```text
//! cents = round(price / 100 * size * 100)
//! ```
//!
//! so 92.63 on a 550000 bond becomes 509465.00 in cash, i.e. 50946500 cents.
//! Rounding is half-up (away from zero) to the nearest cent. The arithmetic
//! is exact in integers for any number of fraction digits and never passes
//! through a float.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::QuoteValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("invalid decimal price: {0:?}")]
    InvalidDecimal(String),
    #[error("negative price {0} rejected (negative quotes are disabled)")]
    NegativePrice(String),
    #[error("bond size must be positive")]
    ZeroSize,
    #[error("encoded quote for price {0} does not fit in 64 bits")]
    OutOfRange(String),
}

/// Options applied at the encoding boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingPolicy {
    /// Accept negative decimal prices
    ///
    /// The circuit compares values through an order-preserving embedding,
    /// so negative quotes are supported end to end when this is set.
    #[serde(default)]
    pub allow_negative: bool,
}

impl EncodingPolicy {
    pub const fn signed() -> Self {
        Self {
            allow_negative: true,
        }
    }
}

/// Encode a decimal price for a bond of `bond_size` notional
pub fn encode_quote(
    price: &str,
    bond_size: u64,
    policy: EncodingPolicy,
) -> Result<QuoteValue, EncodingError> {
    let trimmed = price.trim();
    let decimal = ParsedDecimal::parse(trimmed)
        .ok_or_else(|| EncodingError::InvalidDecimal(price.to_string()))?;

    if decimal.negative && !policy.allow_negative {
        return Err(EncodingError::NegativePrice(trimmed.to_string()));
    }
    if bond_size == 0 {
        return Err(EncodingError::ZeroSize);
    }

    let magnitude = decimal
        .scaled_cents(bond_size)
        .and_then(|cents| i64::try_from(cents).ok())
        .ok_or_else(|| EncodingError::OutOfRange(trimmed.to_string()))?;
    Ok(QuoteValue::from_cents(if decimal.negative {
        -magnitude
    } else {
        magnitude
    }))
}

/// A plain decimal literal: optional sign, digits, optional fraction
#[derive(Debug, PartialEq, Eq)]
struct ParsedDecimal<'a> {
    negative: bool,
    /// Integer digits without leading zeros
    whole: &'a str,
    /// Fraction digits without trailing zeros
    fraction: &'a str,
}

impl<'a> ParsedDecimal<'a> {
    fn parse(s: &'a str) -> Option<Self> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole = whole.trim_start_matches('0');
        let fraction = fraction.trim_end_matches('0');
        Some(Self {
            negative: negative && !(whole.is_empty() && fraction.is_empty()),
            whole,
            fraction,
        })
    }

    /// `|price| / 100 * size * 100`, rounded half-up; `None` past 128 bits
    ///
    /// The fraction is multiplied by `size` digit by digit from the right,
    /// which is exact for any number of fraction digits: the carry left over
    /// is the integer part of `fraction * size` and the last digit produced
    /// is the first digit of its fractional part.
    fn scaled_cents(&self, size: u64) -> Option<u128> {
        let size = u128::from(size);

        let mut whole: u128 = 0;
        for b in self.whole.bytes() {
            whole = whole.checked_mul(10)?.checked_add(u128::from(b - b'0'))?;
        }

        let mut carry: u128 = 0;
        let mut first_digit = 0;
        for b in self.fraction.bytes().rev() {
            let product = u128::from(b - b'0') * size + carry;
            first_digit = product % 10;
            carry = product / 10;
        }

        whole
            .checked_mul(size)?
            .checked_add(carry)?
            .checked_add(u128::from(first_digit >= 5))
    }
}
