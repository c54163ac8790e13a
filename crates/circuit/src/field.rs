//! Field embedding of quote values
//!
//! Values are embedded offset-binary: `cents + 2^63` as a `u64`. The map is
//! order-preserving over all of `i64`, so one 64-bit range-checked
//! comparison covers both signed and unsigned encoding policies.

use rfq_models::QuoteValue;

use crate::Fr;

/// Bit width every embedded quote value is range-checked to
pub const QUOTE_VALUE_BITS: usize = 64;

const SIGN_OFFSET: u64 = 1 << 63;

pub(crate) fn embed(value: QuoteValue) -> u64 {
    (value.cents() as u64) ^ SIGN_OFFSET
}

pub fn quote_to_field(value: QuoteValue) -> Fr {
    Fr::from(embed(value))
}
