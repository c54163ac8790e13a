//! Quote value models for the RFQ system

use serde::{Deserialize, Serialize};

/// A quote expressed as an integer number of cents of the bond's notional
///
/// This is the "quote value" that counterparties sign and the circuit
/// compares. All quotes of a round must be encoded against the same bond
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteValue(i64);

impl QuoteValue {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for QuoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Which side of the book wins a round
///
/// This is fixed per compiled circuit, never chosen per round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionDirection {
    /// Reverse auction: the lowest quote wins (the initiator is buying)
    #[default]
    Reverse,
    /// Forward auction: the highest quote wins (the initiator is selling)
    Forward,
}

impl AuctionDirection {
    /// Whether `candidate` is at least as good as `other` under this direction
    pub fn at_least_as_good(self, candidate: QuoteValue, other: QuoteValue) -> bool {
        match self {
            Self::Reverse => candidate <= other,
            Self::Forward => candidate >= other,
        }
    }
}

impl std::fmt::Display for AuctionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reverse => f.write_str("reverse"),
            Self::Forward => f.write_str("forward"),
        }
    }
}

/// Select the winning value of a round off-circuit
///
/// Ties are not broken: only the value is returned.
pub fn best_quote(values: &[QuoteValue], direction: AuctionDirection) -> Option<QuoteValue> {
    match direction {
        AuctionDirection::Reverse => values.iter().copied().min(),
        AuctionDirection::Forward => values.iter().copied().max(),
    }
}
