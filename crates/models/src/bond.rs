//! Bond descriptor models

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a bond descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BondError {
    #[error("bond ISIN must not be empty")]
    EmptyIsin,
    #[error("bond ticker must not be empty")]
    EmptyTicker,
    #[error("bond size must be positive")]
    ZeroSize,
}

/// The immutable description of the bond an RFQ round trades
///
/// Every quote in a round is bound to the hash of this descriptor, so the
/// fields must not change once the round has started.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BondDescriptor {
    /// ISIN code (e.g., "CA29250NAT24")
    pub isin: String,
    /// Ticker as quoted by the desk (e.g., "ENB 5.375 27-Sep-2077")
    pub ticker: String,
    /// Nominal size of the trade
    pub size: u64,
}

impl BondDescriptor {
    /// Create a validated descriptor
    pub fn new(
        isin: impl Into<String>,
        ticker: impl Into<String>,
        size: u64,
    ) -> Result<Self, BondError> {
        let descriptor = Self {
            isin: isin.into(),
            ticker: ticker.into(),
            size,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the descriptor invariants
    ///
    /// Descriptors deserialized from the wire bypass `new`, so the service
    /// calls this again at ingestion.
    pub fn validate(&self) -> Result<(), BondError> {
        if self.isin.trim().is_empty() {
            return Err(BondError::EmptyIsin);
        }
        if self.ticker.trim().is_empty() {
            return Err(BondError::EmptyTicker);
        }
        if self.size == 0 {
            return Err(BondError::ZeroSize);
        }
        Ok(())
    }
}

impl std::fmt::Display for BondDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) x {}", self.isin, self.ticker, self.size)
    }
}
