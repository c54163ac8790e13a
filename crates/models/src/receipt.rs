//! Receipt models for settled RFQ rounds
//!
//! A receipt records what the settlement service was asked to prove and
//! what happened: the bond, the disclosed accepted value, the circuit it
//! was proven against, and either the proof or the reason it was refused.
//! Losing quotes never appear in a receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BondDescriptor, QuoteValue};

/// Unique identifier for a round submitted to the settlement service
pub type RoundId = Uuid;

/// Outcome of a proving request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// A proof was produced and checked against the verification key
    Proven {
        /// Hex-encoded compressed proof
        proof: String,
        /// SHA-256 fingerprint of the verification key used
        vk_fingerprint: String,
    },
    /// No proof was produced
    Rejected { reason: RoundRejection },
}

/// Reason for refusing to prove a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RoundRejection {
    /// A quote or bond failed encoding/validation at ingestion
    Encoding { message: String },
    /// The round does not fit the compiled circuit shape
    StructuralMismatch { expected: usize, actual: usize },
    /// The witness violates signature, binding or winner constraints
    UnsatisfiedConstraint,
    /// The proof did not verify after proving
    InvalidProof,
    /// Proving did not finish in time
    Timeout { seconds: u64 },
    /// Backend failure unrelated to the round's data
    Internal { message: String },
}

impl RoundRejection {
    /// Get a human-readable message for this rejection
    pub fn message(&self) -> String {
        match self {
            Self::Encoding { message } => format!("Invalid round data: {}", message),
            Self::StructuralMismatch { expected, actual } => format!(
                "Circuit is compiled for {} quotes, round supplied {}",
                expected, actual
            ),
            Self::UnsatisfiedConstraint => {
                "Round violates the best-quote constraints".to_string()
            }
            Self::InvalidProof => "Proof failed verification".to_string(),
            Self::Timeout { seconds } => format!("Proving timed out after {}s", seconds),
            Self::Internal { message } => message.clone(),
        }
    }

    /// Get a machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Encoding { .. } => "ENCODING_ERROR",
            Self::StructuralMismatch { .. } => "STRUCTURAL_MISMATCH",
            Self::UnsatisfiedConstraint => "UNSATISFIED_CONSTRAINT",
            Self::InvalidProof => "INVALID_PROOF",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}

/// A receipt for a proving request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReceipt {
    pub round_id: RoundId,
    pub bond: BondDescriptor,
    /// The disclosed accepted quote value
    pub accepted: QuoteValue,
    /// Number of competing quotes in the round
    pub quote_count: usize,
    pub outcome: RoundOutcome,
    pub generated_at: DateTime<Utc>,
}

impl RoundReceipt {
    pub fn new(
        bond: BondDescriptor,
        accepted: QuoteValue,
        quote_count: usize,
        outcome: RoundOutcome,
    ) -> Self {
        Self {
            round_id: Uuid::new_v4(),
            bond,
            accepted,
            quote_count,
            outcome,
            generated_at: Utc::now(),
        }
    }

    pub fn is_proven(&self) -> bool {
        matches!(self.outcome, RoundOutcome::Proven { .. })
    }

    pub fn rejection(&self) -> Option<&RoundRejection> {
        match &self.outcome {
            RoundOutcome::Rejected { reason } => Some(reason),
            _ => None,
        }
    }
}
