//! Proof lifecycle errors

use ark_relations::r1cs::SynthesisError;
use ark_serialize::SerializationError;
use rfq_circuit::{CircuitError, CircuitShape};
use rfq_models::{BondError, EncodingError, RoundRejection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("invalid bond: {0}")]
    Bond(#[from] BondError),

    #[error("circuit expects {expected} quotes, round supplied {actual}")]
    StructuralMismatch { expected: usize, actual: usize },

    #[error("winner slot {index} out of range for {quotes} quotes")]
    WinnerOutOfRange { index: usize, quotes: usize },

    #[error("circuit shape {actual} does not match keys for {expected}")]
    ShapeMismatch {
        expected: CircuitShape,
        actual: CircuitShape,
    },

    #[error("witness does not satisfy the best-quote constraints")]
    UnsatisfiedConstraint,

    #[error("proof failed verification")]
    InvalidProof,

    #[error("verification key {actual} does not match {expected}")]
    KeyMismatch { expected: String, actual: String },

    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("malformed proof artifact: {0}")]
    Artifact(CircuitError),

    #[error("key serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    #[error("key file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("shape file error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CircuitError> for ProverError {
    fn from(err: CircuitError) -> Self {
        match err {
            CircuitError::KeyCount { expected, actual }
            | CircuitError::QuoteCount { expected, actual } => {
                Self::StructuralMismatch { expected, actual }
            }
            CircuitError::WinnerOutOfRange { index, quotes } => {
                Self::WinnerOutOfRange { index, quotes }
            }
            other => Self::Artifact(other),
        }
    }
}

impl ProverError {
    /// Whether the caller's data is at fault, as opposed to the backend
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Encoding(_)
                | Self::Bond(_)
                | Self::StructuralMismatch { .. }
                | Self::WinnerOutOfRange { .. }
                | Self::UnsatisfiedConstraint
                | Self::InvalidProof
                | Self::Artifact(_)
        )
    }

    /// The receipt-level reason for this error
    pub fn rejection(&self) -> RoundRejection {
        match self {
            Self::Encoding(_) | Self::Bond(_) | Self::WinnerOutOfRange { .. } | Self::Artifact(_) => {
                RoundRejection::Encoding {
                    message: self.to_string(),
                }
            }
            Self::StructuralMismatch { expected, actual } => RoundRejection::StructuralMismatch {
                expected: *expected,
                actual: *actual,
            },
            Self::UnsatisfiedConstraint => RoundRejection::UnsatisfiedConstraint,
            Self::InvalidProof => RoundRejection::InvalidProof,
            _ => RoundRejection::Internal {
                message: self.to_string(),
            },
        }
    }
}
