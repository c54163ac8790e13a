//! Flattened API response types
//!
//! Rounds are returned as `RoundReceipt` directly; these types cover the
//! remaining endpoints and error bodies.

use rfq_models::RoundRejection;
use rfq_prover::{CircuitKeys, CompiledCircuit, ProverError};
use serde::{Deserialize, Serialize};

/// Compiled circuit description for `GET /circuit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCircuitInfo {
    /// Number of competing quotes per round
    pub quotes: usize,
    /// "reverse" (lowest wins) or "forward" (highest wins)
    pub direction: String,
    pub constraints: usize,
    /// Number of public field elements a verifier supplies
    pub public_inputs: usize,
    /// SHA-256 of the verifying key
    pub vk_fingerprint: String,
}

impl ApiCircuitInfo {
    pub fn new(compiled: &CompiledCircuit, keys: &CircuitKeys) -> Self {
        Self {
            quotes: compiled.shape.quotes,
            direction: compiled.shape.direction.to_string(),
            constraints: compiled.constraints,
            public_inputs: compiled.public_inputs,
            vk_fingerprint: keys.fingerprint().to_string(),
        }
    }
}

/// Result of `POST /verify`
///
/// Failed verification carries no detail beyond its code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiVerifyResponse {
    pub valid: bool,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl From<Result<(), ProverError>> for ApiVerifyResponse {
    fn from(result: Result<(), ProverError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                code: None,
                message: None,
            },
            Err(e) => {
                let reason = match e {
                    ProverError::KeyMismatch { .. } | ProverError::ShapeMismatch { .. } => {
                        RoundRejection::Encoding {
                            message: e.to_string(),
                        }
                    }
                    other => other.rejection(),
                };
                Self {
                    valid: false,
                    code: Some(reason.code().to_string()),
                    message: Some(reason.message()),
                }
            }
        }
    }
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl From<&ProverError> for ApiError {
    fn from(e: &ProverError) -> Self {
        let reason = e.rejection();
        Self {
            code: reason.code().to_string(),
            message: reason.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfq_models::EncodingError;

    #[test]
    fn test_verify_response_hides_detail() {
        let response = ApiVerifyResponse::from(Err(ProverError::InvalidProof));
        assert!(!response.valid);
        assert_eq!(response.code.as_deref(), Some("INVALID_PROOF"));
        assert_eq!(response.message.as_deref(), Some("Proof failed verification"));
    }

    #[test]
    fn test_error_body_for_encoding() {
        let err = ProverError::from(EncodingError::InvalidDecimal("9x".into()));
        let body = ApiError::from(&err);
        assert_eq!(body.code, "ENCODING_ERROR");
        assert!(body.message.contains("9x"));
    }
}
