//! Best-quote settlement circuit
//!
//! This crate expresses the RFQ settlement rule as R1CS constraints over the
//! BN254 scalar field. Given N privately held quotes, each signed by its
//! counterparty over a hash binding it to the traded bond, the circuit proves
//! that the publicly disclosed accepted value:
//!
//! 1. is at least as good as every submitted quote (ties allowed),
//! 2. equals one of the submitted quotes,
//! 3. is vouched for by the key of a counterparty that quoted it.
//!
//! Every path is evaluated unconditionally; selection logic is written as
//! inequality assertions plus an OR over zero tests.

mod binding;
mod circuit;
mod codec;
mod field;
mod gadgets;
mod poseidon;
mod signature;

pub use binding::{bind_quote, bind_quote_var, bond_hash, BondHash};
pub use circuit::{BestQuoteCircuit, CircuitShape, PrivateInputs, PublicInputs, QuoteWitness};
pub use codec::{from_hex, to_hex};
pub use field::{quote_to_field, QUOTE_VALUE_BITS};
pub use gadgets::{and_all, enforce_best_quote, enforce_bit_length, enforce_le, is_zero_var, or_all};
pub use poseidon::{poseidon_config, poseidon_hash, poseidon_hash_var};
pub use signature::{alloc_point, verify_signature_var, PublicKey, Signature, SignatureVar, SigningKey};

/// The circuit field (BN254 scalar field)
pub use ark_bn254::Fr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("circuit needs at least one quote")]
    EmptyShape,
    #[error("expected {expected} quotes, got {actual}")]
    QuoteCount { expected: usize, actual: usize },
    #[error("expected {expected} public keys, got {actual}")]
    KeyCount { expected: usize, actual: usize },
    #[error("winner slot {index} out of range for {quotes} quotes")]
    WinnerOutOfRange { index: usize, quotes: usize },
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid encoding: {0}")]
    Serialization(#[from] ark_serialize::SerializationError),
}
