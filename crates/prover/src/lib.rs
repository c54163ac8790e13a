//! Proof lifecycle for the best-quote circuit
//!
//! Four operations, all synchronous and CPU-bound:
//!
//! - [`compile`]: build the constraint system for a [`CircuitShape`] once
//! - [`setup`]: Groth16 keys for that shape, reused across rounds
//! - [`assign_witness`] + [`prove`]: one proof per round, failing fast on an
//!   unsatisfiable witness
//! - [`verify`]: check a proof against the disclosed public inputs
//!
//! Callers that need timeouts or concurrency wrap these calls themselves;
//! [`CircuitKeys`] is immutable and safe to share.

mod error;
mod keys;
mod lifecycle;
mod submission;

pub use error::ProverError;
pub use keys::{compile, fingerprint, setup, setup_deterministic, CircuitKeys, CompiledCircuit};
pub use lifecycle::{assign_witness, prove, verify, verify_artifact, ProofArtifact, Witness};
pub use submission::{QuoteSubmission, RoundSubmission};

pub use ark_bn254::Bn254;
pub use ark_groth16::Proof;
pub use rfq_circuit::CircuitShape;
