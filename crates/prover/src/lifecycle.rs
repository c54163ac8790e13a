//! Witness assignment, proving and verification

use std::time::Instant;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, Proof};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_snark::SNARK;
use rand::{CryptoRng, RngCore};
use rfq_circuit::{from_hex, to_hex, BestQuoteCircuit, CircuitShape, PrivateInputs, PublicInputs};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::keys::{CircuitKeys, CompiledCircuit};
use crate::ProverError;

/// A complete assignment for one round, checked against the compiled shape
#[derive(Debug, Clone)]
pub struct Witness {
    circuit: BestQuoteCircuit,
    public: PublicInputs,
}

impl Witness {
    pub fn shape(&self) -> CircuitShape {
        self.circuit.shape()
    }

    pub fn public_inputs(&self) -> &PublicInputs {
        &self.public
    }
}

/// A proof with the public inputs it was produced for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    pub shape: CircuitShape,
    /// Hex-encoded compressed Groth16 proof
    pub proof: String,
    pub public_inputs: PublicInputs,
    /// Fingerprint of the verifying key the proof targets
    pub vk_fingerprint: String,
}

impl ProofArtifact {
    pub fn decode_proof(&self) -> Result<Proof<Bn254>, ProverError> {
        Ok(from_hex(&self.proof)?)
    }
}

/// Map protocol inputs onto the compiled input layout
pub fn assign_witness(
    compiled: &CompiledCircuit,
    public: PublicInputs,
    private: PrivateInputs,
) -> Result<Witness, ProverError> {
    let circuit = BestQuoteCircuit::new(compiled.shape, public.clone(), private)?;
    Ok(Witness { circuit, public })
}

fn ensure_shape(expected: CircuitShape, actual: CircuitShape) -> Result<(), ProverError> {
    if expected != actual {
        return Err(ProverError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Prove a round
///
/// The witness is synthesized and checked first; an unsatisfiable witness
/// fails with [`ProverError::UnsatisfiedConstraint`] and no proof is made.
pub fn prove<R: RngCore + CryptoRng>(
    compiled: &CompiledCircuit,
    keys: &CircuitKeys,
    witness: Witness,
    rng: &mut R,
) -> Result<ProofArtifact, ProverError> {
    ensure_shape(keys.shape(), compiled.shape)?;
    ensure_shape(keys.shape(), witness.shape())?;

    let cs = ConstraintSystem::new_ref();
    witness.circuit.clone().generate_constraints(cs.clone())?;
    if !cs.is_satisfied()? {
        // logged for operators only; callers get no detail
        let unsatisfied = cs.which_is_unsatisfied()?;
        warn!(
            constraint = unsatisfied.as_deref().unwrap_or("unknown"),
            "Round witness is unsatisfiable"
        );
        return Err(ProverError::UnsatisfiedConstraint);
    }

    let started = Instant::now();
    let proof = Groth16::<Bn254>::prove(keys.proving_key(), witness.circuit, rng)?;
    let artifact = ProofArtifact {
        shape: keys.shape(),
        proof: to_hex(&proof)?,
        public_inputs: witness.public,
        vk_fingerprint: keys.fingerprint().to_string(),
    };

    info!(
        shape = %artifact.shape,
        accepted = %artifact.public_inputs.accepted,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generated best-quote proof"
    );
    Ok(artifact)
}

/// Check a proof against the verifying key and public inputs
pub fn verify(
    keys: &CircuitKeys,
    proof: &Proof<Bn254>,
    public: &PublicInputs,
) -> Result<(), ProverError> {
    let shape = keys.shape();
    if public.public_keys.len() != shape.quotes {
        return Err(ProverError::StructuralMismatch {
            expected: shape.quotes,
            actual: public.public_keys.len(),
        });
    }

    let inputs = public.to_field_elements();
    match Groth16::<Bn254>::verify_with_processed_vk(keys.prepared_verifying_key(), &inputs, proof) {
        Ok(true) => {
            debug!(accepted = %public.accepted, "Proof verified");
            Ok(())
        }
        Ok(false) => Err(ProverError::InvalidProof),
        Err(err) => {
            debug!(error = %err, "Proof verification errored");
            Err(ProverError::InvalidProof)
        }
    }
}

/// Verify a serialized artifact, including which key it was made for
pub fn verify_artifact(keys: &CircuitKeys, artifact: &ProofArtifact) -> Result<(), ProverError> {
    if artifact.vk_fingerprint != keys.fingerprint() {
        return Err(ProverError::KeyMismatch {
            expected: keys.fingerprint().to_string(),
            actual: artifact.vk_fingerprint.clone(),
        });
    }
    ensure_shape(keys.shape(), artifact.shape)?;
    verify(keys, &artifact.decode_proof()?, &artifact.public_inputs)
}
