//! Circuit compilation, key generation and key persistence

use std::fs;
use std::path::Path;
use std::time::Instant;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, SynthesisMode};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::{CircuitSpecificSetupSNARK, SNARK};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rfq_circuit::{BestQuoteCircuit, CircuitShape};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::ProverError;

const PROVING_KEY_FILE: &str = "proving.key";
const VERIFYING_KEY_FILE: &str = "verifying.key";
const SHAPE_FILE: &str = "shape.json";

/// Size report of a circuit compiled for one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledCircuit {
    pub shape: CircuitShape,
    pub constraints: usize,
    /// Public field elements, excluding the constant one
    pub public_inputs: usize,
    pub witnesses: usize,
}

/// Build the constraint system for `shape` without any assignment
pub fn compile(shape: CircuitShape) -> Result<CompiledCircuit, ProverError> {
    let cs = ConstraintSystem::new_ref();
    cs.set_mode(SynthesisMode::Setup);
    BestQuoteCircuit::blank(shape).generate_constraints(cs.clone())?;
    cs.finalize();

    let compiled = CompiledCircuit {
        shape,
        constraints: cs.num_constraints(),
        public_inputs: cs.num_instance_variables() - 1,
        witnesses: cs.num_witness_variables(),
    };
    debug_assert_eq!(compiled.public_inputs, shape.public_input_len());

    info!(
        shape = %shape,
        constraints = compiled.constraints,
        public_inputs = compiled.public_inputs,
        "Compiled best-quote circuit"
    );
    Ok(compiled)
}

/// Groth16 keys for one circuit shape
///
/// Write-once; share behind an `Arc` and read concurrently.
#[derive(Clone)]
pub struct CircuitKeys {
    shape: CircuitShape,
    proving_key: ProvingKey<Bn254>,
    verifying_key: VerifyingKey<Bn254>,
    prepared: PreparedVerifyingKey<Bn254>,
    fingerprint: String,
}

impl std::fmt::Debug for CircuitKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitKeys")
            .field("shape", &self.shape)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Run circuit-specific setup for a compiled shape
pub fn setup<R: RngCore + CryptoRng>(
    compiled: &CompiledCircuit,
    rng: &mut R,
) -> Result<CircuitKeys, ProverError> {
    let started = Instant::now();
    let (proving_key, verifying_key) =
        Groth16::<Bn254>::circuit_specific_setup(BestQuoteCircuit::blank(compiled.shape), rng)?;
    let keys = CircuitKeys::from_parts(compiled.shape, proving_key, verifying_key)?;

    info!(
        shape = %compiled.shape,
        fingerprint = %keys.fingerprint,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generated circuit keys"
    );
    Ok(keys)
}

/// Setup from a fixed seed; reproducible keys for tests and local demos only
pub fn setup_deterministic(compiled: &CompiledCircuit, seed: u64) -> Result<CircuitKeys, ProverError> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    setup(compiled, &mut rng)
}

/// SHA-256 over the compressed verifying key, hex-encoded
pub fn fingerprint(verifying_key: &VerifyingKey<Bn254>) -> Result<String, ProverError> {
    let mut bytes = Vec::with_capacity(verifying_key.compressed_size());
    verifying_key.serialize_compressed(&mut bytes)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

impl CircuitKeys {
    fn from_parts(
        shape: CircuitShape,
        proving_key: ProvingKey<Bn254>,
        verifying_key: VerifyingKey<Bn254>,
    ) -> Result<Self, ProverError> {
        let prepared = Groth16::<Bn254>::process_vk(&verifying_key)?;
        let fingerprint = fingerprint(&verifying_key)?;
        Ok(Self {
            shape,
            proving_key,
            verifying_key,
            prepared,
            fingerprint,
        })
    }

    pub fn shape(&self) -> CircuitShape {
        self.shape
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn proving_key(&self) -> &ProvingKey<Bn254> {
        &self.proving_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.verifying_key
    }

    pub fn prepared_verifying_key(&self) -> &PreparedVerifyingKey<Bn254> {
        &self.prepared
    }

    /// Write the keys and their shape into `dir`, creating it if needed
    pub fn save(&self, dir: &Path) -> Result<(), ProverError> {
        fs::create_dir_all(dir)?;

        let mut bytes = Vec::with_capacity(self.proving_key.compressed_size());
        self.proving_key.serialize_compressed(&mut bytes)?;
        fs::write(dir.join(PROVING_KEY_FILE), &bytes)?;

        bytes.clear();
        self.verifying_key.serialize_compressed(&mut bytes)?;
        fs::write(dir.join(VERIFYING_KEY_FILE), &bytes)?;

        fs::write(dir.join(SHAPE_FILE), serde_json::to_vec_pretty(&self.shape)?)?;

        info!(dir = %dir.display(), fingerprint = %self.fingerprint, "Saved circuit keys");
        Ok(())
    }

    /// Load keys previously written by [`CircuitKeys::save`]
    pub fn load(dir: &Path) -> Result<Self, ProverError> {
        let shape: CircuitShape = serde_json::from_slice(&fs::read(dir.join(SHAPE_FILE))?)?;
        let proving_key =
            ProvingKey::<Bn254>::deserialize_compressed(&fs::read(dir.join(PROVING_KEY_FILE))?[..])?;
        let verifying_key = VerifyingKey::<Bn254>::deserialize_compressed(
            &fs::read(dir.join(VERIFYING_KEY_FILE))?[..],
        )?;

        if proving_key.vk != verifying_key {
            return Err(ProverError::KeyMismatch {
                expected: fingerprint(&verifying_key)?,
                actual: fingerprint(&proving_key.vk)?,
            });
        }

        let keys = Self::from_parts(shape, proving_key, verifying_key)?;
        debug!(dir = %dir.display(), fingerprint = %keys.fingerprint, "Loaded circuit keys");
        Ok(keys)
    }

    /// Whether `dir` holds a complete key set
    pub fn exists(dir: &Path) -> bool {
        [PROVING_KEY_FILE, VERIFYING_KEY_FILE, SHAPE_FILE]
            .iter()
            .all(|file| dir.join(file).is_file())
    }
}
