//! Round settlement
//!
//! Runs assign/prove/verify for a submitted round on a blocking thread,
//! bounded by the configured timeout, and turns the result into a receipt.

use anyhow::Context;
use rfq_models::{EncodingPolicy, RoundOutcome, RoundReceipt, RoundRejection};
use rfq_prover::{
    assign_witness, compile, prove, setup, setup_deterministic, verify_artifact, CircuitKeys,
    CircuitShape, CompiledCircuit, ProofArtifact, ProverError, RoundSubmission,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Compiled circuit and keys for one shape, shared by every request
#[derive(Clone)]
pub struct Settlement {
    pub compiled: CompiledCircuit,
    pub keys: Arc<CircuitKeys>,
    pub policy: EncodingPolicy,
    pub timeout: Duration,
}

impl Settlement {
    /// Settle a round
    ///
    /// Ingestion errors (bond or price encoding) are returned as `Err`
    /// without a receipt; everything after ingestion yields a receipt.
    pub async fn settle(
        &self,
        round: RoundSubmission,
    ) -> Result<(RoundReceipt, Option<ProofArtifact>), ProverError> {
        let bond = round.bond.clone();
        let quote_count = round.quotes.len();
        let (public, private) = round.into_inputs(self.policy)?;
        let accepted = public.accepted;

        let compiled = self.compiled;
        let keys = self.keys.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<ProofArtifact, ProverError> {
            let witness = assign_witness(&compiled, public, private)?;
            let artifact = prove(&compiled, &keys, witness, &mut rand::thread_rng())?;
            // Independent check of what was just produced
            verify_artifact(&keys, &artifact)?;
            Ok(artifact)
        });

        let (outcome, artifact) = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(artifact))) => (
                RoundOutcome::Proven {
                    proof: artifact.proof.clone(),
                    vk_fingerprint: artifact.vk_fingerprint.clone(),
                },
                Some(artifact),
            ),
            Ok(Ok(Err(e))) => {
                tracing::warn!("Round rejected: {}", e);
                (RoundOutcome::Rejected { reason: e.rejection() }, None)
            }
            Ok(Err(e)) => {
                tracing::error!("Proving task failed: {}", e);
                let reason = RoundRejection::Internal {
                    message: "proving task failed".to_string(),
                };
                (RoundOutcome::Rejected { reason }, None)
            }
            Err(_) => {
                tracing::error!("Proving timed out after {:?}", self.timeout);
                let reason = RoundRejection::Timeout {
                    seconds: self.timeout.as_secs(),
                };
                (RoundOutcome::Rejected { reason }, None)
            }
        };

        let receipt = RoundReceipt::new(bond, accepted, quote_count, outcome);
        tracing::info!(
            "Round {} for {}: {}",
            receipt.round_id,
            receipt.bond,
            if receipt.is_proven() { "PROVEN" } else { "REJECTED" }
        );
        Ok((receipt, artifact))
    }

    /// Verify an artifact on a blocking thread
    pub async fn verify(&self, artifact: ProofArtifact) -> Result<(), ProverError> {
        let keys = self.keys.clone();
        match tokio::task::spawn_blocking(move || verify_artifact(&keys, &artifact)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Verification task failed: {}", e);
                Err(ProverError::InvalidProof)
            }
        }
    }
}

/// Load keys for `shape` from `key_dir`, or run setup and save them there
pub fn load_or_setup(
    shape: CircuitShape,
    key_dir: &Path,
    seed: Option<u64>,
) -> anyhow::Result<(CompiledCircuit, CircuitKeys)> {
    let compiled = compile(shape)?;

    if CircuitKeys::exists(key_dir) {
        let keys = CircuitKeys::load(key_dir)
            .with_context(|| format!("Failed to load keys from {:?}", key_dir))?;
        if keys.shape() != shape {
            anyhow::bail!(
                "Keys in {:?} are for {}, configured shape is {}",
                key_dir,
                keys.shape(),
                shape
            );
        }
        tracing::info!("Loaded keys {} from {:?}", keys.fingerprint(), key_dir);
        return Ok((compiled, keys));
    }

    tracing::warn!("No keys in {:?}, running setup", key_dir);
    let keys = run_setup(&compiled, seed)?;
    keys.save(key_dir)
        .with_context(|| format!("Failed to save keys to {:?}", key_dir))?;
    Ok((compiled, keys))
}

/// Run setup, deterministically when a seed is given
pub fn run_setup(compiled: &CompiledCircuit, seed: Option<u64>) -> anyhow::Result<CircuitKeys> {
    let keys = match seed {
        Some(seed) => {
            tracing::warn!("Deterministic setup (seed {}); do not use these keys in production", seed);
            setup_deterministic(compiled, seed)?
        }
        None => setup(compiled, &mut rand::rngs::OsRng)?,
    };
    Ok(keys)
}
