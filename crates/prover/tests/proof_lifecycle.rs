//! Integration tests for the proof lifecycle
//!
//! These tests verify that:
//! 1. Honest rounds (including ties) prove and verify
//! 2. Rounds violating the best-quote rule fail before proving
//! 3. Proofs do not verify against altered public inputs
//! 4. Keys survive a save/load cycle
//!
//! Groth16 setup is shared through a single fixture.

use std::sync::OnceLock;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rfq_circuit::{
    bind_quote, bond_hash, PrivateInputs, PublicInputs, QuoteWitness, SigningKey,
};
use rfq_models::{encode_quote, AuctionDirection, BondDescriptor, EncodingPolicy, QuoteValue};
use rfq_prover::{
    assign_witness, compile, prove, setup_deterministic, verify, verify_artifact, CircuitKeys,
    CircuitShape, CompiledCircuit, ProofArtifact, ProverError,
};

fn fixture() -> &'static (CompiledCircuit, CircuitKeys) {
    static FIXTURE: OnceLock<(CompiledCircuit, CircuitKeys)> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let shape = CircuitShape::new(3, AuctionDirection::Reverse).unwrap();
        let compiled = compile(shape).unwrap();
        let keys = setup_deterministic(&compiled, 42).unwrap();
        (compiled, keys)
    })
}

fn enbridge() -> BondDescriptor {
    BondDescriptor::new("CA29250NAT24", "ENB 5.375 27-Sep-2077", 550_000).unwrap()
}

fn encode(price: &str) -> QuoteValue {
    encode_quote(price, 550_000, EncodingPolicy::default()).unwrap()
}

/// Honest signing of every slot for `bond`; the winner slot also signs the
/// accepted value
fn round(prices: &[&str], accepted: &str, winner: usize) -> (PublicInputs, PrivateInputs) {
    let signers: Vec<_> = (0..prices.len())
        .map(|i| SigningKey::from_seed([10 + i as u8; 32]))
        .collect();
    let bond = bond_hash(&enbridge());
    let accepted = encode(accepted);

    let quotes = prices
        .iter()
        .zip(&signers)
        .map(|(price, signer)| {
            let value = encode(price);
            QuoteWitness {
                value,
                signature: signer.sign(bind_quote(bond, value)),
            }
        })
        .collect();

    let public = PublicInputs {
        accepted,
        bond_hash: bond,
        public_keys: signers.iter().map(SigningKey::public_key).collect(),
        accepted_signature: signers[winner].sign(bind_quote(bond, accepted)),
    };
    (public, PrivateInputs { quotes, winner })
}

fn prove_round(prices: &[&str], accepted: &str, winner: usize) -> Result<ProofArtifact, ProverError> {
    let (compiled, keys) = fixture();
    let (public, private) = round(prices, accepted, winner);
    let witness = assign_witness(compiled, public, private)?;
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    prove(compiled, keys, witness, &mut rng)
}

/// The tied-minimum scenario proves and verifies
#[test]
fn test_tied_minimum_proves_and_verifies() {
    let (_, keys) = fixture();
    let artifact = prove_round(&["92.63", "92.63", "95.00"], "92.63", 1).unwrap();

    assert_eq!(artifact.public_inputs.accepted, QuoteValue::from_cents(50_946_500));
    assert_eq!(artifact.vk_fingerprint, keys.fingerprint());
    verify_artifact(keys, &artifact).expect("honest proof should verify");

    let json = serde_json::to_string(&artifact).unwrap();
    let decoded: ProofArtifact = serde_json::from_str(&json).unwrap();
    verify_artifact(keys, &decoded).expect("artifact should survive JSON");
}

/// Disclosing a value that is not the minimum fails before Groth16 runs
#[test]
fn test_not_minimum_is_unsatisfied() {
    let result = prove_round(&["97.63", "94.63", "95.63"], "95.63", 2);
    assert!(
        matches!(result, Err(ProverError::UnsatisfiedConstraint)),
        "Expected UnsatisfiedConstraint, got {:?}",
        result
    );
}

/// A value below every quote that nobody quoted is rejected
#[test]
fn test_invented_value_is_unsatisfied() {
    let result = prove_round(&["97.63", "94.63", "95.63"], "90.00", 1);
    assert!(matches!(result, Err(ProverError::UnsatisfiedConstraint)));
}

/// A proof for 92.63 does not verify when 93.40 is claimed
#[test]
fn test_altered_accepted_value_fails_verification() {
    let (_, keys) = fixture();
    let artifact = prove_round(&["92.63", "93.40", "94.00"], "92.63", 0).unwrap();
    let proof = artifact.decode_proof().unwrap();

    verify(keys, &proof, &artifact.public_inputs).expect("untampered inputs should verify");

    let mut public = artifact.public_inputs.clone();
    public.accepted = encode("93.40");
    let result = verify(keys, &proof, &public);
    assert!(matches!(result, Err(ProverError::InvalidProof)));
}

/// Flipping any single bit of the accepted value breaks verification
#[test]
fn test_any_bit_flip_of_accepted_value_fails_verification() {
    let (_, keys) = fixture();
    let artifact = prove_round(&["92.63", "93.40", "94.00"], "92.63", 0).unwrap();
    let proof = artifact.decode_proof().unwrap();
    let cents = artifact.public_inputs.accepted.cents();

    verify(keys, &proof, &artifact.public_inputs).expect("untampered inputs should verify");

    for bit in 0..64 {
        let mut public = artifact.public_inputs.clone();
        public.accepted = QuoteValue::from_cents(cents ^ (1i64 << bit));
        let result = verify(keys, &proof, &public);
        assert!(
            matches!(result, Err(ProverError::InvalidProof)),
            "bit {} flipped still verified: {:?}",
            bit,
            result
        );
    }
}

/// A proof made for one bond does not verify against another bond's hash
#[test]
fn test_cross_bond_replay_fails_verification() {
    let (_, keys) = fixture();
    let artifact = prove_round(&["92.63", "93.40", "95.00"], "92.63", 0).unwrap();

    let mut other = enbridge();
    other.isin = "US0000000000".into();
    let mut public = artifact.public_inputs.clone();
    public.bond_hash = bond_hash(&other);
    let result = verify(keys, &artifact.decode_proof().unwrap(), &public);
    assert!(matches!(result, Err(ProverError::InvalidProof)));
}

/// A valid proof for one round is not a proof for another
#[test]
fn test_proof_is_bound_to_its_public_inputs() {
    let (_, keys) = fixture();
    let first = prove_round(&["92.63", "93.40", "95.00"], "92.63", 0).unwrap();
    let second = prove_round(&["93.00", "93.40", "95.00"], "93.00", 0).unwrap();

    let swapped = ProofArtifact {
        proof: first.proof.clone(),
        ..second
    };
    assert!(matches!(
        verify_artifact(keys, &swapped),
        Err(ProverError::InvalidProof)
    ));
}

/// A round with the wrong number of quotes is a structural error
#[test]
fn test_wrong_quote_count_is_structural() {
    let (compiled, _) = fixture();
    let (public, private) = round(&["92.63", "95.00"], "92.63", 0);
    let result = assign_witness(compiled, public, private);
    assert!(matches!(
        result,
        Err(ProverError::StructuralMismatch {
            expected: 3,
            actual: 2
        })
    ));
}

/// Keys compiled for another shape are refused
#[test]
fn test_shape_mismatch_is_refused() {
    let (_, keys) = fixture();
    let forward = CircuitShape::new(3, AuctionDirection::Forward).unwrap();
    let compiled = compile(forward).unwrap();
    let (public, private) = round(&["97.63", "94.63", "95.63"], "97.63", 0);
    let witness = assign_witness(&compiled, public, private).unwrap();

    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let result = prove(&compiled, keys, witness, &mut rng);
    assert!(matches!(result, Err(ProverError::ShapeMismatch { .. })));
}

/// Saved keys load back with the same fingerprint and still verify
#[test]
fn test_keys_save_and_load() {
    let (_, keys) = fixture();
    let dir = std::env::temp_dir().join(format!("rfq-prover-keys-{}", std::process::id()));

    keys.save(&dir).unwrap();
    assert!(CircuitKeys::exists(&dir));
    let loaded = CircuitKeys::load(&dir).unwrap();
    assert_eq!(loaded.fingerprint(), keys.fingerprint());
    assert_eq!(loaded.shape(), keys.shape());

    let artifact = prove_round(&["92.63", "93.40", "95.00"], "92.63", 0).unwrap();
    verify_artifact(&loaded, &artifact).expect("loaded keys should verify");

    std::fs::remove_dir_all(&dir).ok();
}
