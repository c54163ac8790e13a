//! EdDSA over the twisted-Edwards curve embedded in BN254
//!
//! Public key `A = a·B`. A signature over a field element `m` is `(R, s)` with
//! `R = r·B`, `h = Poseidon(R.x, R.y, A.x, A.y, m)` and `s = r + h·a mod ℓ`.
//! Verification checks `s·B == R + h·A`, natively and in-circuit. Curve
//! parameters are fixed by the `ark-ed-on-bn254` types.

use std::borrow::Borrow;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::constraints::EdwardsVar;
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective, Fr as EdScalar};
use ark_ff::{BigInteger, PrimeField};
use ark_r1cs_std::prelude::*;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{Namespace, SynthesisError};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};

use crate::codec::{hex_serde, to_hex};
use crate::poseidon::{poseidon_hash, poseidon_hash_var};
use crate::Fr;

/// A counterparty's registered public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PublicKey(pub EdwardsAffine);

hex_serde!(PublicKey);

/// A signature `(R, s)` over a field element
#[derive(Debug, Clone, Copy, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Signature {
    pub r: EdwardsAffine,
    pub s: EdScalar,
}

hex_serde!(Signature);

impl Signature {
    /// `s` lifted into the circuit field; exact because ℓ < p
    pub fn s_in_field(&self) -> Fr {
        Fr::from_le_bytes_mod_order(&self.s.into_bigint().to_bytes_le())
    }
}

fn challenge(r: &EdwardsAffine, public_key: &EdwardsAffine, message: Fr) -> EdScalar {
    let h = poseidon_hash(&[r.x, r.y, public_key.x, public_key.y, message]);
    EdScalar::from_le_bytes_mod_order(&h.into_bigint().to_bytes_le())
}

impl PublicKey {
    /// Verify a signature natively
    pub fn verify(&self, message: Fr, signature: &Signature) -> bool {
        let h = challenge(&signature.r, &self.0, message);
        let lhs = EdwardsAffine::generator() * signature.s;
        let rhs = EdwardsProjective::from(signature.r) + self.0 * h;
        lhs == rhs
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match to_hex(self) {
            Ok(encoded) => f.write_str(&encoded),
            Err(_) => f.write_str("<invalid key>"),
        }
    }
}

/// A counterparty's signing key
#[derive(Clone)]
pub struct SigningKey {
    secret: EdScalar,
    nonce_seed: [u8; 32],
    public: PublicKey,
}

impl SigningKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Derive a key from a 32-byte seed (RFC 8032 style expansion)
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let expanded = Sha512::digest(seed);
        let secret = EdScalar::from_le_bytes_mod_order(&expanded[..32]);
        let mut nonce_seed = [0u8; 32];
        nonce_seed.copy_from_slice(&expanded[32..]);
        let public = PublicKey((EdwardsAffine::generator() * secret).into_affine());
        Self {
            secret,
            nonce_seed,
            public,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Sign a field element; the nonce is derived from the key and message
    pub fn sign(&self, message: Fr) -> Signature {
        let mut hasher = Sha512::new();
        hasher.update(self.nonce_seed);
        hasher.update(message.into_bigint().to_bytes_le());
        let nonce = EdScalar::from_le_bytes_mod_order(&hasher.finalize());

        let r = (EdwardsAffine::generator() * nonce).into_affine();
        let h = challenge(&r, &self.public.0, message);
        Signature {
            r,
            s: nonce + h * self.secret,
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// In-circuit signature: `R` as a curve point, `s` as a circuit field element
#[derive(Clone)]
pub struct SignatureVar {
    pub r: EdwardsVar,
    pub s: FpVar<Fr>,
}

impl AllocVar<Signature, Fr> for SignatureVar {
    fn new_variable<T: Borrow<Signature>>(
        cs: impl Into<Namespace<Fr>>,
        f: impl FnOnce() -> Result<T, SynthesisError>,
        mode: AllocationMode,
    ) -> Result<Self, SynthesisError> {
        let ns = cs.into();
        let cs = ns.cs();
        let value = f().map(|sig| *sig.borrow());
        let r = alloc_point(cs.clone(), || value.map(|sig| sig.r), mode)?;
        let s = FpVar::new_variable(cs, || value.map(|sig| sig.s_in_field()), mode)?;
        Ok(Self { r, s })
    }
}

/// Allocate a curve point. Inputs are checked on-curve only; witnesses also
/// get the prime-order subgroup check.
pub fn alloc_point(
    cs: impl Into<Namespace<Fr>>,
    f: impl FnOnce() -> Result<EdwardsAffine, SynthesisError>,
    mode: AllocationMode,
) -> Result<EdwardsVar, SynthesisError> {
    <EdwardsVar as AllocVar<EdwardsAffine, Fr>>::new_variable(cs, f, mode)
}

/// Enforce that `signature` is valid for `message` under `public_key`
pub fn verify_signature_var(
    public_key: &EdwardsVar,
    message: &FpVar<Fr>,
    signature: &SignatureVar,
) -> Result<(), SynthesisError> {
    let cs = message.cs().or(public_key.cs()).or(signature.s.cs());
    let h = poseidon_hash_var(
        cs,
        &[
            signature.r.x.clone(),
            signature.r.y.clone(),
            public_key.x.clone(),
            public_key.y.clone(),
            message.clone(),
        ],
    )?;

    let generator = EdwardsVar::constant(EdwardsAffine::generator().into_group());
    let lhs = generator.scalar_mul_le(signature.s.to_bits_le()?.iter())?;
    let rhs = signature.r.clone() + public_key.scalar_mul_le(h.to_bits_le()?.iter())?;
    lhs.enforce_equal(&rhs)
}
