//! The best-quote constraint synthesizer
//!
//! Public inputs, in allocation order:
//! accepted value, bond hash, N counterparty keys (x, y each), and the
//! accepted-value signature (R.x, R.y, s). Private inputs are the N quote
//! values with their signatures, plus the key of the counterparty vouching
//! for the accepted value.

use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use rfq_models::{AuctionDirection, QuoteValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binding::{bind_quote_var, BondHash};
use crate::field::{quote_to_field, QUOTE_VALUE_BITS};
use crate::gadgets::{and_all, enforce_best_quote, enforce_bit_length, is_zero_var, or_all};
use crate::signature::{alloc_point, verify_signature_var, PublicKey, Signature, SignatureVar};
use crate::{CircuitError, Fr};

/// The fixed structure a circuit is compiled for
///
/// Proving and verifying keys are tied to one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircuitShape {
    /// Number of competing quotes (N)
    pub quotes: usize,
    #[serde(default)]
    pub direction: AuctionDirection,
}

impl CircuitShape {
    pub fn new(quotes: usize, direction: AuctionDirection) -> Result<Self, CircuitError> {
        if quotes == 0 {
            return Err(CircuitError::EmptyShape);
        }
        Ok(Self { quotes, direction })
    }

    /// Number of field elements in the public input vector
    pub fn public_input_len(&self) -> usize {
        2 * self.quotes + 5
    }
}

impl std::fmt::Display for CircuitShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} quotes, {} auction", self.quotes, self.direction)
    }
}

/// Values disclosed to the verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    pub accepted: QuoteValue,
    pub bond_hash: BondHash,
    /// One registered key per quote slot, in slot order
    pub public_keys: Vec<PublicKey>,
    /// Signature over `bind_quote(bond_hash, accepted)`
    pub accepted_signature: Signature,
}

impl PublicInputs {
    /// Flatten into the verifier's input vector, matching allocation order
    pub fn to_field_elements(&self) -> Vec<Fr> {
        let mut inputs = Vec::with_capacity(2 * self.public_keys.len() + 5);
        inputs.push(quote_to_field(self.accepted));
        inputs.push(self.bond_hash.0);
        for key in &self.public_keys {
            inputs.push(key.0.x);
            inputs.push(key.0.y);
        }
        inputs.push(self.accepted_signature.r.x);
        inputs.push(self.accepted_signature.r.y);
        inputs.push(self.accepted_signature.s_in_field());
        inputs
    }
}

/// One private quote slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteWitness {
    pub value: QuoteValue,
    /// Signature over `bind_quote(bond_hash, value)` by the slot's key
    pub signature: Signature,
}

/// Values known only to the prover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateInputs {
    pub quotes: Vec<QuoteWitness>,
    /// Slot whose key signed the accepted value; any tied slot works
    pub winner: usize,
}

/// Best-quote circuit over a fixed shape
///
/// Built with [`BestQuoteCircuit::blank`] for setup and
/// [`BestQuoteCircuit::new`] for proving.
#[derive(Debug, Clone)]
pub struct BestQuoteCircuit {
    shape: CircuitShape,
    public: Option<PublicInputs>,
    private: Option<PrivateInputs>,
}

impl BestQuoteCircuit {
    /// An unassigned circuit; only usable in setup mode
    pub fn blank(shape: CircuitShape) -> Self {
        Self {
            shape,
            public: None,
            private: None,
        }
    }

    /// An assigned circuit; fails if the inputs do not fit the shape
    pub fn new(
        shape: CircuitShape,
        public: PublicInputs,
        private: PrivateInputs,
    ) -> Result<Self, CircuitError> {
        if public.public_keys.len() != shape.quotes {
            return Err(CircuitError::KeyCount {
                expected: shape.quotes,
                actual: public.public_keys.len(),
            });
        }
        if private.quotes.len() != shape.quotes {
            return Err(CircuitError::QuoteCount {
                expected: shape.quotes,
                actual: private.quotes.len(),
            });
        }
        if private.winner >= shape.quotes {
            return Err(CircuitError::WinnerOutOfRange {
                index: private.winner,
                quotes: shape.quotes,
            });
        }
        Ok(Self {
            shape,
            public: Some(public),
            private: Some(private),
        })
    }

    pub fn shape(&self) -> CircuitShape {
        self.shape
    }

    pub fn public_inputs(&self) -> Option<&PublicInputs> {
        self.public.as_ref()
    }
}

fn assigned<T>(value: Option<T>) -> Result<T, SynthesisError> {
    value.ok_or(SynthesisError::AssignmentMissing)
}

impl ConstraintSynthesizer<Fr> for BestQuoteCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let public = self.public.as_ref();
        let private = self.private.as_ref();
        let n = self.shape.quotes;

        // Public inputs
        let accepted = FpVar::new_input(cs.clone(), || {
            assigned(public.map(|p| quote_to_field(p.accepted)))
        })?;
        let bond = FpVar::new_input(cs.clone(), || assigned(public.map(|p| p.bond_hash.0)))?;
        let keys = (0..n)
            .map(|i| {
                alloc_point(
                    cs.clone(),
                    || assigned(public.and_then(|p| p.public_keys.get(i)).map(|k| k.0)),
                    AllocationMode::Input,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let accepted_signature = SignatureVar::new_input(cs.clone(), || {
            assigned(public.map(|p| p.accepted_signature))
        })?;

        enforce_bit_length(&accepted, QUOTE_VALUE_BITS)?;

        // Each slot: range check, bond binding, signature under the slot key
        let mut values = Vec::with_capacity(n);
        for (i, key) in keys.iter().enumerate() {
            let slot = private.and_then(|p| p.quotes.get(i));
            let value = FpVar::new_witness(cs.clone(), || {
                assigned(slot.map(|q| quote_to_field(q.value)))
            })?;
            enforce_bit_length(&value, QUOTE_VALUE_BITS)?;

            let signature = SignatureVar::new_witness(cs.clone(), || assigned(slot.map(|q| q.signature)))?;
            let message = bind_quote_var(&bond, &value)?;
            verify_signature_var(key, &message, &signature)?;
            values.push(value);
        }

        let matches = enforce_best_quote(&accepted, &values, self.shape.direction)?;

        // The accepted value is vouched for by a key whose quote matches it
        let winner = alloc_point(
            cs.clone(),
            || {
                let index = assigned(private.map(|p| p.winner))?;
                assigned(public.and_then(|p| p.public_keys.get(index)).map(|k| k.0))
            },
            AllocationMode::Witness,
        )?;
        let accepted_message = bind_quote_var(&bond, &accepted)?;
        verify_signature_var(&winner, &accepted_message, &accepted_signature)?;

        let vouched = matches
            .iter()
            .zip(&keys)
            .map(|(matched, key)| {
                let same_x = is_zero_var(&(&key.x - &winner.x))?;
                let same_y = is_zero_var(&(&key.y - &winner.y))?;
                Ok(and_all(&[matched.clone(), same_x, same_y]))
            })
            .collect::<Result<Vec<_>, SynthesisError>>()?;
        or_all(&vouched).enforce_equal(&FpVar::one())?;

        debug!(
            shape = %self.shape,
            constraints = cs.num_constraints(),
            "Synthesized best-quote circuit"
        );
        Ok(())
    }
}
