//! Bond binding
//!
//! `BondHash = H(tag, len(isin), isin limbs.., len(ticker), ticker limbs.., size)`
//! and each quote is signed over `H(BondHash, value)`. The argument order of
//! the binding hash is part of the wire format shared by signers and the
//! circuit.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::R1CSVar;
use ark_relations::r1cs::SynthesisError;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rfq_models::{BondDescriptor, QuoteValue};

use crate::codec::hex_serde;
use crate::field::quote_to_field;
use crate::poseidon::{poseidon_hash, poseidon_hash_var};
use crate::Fr;

const BOND_DOMAIN_TAG: &[u8] = b"rfq.bond.v1";

/// Bytes per limb when packing strings; 31 bytes always fit below the modulus
const LIMB_BYTES: usize = 31;

/// Identity of a bond descriptor inside the circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct BondHash(pub Fr);

hex_serde!(BondHash);

fn absorb_str(out: &mut Vec<Fr>, value: &str) {
    let bytes = value.as_bytes();
    out.push(Fr::from(bytes.len() as u64));
    out.extend(bytes.chunks(LIMB_BYTES).map(Fr::from_le_bytes_mod_order));
}

/// Hash a bond descriptor
pub fn bond_hash(descriptor: &BondDescriptor) -> BondHash {
    let mut elements = vec![Fr::from_le_bytes_mod_order(BOND_DOMAIN_TAG)];
    absorb_str(&mut elements, &descriptor.isin);
    absorb_str(&mut elements, &descriptor.ticker);
    elements.push(Fr::from(descriptor.size));
    BondHash(poseidon_hash(&elements))
}

/// The message a counterparty signs for `value` on this bond
pub fn bind_quote(bond: BondHash, value: QuoteValue) -> Fr {
    poseidon_hash(&[bond.0, quote_to_field(value)])
}

/// In-circuit counterpart of [`bind_quote`]
pub fn bind_quote_var(
    bond: &FpVar<Fr>,
    value: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let cs = bond.cs().or(value.cs());
    poseidon_hash_var(cs, &[bond.clone(), value.clone()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::prelude::*;
    use ark_relations::r1cs::ConstraintSystem;

    fn enbridge() -> BondDescriptor {
        BondDescriptor::new("CA29250NAT24", "ENB 5.375 27-Sep-2077", 550_000).unwrap()
    }

    #[test]
    fn test_bond_hash_is_deterministic() {
        assert_eq!(bond_hash(&enbridge()), bond_hash(&enbridge()));
    }

    #[test]
    fn test_every_field_changes_the_hash() {
        let base = bond_hash(&enbridge());

        let mut other = enbridge();
        other.isin = "CA29250NAT25".into();
        assert_ne!(bond_hash(&other), base);

        let mut other = enbridge();
        other.ticker = "ENB 5.375 27-Sep-2078".into();
        assert_ne!(bond_hash(&other), base);

        let mut other = enbridge();
        other.size = 550_001;
        assert_ne!(bond_hash(&other), base);
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        // Moving a character between isin and ticker must not collide.
        let a = BondDescriptor::new("AB", "C", 1).unwrap();
        let b = BondDescriptor::new("A", "BC", 1).unwrap();
        assert_ne!(bond_hash(&a), bond_hash(&b));
    }

    #[test]
    fn test_binding_differs_across_bonds() {
        let value = QuoteValue::from_cents(50_946_500);
        let mut other = enbridge();
        other.isin = "US0000000000".into();
        assert_ne!(
            bind_quote(bond_hash(&enbridge()), value),
            bind_quote(bond_hash(&other), value)
        );
    }

    #[test]
    fn test_gadget_matches_native_binding() {
        let bond = bond_hash(&enbridge());
        let value = QuoteValue::from_cents(50_946_500);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let bond_var = FpVar::new_input(cs.clone(), || Ok(bond.0)).unwrap();
        let value_var = FpVar::new_witness(cs.clone(), || Ok(quote_to_field(value))).unwrap();
        let bound = bind_quote_var(&bond_var, &value_var).unwrap();

        assert_eq!(bound.value().unwrap(), bind_quote(bond, value));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_hex_round_trip_through_json() {
        let bond = bond_hash(&enbridge());
        let json = serde_json::to_string(&bond).unwrap();
        let decoded: BondHash = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, bond);
    }
}
