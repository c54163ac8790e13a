//! Comparison and selection gadgets
//!
//! Booleans here are field elements constrained to {0, 1}, combined with
//! field arithmetic: AND is a product, OR is `a + b - a·b`, NOT is `1 - a`.

use ark_ff::{BigInteger, Field, PrimeField, Zero};
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;
use rfq_models::AuctionDirection;

use crate::field::QUOTE_VALUE_BITS;
use crate::Fr;

/// Returns a flag that is 1 when `value == 0` and 0 otherwise.
///
/// Allocates the flag and an inverse hint, then enforces
/// `value · inv == 1 - flag` and `value · flag == 0`.
pub fn is_zero_var(value: &FpVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
    let cs = value.cs();
    let assigned = value.value();

    let flag = Boolean::new_witness(cs.clone(), || assigned.map(|v| v.is_zero()))?;
    let flag = FpVar::from(flag);
    let inverse = FpVar::new_witness(cs, || {
        assigned.map(|v| v.inverse().unwrap_or(Fr::from(0u64)))
    })?;

    value.mul_equals(&inverse, &(FpVar::one() - &flag))?;
    value.mul_equals(&flag, &FpVar::zero())?;
    Ok(flag)
}

/// Inclusion-exclusion OR over boolean field elements; 0 for an empty slice
pub fn or_all(flags: &[FpVar<Fr>]) -> FpVar<Fr> {
    flags
        .iter()
        .fold(FpVar::zero(), |acc, flag| &acc + flag - &acc * flag)
}

/// Product AND over boolean field elements; 1 for an empty slice
pub fn and_all(flags: &[FpVar<Fr>]) -> FpVar<Fr> {
    flags.iter().fold(FpVar::one(), |acc, flag| acc * flag)
}

/// Enforce `0 <= value < 2^bits` by decomposing into boolean witnesses
pub fn enforce_bit_length(value: &FpVar<Fr>, bits: usize) -> Result<(), SynthesisError> {
    let cs = value.cs();
    let decomposed = value.value().map(|v| v.into_bigint().to_bits_le());

    let le_bits = (0..bits)
        .map(|i| {
            Boolean::new_witness(cs.clone(), || {
                decomposed
                    .as_ref()
                    .map(|b| b[i])
                    .map_err(|e| *e)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Boolean::le_bits_to_fp_var(&le_bits)?.enforce_equal(value)
}

/// Enforce `lhs <= rhs` for values already range-checked to `bits`
pub fn enforce_le(lhs: &FpVar<Fr>, rhs: &FpVar<Fr>, bits: usize) -> Result<(), SynthesisError> {
    enforce_bit_length(&(rhs - lhs), bits)
}

/// Winner determination.
///
/// Enforces that `accepted` is at least as good as every quote in the given
/// direction and that it equals at least one of them. Returns the per-quote
/// match flags (`quote_i == accepted`) for callers that bind further
/// conditions to the matching slots.
pub fn enforce_best_quote(
    accepted: &FpVar<Fr>,
    quotes: &[FpVar<Fr>],
    direction: AuctionDirection,
) -> Result<Vec<FpVar<Fr>>, SynthesisError> {
    let mut matches = Vec::with_capacity(quotes.len());
    for quote in quotes {
        match direction {
            AuctionDirection::Reverse => enforce_le(accepted, quote, QUOTE_VALUE_BITS)?,
            AuctionDirection::Forward => enforce_le(quote, accepted, QUOTE_VALUE_BITS)?,
        }
        matches.push(is_zero_var(&(quote - accepted))?);
    }

    or_all(&matches).enforce_equal(&FpVar::one())?;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::{ConstraintSystem, ConstraintSystemRef};

    fn witness(cs: &ConstraintSystemRef<Fr>, value: u64) -> FpVar<Fr> {
        FpVar::new_witness(cs.clone(), || Ok(Fr::from(value))).unwrap()
    }

    #[test]
    fn test_is_zero() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let zero = is_zero_var(&witness(&cs, 0)).unwrap();
        let nonzero = is_zero_var(&witness(&cs, 5)).unwrap();

        assert_eq!(zero.value().unwrap(), Fr::from(1u64));
        assert_eq!(nonzero.value().unwrap(), Fr::from(0u64));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_boolean_combinators() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let t = witness(&cs, 1);
        let f = witness(&cs, 0);

        assert_eq!(or_all(&[f.clone(), f.clone()]).value().unwrap(), Fr::from(0u64));
        assert_eq!(or_all(&[f.clone(), t.clone()]).value().unwrap(), Fr::from(1u64));
        assert_eq!(or_all(&[t.clone(), t.clone(), t.clone()]).value().unwrap(), Fr::from(1u64));
        assert_eq!(and_all(&[t.clone(), t.clone()]).value().unwrap(), Fr::from(1u64));
        assert_eq!(and_all(&[t, f]).value().unwrap(), Fr::from(0u64));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_bit_length() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        enforce_bit_length(&witness(&cs, u64::MAX), 64).unwrap();
        assert!(cs.is_satisfied().unwrap());

        let cs = ConstraintSystem::<Fr>::new_ref();
        enforce_bit_length(&witness(&cs, 256), 8).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_le_rejects_wrapped_difference() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        enforce_le(&witness(&cs, 7), &witness(&cs, 7), 64).unwrap();
        enforce_le(&witness(&cs, 6), &witness(&cs, 7), 64).unwrap();
        assert!(cs.is_satisfied().unwrap());

        let cs = ConstraintSystem::<Fr>::new_ref();
        enforce_le(&witness(&cs, 8), &witness(&cs, 7), 64).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    fn best_quote_holds(accepted: u64, quotes: &[u64], direction: AuctionDirection) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let accepted = witness(&cs, accepted);
        let quotes: Vec<_> = quotes.iter().map(|q| witness(&cs, *q)).collect();
        enforce_best_quote(&accepted, &quotes, direction).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_best_quote_reverse() {
        assert!(best_quote_holds(9263, &[9263, 9263, 9500], AuctionDirection::Reverse));
        assert!(!best_quote_holds(9563, &[9763, 9463, 9563], AuctionDirection::Reverse));
        // smaller than everything but not among the quotes
        assert!(!best_quote_holds(9000, &[9763, 9463, 9563], AuctionDirection::Reverse));
    }

    #[test]
    fn test_best_quote_forward() {
        assert!(best_quote_holds(9763, &[9763, 9463, 9563], AuctionDirection::Forward));
        assert!(!best_quote_holds(9463, &[9763, 9463, 9563], AuctionDirection::Forward));
    }

    #[test]
    fn test_match_flags() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let accepted = witness(&cs, 9263);
        let quotes: Vec<_> = [9263, 9500, 9263].iter().map(|q| witness(&cs, *q)).collect();
        let flags = enforce_best_quote(&accepted, &quotes, AuctionDirection::Reverse).unwrap();
        let flags: Vec<_> = flags.iter().map(|f| f.value().unwrap()).collect();
        assert_eq!(flags, vec![Fr::from(1u64), Fr::from(0u64), Fr::from(1u64)]);
    }
}
