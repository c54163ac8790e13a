//! Wire format of a round handed to the prover
//!
//! Prices travel as the decimal strings the counterparties quoted and are
//! encoded here against the bond size, so every quote of a round is scaled
//! the same way.

use rfq_circuit::{bond_hash, PrivateInputs, PublicInputs, PublicKey, QuoteWitness, Signature};
use rfq_models::{encode_quote, BondDescriptor, EncodingPolicy, QuoteValue};
use serde::{Deserialize, Serialize};

use crate::ProverError;

/// One counterparty's signed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSubmission {
    /// Percentage-of-par price, e.g. "92.63"
    pub price: String,
    pub public_key: PublicKey,
    /// Signature over the bond-bound quote value
    pub signature: Signature,
}

/// A complete round as assembled by the initiator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSubmission {
    pub bond: BondDescriptor,
    pub accepted_price: String,
    /// Signature over the bond-bound accepted value by the winner's key
    pub accepted_signature: Signature,
    /// Slot of the quote whose counterparty vouches for the accepted value
    pub winner: usize,
    pub quotes: Vec<QuoteSubmission>,
}

impl RoundSubmission {
    /// The encoded accepted value
    pub fn accepted_value(&self, policy: EncodingPolicy) -> Result<QuoteValue, ProverError> {
        Ok(encode_quote(&self.accepted_price, self.bond.size, policy)?)
    }

    /// Encode and split into public and private circuit inputs
    pub fn into_inputs(
        self,
        policy: EncodingPolicy,
    ) -> Result<(PublicInputs, PrivateInputs), ProverError> {
        self.bond.validate()?;
        let accepted = self.accepted_value(policy)?;

        let mut public_keys = Vec::with_capacity(self.quotes.len());
        let mut quotes = Vec::with_capacity(self.quotes.len());
        for quote in self.quotes {
            quotes.push(QuoteWitness {
                value: encode_quote(&quote.price, self.bond.size, policy)?,
                signature: quote.signature,
            });
            public_keys.push(quote.public_key);
        }

        let public = PublicInputs {
            accepted,
            bond_hash: bond_hash(&self.bond),
            public_keys,
            accepted_signature: self.accepted_signature,
        };
        Ok((
            public,
            PrivateInputs {
                quotes,
                winner: self.winner,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfq_circuit::{bind_quote, SigningKey};
    use rfq_models::EncodingError;

    fn submission(prices: &[&str], accepted: &str) -> RoundSubmission {
        let bond = BondDescriptor::new("CA29250NAT24", "ENB 5.375 27-Sep-2077", 550_000).unwrap();
        let hash = bond_hash(&bond);
        let signer = SigningKey::from_seed([1; 32]);
        let policy = EncodingPolicy::default();
        let sign = |price: &str| {
            let value = encode_quote(price, bond.size, policy).unwrap_or(QuoteValue::from_cents(0));
            signer.sign(bind_quote(hash, value))
        };

        RoundSubmission {
            bond: bond.clone(),
            accepted_price: accepted.to_string(),
            accepted_signature: sign(accepted),
            winner: 0,
            quotes: prices
                .iter()
                .map(|price| QuoteSubmission {
                    price: price.to_string(),
                    public_key: signer.public_key(),
                    signature: sign(price),
                })
                .collect(),
        }
    }

    #[test]
    fn test_encodes_against_bond_size() {
        let (public, private) = submission(&["92.63", "93.40"], "92.63")
            .into_inputs(EncodingPolicy::default())
            .unwrap();
        assert_eq!(public.accepted, QuoteValue::from_cents(50_946_500));
        assert_eq!(private.quotes[1].value, QuoteValue::from_cents(51_370_000));
        assert_eq!(public.public_keys.len(), 2);
    }

    #[test]
    fn test_negative_price_needs_policy() {
        let round = submission(&["-1.50", "2.00"], "-1.50");
        assert!(matches!(
            round.clone().into_inputs(EncodingPolicy::default()),
            Err(ProverError::Encoding(EncodingError::NegativePrice(_)))
        ));
        assert!(round.into_inputs(EncodingPolicy::signed()).is_ok());
    }

    #[test]
    fn test_rejects_invalid_bond() {
        let mut round = submission(&["92.63"], "92.63");
        round.bond.isin.clear();
        assert!(matches!(
            round.into_inputs(EncodingPolicy::default()),
            Err(ProverError::Bond(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let round = submission(&["92.63", "95.00"], "92.63");
        let json = serde_json::to_string(&round).unwrap();
        let decoded: RoundSubmission = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, round);
    }
}
