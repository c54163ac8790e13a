//! Dealer agent implementation

use anyhow::Context;
use rand::{CryptoRng, RngCore};
use rfq_circuit::{bind_quote, bond_hash, PublicKey, Signature, SigningKey};
use rfq_models::{encode_quote, BondDescriptor, EncodingPolicy, QuoteValue};
use rfq_prover::QuoteSubmission;
use serde::{Deserialize, Serialize};

/// A dealer's signed response to an RFQ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedQuote {
    /// Dealer name, for logs only
    pub dealer: String,
    /// Price as quoted (percentage of par)
    pub price: String,
    /// Encoded value the signature covers
    pub value: QuoteValue,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl SignedQuote {
    /// Check the signature against the bond this quote claims to be for
    pub fn verify(&self, bond: &BondDescriptor) -> bool {
        self.public_key
            .verify(bind_quote(bond_hash(bond), self.value), &self.signature)
    }

    pub fn to_submission(&self) -> QuoteSubmission {
        QuoteSubmission {
            price: self.price.clone(),
            public_key: self.public_key,
            signature: self.signature,
        }
    }
}

/// A dealer that answers RFQs with signed quotes
pub struct DealerAgent {
    /// Dealer name
    name: String,
    /// Dealer's signing key
    key: SigningKey,
    /// Encoding applied to outgoing prices
    policy: EncodingPolicy,
}

impl DealerAgent {
    pub fn new(name: &str, key: SigningKey) -> Self {
        Self {
            name: name.to_string(),
            key,
            policy: EncodingPolicy::default(),
        }
    }

    pub fn generate<R: RngCore + CryptoRng>(name: &str, rng: &mut R) -> Self {
        Self::new(name, SigningKey::generate(rng))
    }

    pub fn with_policy(mut self, policy: EncodingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// Quote `price` for `bond`, signing the bond-bound value
    pub fn respond(&self, bond: &BondDescriptor, price: &str) -> anyhow::Result<SignedQuote> {
        let value = encode_quote(price, bond.size, self.policy)
            .with_context(|| format!("{} cannot quote {:?}", self.name, price))?;
        let signature = self.key.sign(bind_quote(bond_hash(bond), value));

        tracing::debug!(dealer = %self.name, bond = %bond, value = %value, "Signed quote");
        Ok(SignedQuote {
            dealer: self.name.clone(),
            price: price.trim().to_string(),
            value,
            public_key: self.public_key(),
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bond() -> BondDescriptor {
        BondDescriptor::new("CA29250NAT24", "ENB 5.375 27-Sep-2077", 550_000).unwrap()
    }

    #[test]
    fn test_respond_signs_bond_bound_value() {
        let dealer = DealerAgent::new("alpha", SigningKey::from_seed([1; 32]));
        let quote = dealer.respond(&bond(), "92.63").unwrap();

        assert_eq!(quote.value, QuoteValue::from_cents(50_946_500));
        assert!(quote.verify(&bond()));

        let mut other = bond();
        other.size = 1_000_000;
        assert!(!quote.verify(&other));
    }

    #[test]
    fn test_respond_rejects_negative_by_default() {
        let dealer = DealerAgent::new("alpha", SigningKey::from_seed([1; 32]));
        assert!(dealer.respond(&bond(), "-1.00").is_err());

        let dealer = dealer.with_policy(EncodingPolicy::signed());
        assert!(dealer.respond(&bond(), "-1.00").is_ok());
    }
}
