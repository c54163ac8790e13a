//! Initiator agent implementations

use anyhow::{bail, Context};
use rfq_models::{best_quote, AuctionDirection, BondDescriptor};
use rfq_prover::RoundSubmission;

use crate::dealer::SignedQuote;

/// How an initiator assembles the round it submits
#[derive(Debug, Clone)]
pub enum InitiatorStrategy {
    /// Honest initiator - discloses the best quote, vouched by its dealer
    Honest,
    /// Discloses the worst quote instead of the best
    InflateAccepted,
    /// Discloses a price nobody quoted, vouched by a dealer who signs it
    /// without having submitted it
    InventValue { vouch: SignedQuote },
    /// Submits the signed quotes against a different bond
    ReplayBond { bond: BondDescriptor },
    /// Swaps a losing quote's signature for the winner's
    ForgeSignature,
}

/// An initiator that runs one RFQ round
pub struct InitiatorAgent {
    /// Bond being traded
    bond: BondDescriptor,
    /// Which side of the book wins
    direction: AuctionDirection,
    /// Signed responses in slot order
    responses: Vec<SignedQuote>,
}

impl InitiatorAgent {
    pub fn new(bond: BondDescriptor, direction: AuctionDirection) -> Self {
        Self {
            bond,
            direction,
            responses: Vec::new(),
        }
    }

    pub fn bond(&self) -> &BondDescriptor {
        &self.bond
    }

    pub fn responses(&self) -> &[SignedQuote] {
        &self.responses
    }

    /// Accept a dealer response; quotes signed for another bond are refused
    pub fn collect(&mut self, quote: SignedQuote) -> anyhow::Result<()> {
        if !quote.verify(&self.bond) {
            bail!("quote from {} is not signed for {}", quote.dealer, self.bond);
        }
        tracing::debug!(dealer = %quote.dealer, value = %quote.value, "Collected quote");
        self.responses.push(quote);
        Ok(())
    }

    /// Slot of the first response carrying the best value
    pub fn best(&self) -> Option<usize> {
        let values: Vec<_> = self.responses.iter().map(|q| q.value).collect();
        let best = best_quote(&values, self.direction)?;
        values.iter().position(|v| *v == best)
    }

    /// Slot of the first response carrying the worst value
    fn worst(&self) -> Option<usize> {
        let values: Vec<_> = self.responses.iter().map(|q| q.value).collect();
        let opposite = match self.direction {
            AuctionDirection::Reverse => AuctionDirection::Forward,
            AuctionDirection::Forward => AuctionDirection::Reverse,
        };
        let worst = best_quote(&values, opposite)?;
        values.iter().position(|v| *v == worst)
    }

    /// Assemble the round for the settlement service
    ///
    /// The winner's quote signature doubles as the vouch for the accepted
    /// value, since both sign the same bond-bound value.
    pub fn assemble(&self, strategy: &InitiatorStrategy) -> anyhow::Result<RoundSubmission> {
        let winner = self.best().context("no quotes collected")?;
        let mut round = RoundSubmission {
            bond: self.bond.clone(),
            accepted_price: self.responses[winner].price.clone(),
            accepted_signature: self.responses[winner].signature,
            winner,
            quotes: self.responses.iter().map(SignedQuote::to_submission).collect(),
        };

        match strategy {
            InitiatorStrategy::Honest => {}
            InitiatorStrategy::InflateAccepted => {
                let worst = self.worst().context("no quotes collected")?;
                round.winner = worst;
                round.accepted_price = self.responses[worst].price.clone();
                round.accepted_signature = self.responses[worst].signature;
            }
            InitiatorStrategy::InventValue { vouch } => {
                round.winner = self
                    .responses
                    .iter()
                    .position(|q| q.public_key == vouch.public_key)
                    .context("vouching dealer has no quote in the round")?;
                round.accepted_price = vouch.price.clone();
                round.accepted_signature = vouch.signature;
            }
            InitiatorStrategy::ReplayBond { bond } => {
                round.bond = bond.clone();
            }
            InitiatorStrategy::ForgeSignature => {
                let Some(victim) = (0..round.quotes.len()).find(|i| *i != winner) else {
                    bail!("forging needs at least two quotes");
                };
                round.quotes[victim].signature = round.accepted_signature;
            }
        }

        tracing::info!(
            bond = %round.bond,
            accepted = %round.accepted_price,
            quotes = round.quotes.len(),
            strategy = ?strategy,
            "Assembled round"
        );
        Ok(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dealer::DealerAgent;
    use rfq_circuit::SigningKey;

    fn bond() -> BondDescriptor {
        BondDescriptor::new("CA29250NAT24", "ENB 5.375 27-Sep-2077", 550_000).unwrap()
    }

    fn initiator(prices: &[&str], direction: AuctionDirection) -> InitiatorAgent {
        let mut initiator = InitiatorAgent::new(bond(), direction);
        for (i, price) in prices.iter().enumerate() {
            let dealer = DealerAgent::new(&format!("dealer-{}", i), SigningKey::from_seed([i as u8 + 1; 32]));
            initiator.collect(dealer.respond(&bond(), price).unwrap()).unwrap();
        }
        initiator
    }

    #[test]
    fn test_best_picks_first_of_tied_minimum() {
        let initiator = initiator(&["95.00", "92.63", "92.63"], AuctionDirection::Reverse);
        assert_eq!(initiator.best(), Some(1));

        let round = initiator.assemble(&InitiatorStrategy::Honest).unwrap();
        assert_eq!(round.accepted_price, "92.63");
        assert_eq!(round.winner, 1);
    }

    #[test]
    fn test_forward_picks_highest() {
        let initiator = initiator(&["95.00", "92.63", "97.10"], AuctionDirection::Forward);
        assert_eq!(initiator.best(), Some(2));
    }

    #[test]
    fn test_collect_refuses_other_bond() {
        let mut initiator = InitiatorAgent::new(bond(), AuctionDirection::Reverse);
        let mut other = bond();
        other.ticker = "ENB 6.000 27-Sep-2077".into();
        let dealer = DealerAgent::new("alpha", SigningKey::from_seed([1; 32]));
        assert!(initiator.collect(dealer.respond(&other, "92.63").unwrap()).is_err());
        assert!(initiator.responses().is_empty());
    }

    #[test]
    fn test_inflate_discloses_worst() {
        let initiator = initiator(&["92.63", "97.63", "95.00"], AuctionDirection::Reverse);
        let round = initiator.assemble(&InitiatorStrategy::InflateAccepted).unwrap();
        assert_eq!(round.accepted_price, "97.63");
        assert_eq!(round.winner, 1);
    }

    #[test]
    fn test_invent_uses_the_colluding_dealer_as_winner() {
        let initiator = initiator(&["97.63", "94.63", "95.63"], AuctionDirection::Reverse);
        let colluder = DealerAgent::new("dealer-1", SigningKey::from_seed([2; 32]));
        let vouch = colluder.respond(&bond(), "90.00").unwrap();

        let round = initiator
            .assemble(&InitiatorStrategy::InventValue { vouch })
            .unwrap();
        assert_eq!(round.accepted_price, "90.00");
        assert_eq!(round.winner, 1);

        let outsider = DealerAgent::new("outsider", SigningKey::from_seed([99; 32]));
        let vouch = outsider.respond(&bond(), "90.00").unwrap();
        assert!(initiator.assemble(&InitiatorStrategy::InventValue { vouch }).is_err());
    }

    #[test]
    fn test_forge_needs_two_quotes() {
        let initiator = initiator(&["92.63"], AuctionDirection::Reverse);
        assert!(initiator.assemble(&InitiatorStrategy::ForgeSignature).is_err());
    }

    #[test]
    fn test_assemble_without_quotes_fails() {
        let initiator = InitiatorAgent::new(bond(), AuctionDirection::Reverse);
        assert!(initiator.assemble(&InitiatorStrategy::Honest).is_err());
    }
}
