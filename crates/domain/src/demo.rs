//! Reference scenarios, run end to end without the HTTP layer

use anyhow::Result;
use rfq_agents::{DealerAgent, InitiatorAgent, InitiatorStrategy};
use rfq_circuit::SigningKey;
use rfq_models::{AuctionDirection, BondDescriptor};
use rfq_prover::{compile, CircuitShape};
use std::sync::Arc;
use std::time::Duration;

use crate::config::DomainConfig;
use crate::settlement::{run_setup, Settlement};

struct Scenario {
    name: &'static str,
    prices: [&'static str; 3],
    strategy: InitiatorStrategy,
    expect_proof: bool,
}

fn scenarios(dealers: &[DealerAgent]) -> Result<Vec<Scenario>> {
    let mut other_bond = enbridge();
    other_bond.isin = "US0000000000".to_string();
    // bravo holds the best quote in the invented-value round and signs a
    // price it never quoted
    let vouch = dealers[1].respond(&enbridge(), "90.00")?;

    Ok(vec![
        Scenario {
            name: "tied minimum",
            prices: ["92.63", "92.63", "95.00"],
            strategy: InitiatorStrategy::Honest,
            expect_proof: true,
        },
        Scenario {
            name: "distinct minimum",
            prices: ["97.63", "94.63", "95.63"],
            strategy: InitiatorStrategy::Honest,
            expect_proof: true,
        },
        Scenario {
            name: "accepted is not the minimum",
            prices: ["97.63", "94.63", "95.63"],
            strategy: InitiatorStrategy::InflateAccepted,
            expect_proof: false,
        },
        Scenario {
            name: "invented value",
            prices: ["97.63", "94.63", "95.63"],
            strategy: InitiatorStrategy::InventValue { vouch },
            expect_proof: false,
        },
        Scenario {
            name: "replayed against another bond",
            prices: ["92.63", "93.40", "95.00"],
            strategy: InitiatorStrategy::ReplayBond { bond: other_bond },
            expect_proof: false,
        },
        Scenario {
            name: "forged signature",
            prices: ["92.63", "93.40", "95.00"],
            strategy: InitiatorStrategy::ForgeSignature,
            expect_proof: false,
        },
    ])
}

fn enbridge() -> BondDescriptor {
    BondDescriptor {
        isin: "CA29250NAT24".to_string(),
        ticker: "ENB 5.375 27-Sep-2077".to_string(),
        size: 550_000,
    }
}

/// Run every scenario against a fresh three-quote circuit
pub async fn run(config: &DomainConfig) -> Result<()> {
    let shape = CircuitShape::new(3, AuctionDirection::Reverse)?;
    let seed = config.setup_seed.or(Some(0));
    let (compiled, keys) = tokio::task::spawn_blocking(move || -> Result<_> {
        let compiled = compile(shape)?;
        let keys = run_setup(&compiled, seed)?;
        Ok((compiled, keys))
    })
    .await??;

    let settlement = Settlement {
        compiled,
        keys: Arc::new(keys),
        policy: config.encoding_policy(),
        timeout: Duration::from_secs(config.prove_timeout_secs),
    };
    let dealers: Vec<_> = ["alpha", "bravo", "charlie"]
        .iter()
        .enumerate()
        .map(|(i, name)| DealerAgent::new(name, SigningKey::from_seed([i as u8 + 1; 32])))
        .collect();

    let mut mismatches = 0;
    for scenario in scenarios(&dealers)? {
        let bond = enbridge();
        let mut initiator = InitiatorAgent::new(bond.clone(), shape.direction);
        for (dealer, price) in dealers.iter().zip(scenario.prices) {
            initiator.collect(dealer.respond(&bond, price)?)?;
        }

        let round = initiator.assemble(&scenario.strategy)?;
        let (receipt, _) = settlement.settle(round).await?;
        let outcome = match receipt.rejection() {
            None => "proven".to_string(),
            Some(reason) => format!("rejected ({})", reason.code()),
        };

        if receipt.is_proven() == scenario.expect_proof {
            tracing::info!("{:<32} {:?} -> {}", scenario.name, scenario.prices, outcome);
        } else {
            mismatches += 1;
            tracing::error!(
                "{:<32} {:?} -> {} (unexpected)",
                scenario.name,
                scenario.prices,
                outcome
            );
        }
    }

    if mismatches > 0 {
        anyhow::bail!("{} scenario(s) did not behave as expected", mismatches);
    }
    tracing::info!("All scenarios behaved as expected");
    Ok(())
}
