//! Settlement service configuration

use anyhow::Context;
use rfq_models::{AuctionDirection, EncodingPolicy};
use rfq_prover::CircuitShape;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Settlement service configuration
///
/// Every field falls back to its environment variable, then to a built-in
/// default, so a YAML file only needs the fields it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// HTTP port for API
    pub api_port: u16,
    /// Number of competing quotes the circuit is compiled for
    pub quotes: usize,
    /// Auction direction of the compiled circuit
    pub direction: AuctionDirection,
    /// Directory holding the proving and verifying keys
    pub key_dir: PathBuf,
    /// Accept negative prices at ingestion
    pub allow_negative_quotes: bool,
    /// Fixed setup seed; unset means a random, non-reproducible setup
    pub setup_seed: Option<u64>,
    /// Upper bound on one proving request
    pub prove_timeout_secs: u64,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

impl Default for DomainConfig {
    fn default() -> Self {
        let direction = match env::var("RFQ_DIRECTION").as_deref() {
            Ok("forward") => AuctionDirection::Forward,
            _ => AuctionDirection::Reverse,
        };

        Self {
            api_port: env_parse("API_PORT").unwrap_or(3000),
            quotes: env_parse("RFQ_QUOTES").unwrap_or(3),
            direction,
            key_dir: env::var("RFQ_KEY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("keys")),
            allow_negative_quotes: env::var("RFQ_ALLOW_NEGATIVE")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
            setup_seed: env_parse("RFQ_SETUP_SEED"),
            prove_timeout_secs: env_parse("RFQ_PROVE_TIMEOUT_SECS").unwrap_or(60),
        }
    }
}

impl DomainConfig {
    /// Load from a YAML file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents).context("Invalid YAML")?;
        Ok(config)
    }

    pub fn shape(&self) -> anyhow::Result<CircuitShape> {
        CircuitShape::new(self.quotes, self.direction).context("Invalid circuit shape")
    }

    pub fn encoding_policy(&self) -> EncodingPolicy {
        EncodingPolicy {
            allow_negative: self.allow_negative_quotes,
        }
    }
}
