//! Settlement service client

use anyhow::{bail, Context};
use reqwest::{Client, StatusCode};
use rfq_models::{RoundId, RoundReceipt};
use rfq_prover::{ProofArtifact, RoundSubmission};

/// HTTP client for the settlement service
pub struct SettlementClient {
    /// HTTP client
    client: Client,
    /// Service URL
    base_url: String,
}

impl SettlementClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> anyhow::Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Shape, size and key fingerprint of the service's circuit
    pub async fn circuit(&self) -> anyhow::Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/circuit", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Submit a round for proving; rejected rounds still return a receipt
    pub async fn submit_round(&self, round: &RoundSubmission) -> anyhow::Result<RoundReceipt> {
        let response = self
            .client
            .post(format!("{}/rounds", self.base_url))
            .json(round)
            .send()
            .await
            .context("settlement service unreachable")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("round submission failed ({}): {}", status, body);
        }

        let receipt: RoundReceipt = response.json().await?;
        tracing::info!(
            round = %receipt.round_id,
            proven = receipt.is_proven(),
            "Round settled"
        );
        Ok(receipt)
    }

    pub async fn get_round(&self, id: RoundId) -> anyhow::Result<Option<RoundReceipt>> {
        let response = self
            .client
            .get(format!("{}/rounds/{}", self.base_url, id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json().await?))
    }

    /// Ask the service to verify an artifact
    pub async fn verify(&self, artifact: &ProofArtifact) -> anyhow::Result<bool> {
        let response: serde_json::Value = self
            .client
            .post(format!("{}/verify", self.base_url))
            .json(artifact)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response["valid"].as_bool().unwrap_or(false))
    }
}
