//! Settlement service state

use rfq_models::{RoundId, RoundReceipt};
use rfq_prover::ProofArtifact;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory record of settled rounds
#[derive(Debug, Default)]
pub struct DomainState {
    /// Receipts indexed by round ID
    receipts: RwLock<HashMap<RoundId, RoundReceipt>>,
    /// Proof artifacts of proven rounds
    artifacts: RwLock<HashMap<RoundId, ProofArtifact>>,
}

impl DomainState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a round outcome
    pub async fn add_receipt(&self, receipt: RoundReceipt, artifact: Option<ProofArtifact>) {
        if let Some(artifact) = artifact {
            self.artifacts.write().await.insert(receipt.round_id, artifact);
        }
        self.receipts.write().await.insert(receipt.round_id, receipt);
    }

    pub async fn get_receipt(&self, id: &RoundId) -> Option<RoundReceipt> {
        self.receipts.read().await.get(id).cloned()
    }

    pub async fn get_artifact(&self, id: &RoundId) -> Option<ProofArtifact> {
        self.artifacts.read().await.get(id).cloned()
    }

    /// Number of rounds seen, and how many of them were proven
    pub async fn counts(&self) -> (usize, usize) {
        let receipts = self.receipts.read().await;
        let proven = receipts.values().filter(|r| r.is_proven()).count();
        (receipts.len(), proven)
    }
}
