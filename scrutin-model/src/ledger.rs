//! Wire-level records returned by the ledger gateway. The ledger itself is
//! authoritative and opaque; these are the only shapes the orchestrator sees.

use crate::ids::LedgerElectionId;

/// Outcome of provisioning an election on-chain.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedElection {
    pub ledger_election_id: LedgerElectionId,
    pub transaction_hash: String,
}

/// Receipt for a state-changing ledger call (completion, deactivation).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReceipt {
    pub transaction_hash: String,
}

/// The ledger's own per-position winner summary, only available once the
/// election is completed on-chain. Served raw by the gateway; the archival
/// pipeline prefers roster-based tallies and falls back to this summary when
/// the roster is already gone.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResults {
    pub positions: Vec<PositionSummary>,
}

/// One position's summary as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub position: String,
    pub winner: String,
    pub winning_votes: u64,
    pub tied: bool,
}

impl LedgerResults {
    pub fn empty() -> Self {
        LedgerResults {
            positions: Vec::new(),
        }
    }
}

/// Gateway reachability as reported by its health probe.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStatus {
    pub connected: bool,
    pub contract_ref: Option<String>,
}
