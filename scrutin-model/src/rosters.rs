use chrono::{DateTime, Utc};

use crate::ids::{CandidateId, VoterId};

/// Review state of a candidate application. Only approved candidates take
/// part in result computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Pending,
    Approved,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Approved => "approved",
            CandidateStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CandidateStatus::Pending),
            "approved" => Some(CandidateStatus::Approved),
            "rejected" => Some(CandidateStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate roster row, written by the (out-of-scope) registration flow and
/// consumed here for result computation and teardown.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub position: String,
    pub status: CandidateStatus,
    /// Numeric candidate id on the ledger, attached when on-chain
    /// registration succeeds. Candidates without one count zero votes.
    pub ledger_candidate_id: Option<i64>,
    pub wallet_address: Option<String>,
    pub photo_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Voter roster row; the orchestrator only ever reads wallet addresses (for
/// bulk on-chain deactivation) and deletes rows at teardown.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    pub id: VoterId,
    pub full_name: String,
    pub email: String,
    pub wallet_address: Option<String>,
    pub ledger_registered: bool,
    pub created_at: DateTime<Utc>,
}
