use chrono::{DateTime, Utc};

use crate::ids::{ArchiveId, LedgerElectionId};
use crate::results::CategoryResult;

/// Immutable archived results record. Append-only: written exactly once per
/// ledger election id and never updated or deleted, including by admin reset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedElection {
    pub id: ArchiveId,
    pub ledger_election_id: LedgerElectionId,
    pub title: String,
    /// Window instants are nullable: a minimal archive written after the
    /// registry record was already lost records no windows.
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    pub archived_at: DateTime<Utc>,
    pub results: Vec<CategoryResult>,
    pub ledger_contract_ref: Option<String>,
}

/// Fields supplied by the archival pipeline; id and `archived_at` are
/// assigned at the write (the commit point of the retirement procedure).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArchivedElection {
    pub ledger_election_id: LedgerElectionId,
    pub title: String,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    pub results: Vec<CategoryResult>,
    pub ledger_contract_ref: Option<String>,
}
