use chrono::{DateTime, Utc};

use crate::ids::{ElectionId, LedgerElectionId};
use crate::windows::ElectionWindows;

/// The single live election registry record (off-chain mirror).
///
/// `ledger_election_id` is nullable until on-chain creation succeeds and
/// immutable afterwards; the numeric id is the join key against the ledger
/// and, later, against the archive store.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub id: ElectionId,
    pub title: String,
    #[serde(flatten)]
    pub windows: ElectionWindows,
    pub ledger_election_id: Option<LedgerElectionId>,
    pub ledger_created: bool,
    pub ledger_contract_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Election {
    /// True when the record is eligible for completion/archival sweeps:
    /// on-chain creation succeeded and the voting window has closed.
    pub fn due_for_retirement(&self, at: DateTime<Utc>) -> bool {
        self.ledger_created
            && self.ledger_election_id.is_some()
            && self.windows.voting_closed(at)
    }
}
