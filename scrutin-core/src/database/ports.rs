//! Repository ports over the off-chain mirror. The lifecycle services only
//! ever see these traits; Postgres implementations live beside them and
//! in-memory fakes live with the tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scrutin_model::{
    ArchiveId, ArchivedElection, Candidate, Election, ElectionId, ElectionWindows,
    LedgerElectionId, NewArchivedElection,
};

use crate::error::Result;

/// Input for creating the (single) live registry record. Ledger fields are
/// attached later, once on-chain provisioning succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct NewElection {
    pub title: String,
    pub windows: ElectionWindows,
    pub ledger_contract_ref: Option<String>,
}

/// The election registry: at most one live record, addressed through an
/// explicit current-election reference rather than collection emptiness.
#[async_trait]
pub trait ElectionRepository: Send + Sync {
    /// Atomically replaces whatever record exists with `new` and repoints
    /// the current-election reference at it.
    async fn replace_current(&self, new: NewElection) -> Result<Election>;

    /// The record the current-election reference points at, if any.
    async fn current(&self) -> Result<Option<Election>>;

    async fn find_by_ledger_id(&self, ledger: LedgerElectionId) -> Result<Option<Election>>;

    /// Writes the ledger election id exactly once. Fails if the record is
    /// missing or the id was already attached.
    async fn attach_ledger_election(
        &self,
        id: ElectionId,
        ledger: LedgerElectionId,
        contract_ref: Option<&str>,
    ) -> Result<()>;

    /// Records whose voting window closed before `now` and whose on-chain
    /// creation succeeded: the sweep working set.
    async fn due_for_retirement(&self, now: DateTime<Utc>) -> Result<Vec<Election>>;

    /// Deletes one record (clearing the current-election reference when it
    /// pointed there). Returns whether a row was deleted.
    async fn remove(&self, id: ElectionId) -> Result<bool>;

    /// Deletes every record. Returns the number of rows deleted.
    async fn remove_all(&self) -> Result<u64>;
}

/// Candidate roster reads and teardown. Registration writes happen outside
/// this system.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn approved_for_position(&self, position: &str) -> Result<Vec<Candidate>>;

    async fn delete_all(&self) -> Result<u64>;
}

/// Voter roster reads and teardown.
#[async_trait]
pub trait VoterRepository: Send + Sync {
    /// Wallet addresses of every voter that holds one, for bulk on-chain
    /// deactivation during publish.
    async fn wallet_addresses(&self) -> Result<Vec<String>>;

    async fn delete_all(&self) -> Result<u64>;
}

/// The append-only archive store. No update or delete operations exist.
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Inserts unless a record for the same ledger election id already
    /// exists; either way returns the stored record. First write wins.
    async fn insert(&self, new: NewArchivedElection) -> Result<ArchivedElection>;

    async fn find_by_ledger_id(
        &self,
        ledger: LedgerElectionId,
    ) -> Result<Option<ArchivedElection>>;

    async fn find_by_id(&self, id: ArchiveId) -> Result<Option<ArchivedElection>>;

    /// Every archive record, most recently archived first.
    async fn list_recent(&self) -> Result<Vec<ArchivedElection>>;

    async fn latest(&self) -> Result<Option<ArchivedElection>>;
}
