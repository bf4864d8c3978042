//! The orchestrator's only window onto the chain: a typed client trait plus
//! the HTTP gateway implementation. The ledger is authoritative for vote
//! counts and the completion flag; everything here treats it as an opaque
//! remote collaborator.

mod http;

pub use http::HttpLedgerClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scrutin_model::{
    CreatedElection, GatewayStatus, LedgerElectionId, LedgerReceipt, LedgerResults,
};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Results were requested before the election was completed on-chain.
    /// Control flow, not a failure: callers respond by driving completion.
    #[error("election not completed yet")]
    NotCompleted,

    /// A duplicate completion attempt. The completion gate treats this as
    /// success.
    #[error("election already completed")]
    AlreadyCompleted,

    /// Any other gateway-reported rejection (revert, unknown id, bad
    /// argument). Not retried within a pass.
    #[error("ledger rejected request: {0}")]
    Rejected(String),

    /// Connectivity or timeout. Retried by the next scheduler tick.
    #[error("ledger transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ledger response parse error: {0}")]
    Parse(String),
}

impl LedgerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Transport(_))
    }

    pub fn is_not_completed(&self) -> bool {
        matches!(self, LedgerError::NotCompleted)
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Remote ledger gateway operations consumed by the lifecycle orchestrator.
///
/// `election_results` doubles as the completion probe: it fails with
/// [`LedgerError::NotCompleted`] until `complete_election` has taken effect.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Provisions the election on-chain and returns its numeric id.
    async fn create_election(
        &self,
        title: &str,
        description: &str,
        voting_start: DateTime<Utc>,
        voting_end: DateTime<Utc>,
    ) -> LedgerResult<CreatedElection>;

    /// Flips the on-chain completion flag. Fails with
    /// [`LedgerError::AlreadyCompleted`] on a duplicate attempt.
    async fn complete_election(&self, election: LedgerElectionId) -> LedgerResult<LedgerReceipt>;

    /// Per-position winner summary; only available after completion.
    async fn election_results(&self, election: LedgerElectionId) -> LedgerResult<LedgerResults>;

    /// The fixed set of ballot positions defined on-chain.
    async fn positions(&self) -> LedgerResult<Vec<String>>;

    /// Authoritative vote count for one candidate.
    async fn candidate_votes(
        &self,
        election: LedgerElectionId,
        candidate: i64,
    ) -> LedgerResult<u64>;

    /// Deactivates a batch of voter wallet addresses.
    async fn deactivate_voters(&self, addresses: &[String]) -> LedgerResult<LedgerReceipt>;

    /// Gateway reachability for health reporting. In-process test doubles
    /// are always "connected".
    async fn status(&self) -> GatewayStatus {
        GatewayStatus {
            connected: true,
            contract_ref: None,
        }
    }
}
