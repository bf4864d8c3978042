//! The lifecycle orchestrator. Owns every transition of an election from
//! registry creation through on-chain completion, archival and teardown.
//!
//! The global ordering invariant lives here: voting closes, completion is
//! confirmed on the ledger, the archive row is written, and only then does
//! mutable working state (registry record, rosters, media) get deleted. The
//! archive write is the commit point; everything after it is tolerated to
//! fail and everything before it leaves the mirror untouched.

use std::sync::Arc;

use chrono::Utc;
use scrutin_model::{
    ArchivedElection, CategoryResult, Election, LedgerElectionId, LedgerReceipt,
    NewArchivedElection,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::database::ports::{
    ArchiveRepository, CandidateRepository, ElectionRepository, NewElection, VoterRepository,
};
use crate::error::{ElectionError, Result};
use crate::ledger::{LedgerClient, LedgerError};
use crate::lifecycle::results::{compute_roster_results, results_from_summary};
use crate::uploads::CandidateMediaStore;

/// Voter wallets are deactivated in fixed-size batches so a single oversized
/// transaction cannot exceed the gateway's gas ceiling.
const DEACTIVATION_BATCH: usize = 50;

/// Title recorded on a minimal archive, written when the registry record was
/// lost before archival could run.
const FALLBACK_ARCHIVE_TITLE: &str = "Election (archived)";

/// Outcome of the completion gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The ledger already reported the election as completed.
    AlreadyCompleted,
    /// This pass flipped the completion flag.
    CompletedNow { transaction_hash: String },
}

/// Row counts reported by the admin reset endpoint. Archive rows are absent
/// on purpose: reset never touches the archive store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetReport {
    pub elections_deleted: u64,
    pub candidates_deleted: u64,
    pub voters_deleted: u64,
}

/// Orchestrates the election lifecycle across the ledger gateway and the
/// off-chain mirror. Cheap to clone behind [`Arc`]; all state lives in the
/// injected collaborators.
pub struct LifecycleService {
    elections: Arc<dyn ElectionRepository>,
    candidates: Arc<dyn CandidateRepository>,
    voters: Arc<dyn VoterRepository>,
    archives: Arc<dyn ArchiveRepository>,
    ledger: Arc<dyn LedgerClient>,
    media: Arc<CandidateMediaStore>,
    /// Contract reference stamped onto registry and archive rows when the
    /// record itself carries none (minimal archives in particular).
    default_contract_ref: Option<String>,
}

impl std::fmt::Debug for LifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleService")
            .field("media", &self.media)
            .field("default_contract_ref", &self.default_contract_ref)
            .finish_non_exhaustive()
    }
}

impl LifecycleService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        elections: Arc<dyn ElectionRepository>,
        candidates: Arc<dyn CandidateRepository>,
        voters: Arc<dyn VoterRepository>,
        archives: Arc<dyn ArchiveRepository>,
        ledger: Arc<dyn LedgerClient>,
        media: Arc<CandidateMediaStore>,
        default_contract_ref: Option<String>,
    ) -> Self {
        Self {
            elections,
            candidates,
            voters,
            archives,
            ledger,
            media,
            default_contract_ref,
        }
    }

    /// Registers a new election cycle: validates the windows, swaps the
    /// registry record, provisions the election on-chain and attaches the
    /// resulting ledger id. On-chain failure rolls the fresh record back so
    /// the admin can simply retry.
    pub async fn create_election(
        &self,
        title: String,
        windows: scrutin_model::ElectionWindows,
    ) -> Result<Election> {
        windows.validate_at(Utc::now())?;

        let record = self
            .elections
            .replace_current(NewElection {
                title: title.clone(),
                windows,
                ledger_contract_ref: self.default_contract_ref.clone(),
            })
            .await?;

        let description = format!("{title} - College Election");
        let created = match self
            .ledger
            .create_election(&title, &description, windows.voting_start, windows.voting_end)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                warn!(
                    "On-chain provisioning for '{}' failed, rolling back registry record: {}",
                    title, e
                );
                if let Err(rollback) = self.elections.remove(record.id).await {
                    warn!("Rollback of registry record {} failed: {}", record.id, rollback);
                }
                return Err(e.into());
            }
        };

        self.elections
            .attach_ledger_election(
                record.id,
                created.ledger_election_id,
                self.default_contract_ref.as_deref(),
            )
            .await?;
        info!(
            "Created election '{}' as ledger election {} (tx {})",
            title, created.ledger_election_id, created.transaction_hash
        );

        self.elections.current().await?.ok_or_else(|| {
            ElectionError::Internal("registry record vanished right after creation".into())
        })
    }

    /// The live registry record, if one exists.
    pub async fn current_election(&self) -> Result<Option<Election>> {
        self.elections.current().await
    }

    /// Drops the live registry record together with its candidate roster and
    /// uploaded media. Voters survive; the full wipe is [`Self::reset`].
    pub async fn delete_current(&self) -> Result<Election> {
        let record = self.elections.current().await?.ok_or_else(|| {
            ElectionError::NotFound("no election is currently registered".into())
        })?;

        self.elections.remove(record.id).await?;
        let candidates = self.candidates.delete_all().await?;
        let files = self.media.purge().await?;
        info!(
            "Deleted election '{}' with {} candidates and {} media files",
            record.title, candidates, files
        );
        Ok(record)
    }

    /// Completes the election on the ledger right now, without archiving.
    /// Fails with `NotFound` when no registry record carries the ledger id.
    pub async fn complete_now(&self, ledger_id: LedgerElectionId) -> Result<LedgerReceipt> {
        let record = self
            .elections
            .find_by_ledger_id(ledger_id)
            .await?
            .ok_or_else(|| {
                ElectionError::NotFound(format!(
                    "no election registered with ledger id {ledger_id}"
                ))
            })?;

        let receipt = self.ledger.complete_election(ledger_id).await?;
        info!(
            "Completed election '{}' (ledger id {}) on request, tx {}",
            record.title, ledger_id, receipt.transaction_hash
        );
        Ok(receipt)
    }

    /// Live result computation for an election that has not been archived
    /// yet. Tallies come from the ledger, names and categories from the
    /// approved roster.
    pub async fn compute_results(
        &self,
        ledger_id: LedgerElectionId,
    ) -> Result<Vec<CategoryResult>> {
        compute_roster_results(self.ledger.as_ref(), self.candidates.as_ref(), ledger_id).await
    }

    /// The shared archival procedure: completion gate, idempotent archive
    /// write, teardown. Entered by the archival sweep and the archive
    /// endpoint.
    pub async fn archive_and_retire(
        &self,
        ledger_id: LedgerElectionId,
    ) -> Result<ArchivedElection> {
        self.retire(ledger_id, false).await
    }

    /// The admin publish workflow: the archival procedure plus bulk on-chain
    /// voter deactivation between the archive write and teardown. Returns the
    /// archive document, newly written or pre-existing.
    pub async fn publish(&self, ledger_id: LedgerElectionId) -> Result<ArchivedElection> {
        self.retire(ledger_id, true).await
    }

    async fn retire(
        &self,
        ledger_id: LedgerElectionId,
        deactivate_voters: bool,
    ) -> Result<ArchivedElection> {
        if let CompletionStatus::CompletedNow { transaction_hash } =
            self.ensure_completed(ledger_id).await?
        {
            info!(
                "Completed ledger election {} before archiving, tx {}",
                ledger_id, transaction_hash
            );
        }

        let record = self.elections.find_by_ledger_id(ledger_id).await?;

        let archive = match self.archives.find_by_ledger_id(ledger_id).await? {
            Some(existing) => {
                info!(
                    "Archive {} already exists for ledger election {}, reusing it",
                    existing.id, ledger_id
                );
                existing
            }
            None => {
                let new = match &record {
                    Some(election) => self.archive_from_record(ledger_id, election).await?,
                    None => self.minimal_archive(ledger_id).await?,
                };
                // The commit point. A failure here leaves the registry and
                // rosters untouched for the next sweep.
                let stored = self.archives.insert(new).await?;
                info!(
                    "Archived results for ledger election {} as {} ({} categories)",
                    ledger_id,
                    stored.id,
                    stored.results.len()
                );
                stored
            }
        };

        if deactivate_voters {
            self.deactivate_all_voters().await?;
        }

        self.teardown(record).await?;
        Ok(archive)
    }

    /// Confirms on-chain completion, driving it if necessary. The results
    /// call doubles as the probe; `complete_election` is attempted at most
    /// once per pass, and a concurrent completion surfacing as
    /// `AlreadyCompleted` counts as success.
    pub async fn ensure_completed(
        &self,
        ledger_id: LedgerElectionId,
    ) -> Result<CompletionStatus> {
        match self.ledger.election_results(ledger_id).await {
            Ok(_) => Ok(CompletionStatus::AlreadyCompleted),
            Err(LedgerError::NotCompleted) => {
                match self.ledger.complete_election(ledger_id).await {
                    Ok(receipt) => Ok(CompletionStatus::CompletedNow {
                        transaction_hash: receipt.transaction_hash,
                    }),
                    Err(LedgerError::AlreadyCompleted) => Ok(CompletionStatus::AlreadyCompleted),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn archive_from_record(
        &self,
        ledger_id: LedgerElectionId,
        election: &Election,
    ) -> Result<NewArchivedElection> {
        let results = self.compute_results(ledger_id).await?;
        Ok(NewArchivedElection {
            ledger_election_id: ledger_id,
            title: election.title.clone(),
            registration_start: Some(election.windows.registration_start),
            registration_end: Some(election.windows.registration_end),
            voting_start: Some(election.windows.voting_start),
            voting_end: Some(election.windows.voting_end),
            results,
            ledger_contract_ref: election
                .ledger_contract_ref
                .clone()
                .or_else(|| self.default_contract_ref.clone()),
        })
    }

    /// Builds an archive from the ledger's own winner summary when the
    /// registry record is already gone (a crashed earlier run). The results
    /// must still be preserved, so the record carries a placeholder title and
    /// no window instants.
    async fn minimal_archive(&self, ledger_id: LedgerElectionId) -> Result<NewArchivedElection> {
        warn!(
            "Registry record for ledger election {} is missing, archiving from the ledger summary",
            ledger_id
        );
        let summary = self.ledger.election_results(ledger_id).await?;
        Ok(NewArchivedElection {
            ledger_election_id: ledger_id,
            title: FALLBACK_ARCHIVE_TITLE.to_owned(),
            registration_start: None,
            registration_end: None,
            voting_start: None,
            voting_end: None,
            results: results_from_summary(&summary),
            ledger_contract_ref: self.default_contract_ref.clone(),
        })
    }

    /// Deactivates every voter wallet on the ledger in batches. A failed
    /// batch aborts publish before teardown; the archive already written is
    /// never rolled back.
    async fn deactivate_all_voters(&self) -> Result<()> {
        let addresses = self.voters.wallet_addresses().await?;
        if addresses.is_empty() {
            return Ok(());
        }
        info!("Deactivating {} voter wallets on the ledger", addresses.len());
        for batch in addresses.chunks(DEACTIVATION_BATCH) {
            let receipt = self.ledger.deactivate_voters(batch).await?;
            debug!(
                "Deactivated batch of {} voters, tx {}",
                batch.len(),
                receipt.transaction_hash
            );
        }
        Ok(())
    }

    /// Deletes working state after a successful archive write. A failed
    /// registry delete is returned as an error so the next sweep retries it
    /// through the idempotency path; roster and media failures are logged and
    /// tolerated since the archive is already durable.
    async fn teardown(&self, record: Option<Election>) -> Result<()> {
        if let Some(election) = record {
            self.elections.remove(election.id).await?;
            debug!("Removed registry record for '{}'", election.title);
        }

        match self.candidates.delete_all().await {
            Ok(n) => debug!("Cleared {} candidate rows", n),
            Err(e) => warn!("Candidate teardown failed after archiving: {}", e),
        }
        match self.voters.delete_all().await {
            Ok(n) => debug!("Cleared {} voter rows", n),
            Err(e) => warn!("Voter teardown failed after archiving: {}", e),
        }
        match self.media.purge().await {
            Ok(n) => debug!("Purged {} candidate media files", n),
            Err(e) => warn!("Media purge failed after archiving: {}", e),
        }
        Ok(())
    }

    /// Wipes rosters, registry record and uploaded media for the next cycle.
    /// The archive store is deliberately left alone.
    pub async fn reset(&self) -> Result<ResetReport> {
        let candidates_deleted = self.candidates.delete_all().await?;
        let voters_deleted = self.voters.delete_all().await?;
        let elections_deleted = self.elections.remove_all().await?;
        let files = self.media.purge().await?;
        info!(
            "Reset complete: {} elections, {} candidates, {} voters, {} media files removed (archives untouched)",
            elections_deleted, candidates_deleted, voters_deleted, files
        );
        Ok(ResetReport {
            elections_deleted,
            candidates_deleted,
            voters_deleted,
        })
    }

    /// One completion sweep pass: every record whose voting window closed
    /// gets its completion flag confirmed or driven. Never archives, never
    /// deletes; per-record failures are logged and the pass continues.
    pub async fn completion_sweep(&self) -> Result<()> {
        let due = self.elections.due_for_retirement(Utc::now()).await?;
        for election in due {
            let Some(ledger_id) = election.ledger_election_id else {
                continue;
            };
            match self.ensure_completed(ledger_id).await {
                Ok(CompletionStatus::CompletedNow { transaction_hash }) => {
                    info!(
                        "Voting closed for '{}', completed ledger election {} (tx {})",
                        election.title, ledger_id, transaction_hash
                    );
                }
                Ok(CompletionStatus::AlreadyCompleted) => {}
                Err(e) => {
                    error!(
                        "Completion attempt for ledger election {} failed: {}",
                        ledger_id, e
                    );
                }
            }
        }
        Ok(())
    }

    /// One archival sweep pass: runs the full archival procedure for every
    /// due record. Transient failures are deferred to the next tick.
    pub async fn archival_sweep(&self) -> Result<()> {
        let due = self.elections.due_for_retirement(Utc::now()).await?;
        for election in due {
            let Some(ledger_id) = election.ledger_election_id else {
                continue;
            };
            match self.archive_and_retire(ledger_id).await {
                Ok(archive) => {
                    info!(
                        "Retired election '{}' into archive {}",
                        archive.title, archive.id
                    );
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        "Archival of ledger election {} deferred until next sweep: {}",
                        ledger_id, e
                    );
                }
                Err(e) => {
                    error!("Archival of ledger election {} failed: {}", ledger_id, e);
                }
            }
        }
        Ok(())
    }
}
