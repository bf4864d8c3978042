//! In-memory doubles for the lifecycle tests: repositories over mutexed
//! state and a stateful fake ledger that withholds results until the
//! election has been completed, mirroring the gateway contract.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use scrutin_core::database::ports::{
    ArchiveRepository, CandidateRepository, ElectionRepository, NewElection, VoterRepository,
};
use scrutin_core::error::{ElectionError, Result};
use scrutin_core::ledger::{LedgerClient, LedgerError, LedgerResult};
use scrutin_core::lifecycle::LifecycleService;
use scrutin_core::uploads::CandidateMediaStore;
use scrutin_model::{
    ArchiveId, ArchivedElection, Candidate, CandidateId, CandidateStatus, CreatedElection,
    Election, ElectionId, ElectionWindows, LedgerElectionId, LedgerReceipt, LedgerResults,
    NewArchivedElection, Voter, VoterId,
};
use tempfile::TempDir;

// --- election registry fake ---------------------------------------------

#[derive(Default)]
pub struct InMemoryElections {
    record: Mutex<Option<Election>>,
}

impl InMemoryElections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, election: Election) {
        *self.record.lock().unwrap() = Some(election);
    }

    pub fn stored(&self) -> Option<Election> {
        self.record.lock().unwrap().clone()
    }
}

#[async_trait]
impl ElectionRepository for InMemoryElections {
    async fn replace_current(&self, new: NewElection) -> Result<Election> {
        let election = Election {
            id: ElectionId::new(),
            title: new.title,
            windows: new.windows,
            ledger_election_id: None,
            ledger_created: false,
            ledger_contract_ref: new.ledger_contract_ref,
            created_at: Utc::now(),
        };
        *self.record.lock().unwrap() = Some(election.clone());
        Ok(election)
    }

    async fn current(&self) -> Result<Option<Election>> {
        Ok(self.record.lock().unwrap().clone())
    }

    async fn find_by_ledger_id(&self, ledger: LedgerElectionId) -> Result<Option<Election>> {
        Ok(self
            .record
            .lock()
            .unwrap()
            .clone()
            .filter(|e| e.ledger_election_id == Some(ledger)))
    }

    async fn attach_ledger_election(
        &self,
        id: ElectionId,
        ledger: LedgerElectionId,
        contract_ref: Option<&str>,
    ) -> Result<()> {
        let mut guard = self.record.lock().unwrap();
        match guard.as_mut() {
            Some(e) if e.id == id => {
                if e.ledger_election_id.is_some() {
                    return Err(ElectionError::Validation(
                        "ledger election id is already attached and immutable".into(),
                    ));
                }
                e.ledger_election_id = Some(ledger);
                e.ledger_created = true;
                if let Some(c) = contract_ref {
                    e.ledger_contract_ref = Some(c.to_owned());
                }
                Ok(())
            }
            _ => Err(ElectionError::NotFound(format!("election {id}"))),
        }
    }

    async fn due_for_retirement(&self, now: DateTime<Utc>) -> Result<Vec<Election>> {
        Ok(self
            .record
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.due_for_retirement(now))
            .cloned()
            .collect())
    }

    async fn remove(&self, id: ElectionId) -> Result<bool> {
        let mut guard = self.record.lock().unwrap();
        if guard.as_ref().is_some_and(|e| e.id == id) {
            *guard = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn remove_all(&self) -> Result<u64> {
        let mut guard = self.record.lock().unwrap();
        let deleted = u64::from(guard.is_some());
        *guard = None;
        Ok(deleted)
    }
}

// --- roster fakes -------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCandidates {
    rows: Mutex<Vec<Candidate>>,
}

impl InMemoryCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, candidate: Candidate) {
        self.rows.lock().unwrap().push(candidate);
    }

    pub fn remaining(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl CandidateRepository for InMemoryCandidates {
    async fn approved_for_position(&self, position: &str) -> Result<Vec<Candidate>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.status == CandidateStatus::Approved && c.position == position)
            .cloned()
            .collect())
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let deleted = rows.len() as u64;
        rows.clear();
        Ok(deleted)
    }
}

#[derive(Default)]
pub struct InMemoryVoters {
    rows: Mutex<Vec<Voter>>,
}

impl InMemoryVoters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, voter: Voter) {
        self.rows.lock().unwrap().push(voter);
    }

    pub fn remaining(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl VoterRepository for InMemoryVoters {
    async fn wallet_addresses(&self) -> Result<Vec<String>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter_map(|v| v.wallet_address.clone())
            .collect())
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let deleted = rows.len() as u64;
        rows.clear();
        Ok(deleted)
    }
}

// --- archive fake -------------------------------------------------------

/// Append-only archive store with a switch that makes inserts fail, for
/// exercising the commit-point gating.
#[derive(Default)]
pub struct InMemoryArchives {
    rows: Mutex<Vec<ArchivedElection>>,
    fail_inserts: AtomicBool,
}

impl InMemoryArchives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ArchiveRepository for InMemoryArchives {
    async fn insert(&self, new: NewArchivedElection) -> Result<ArchivedElection> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(ElectionError::Database("archive insert refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter()
            .find(|a| a.ledger_election_id == new.ledger_election_id)
        {
            return Ok(existing.clone());
        }
        let stored = ArchivedElection {
            id: ArchiveId::new(),
            ledger_election_id: new.ledger_election_id,
            title: new.title,
            registration_start: new.registration_start,
            registration_end: new.registration_end,
            voting_start: new.voting_start,
            voting_end: new.voting_end,
            archived_at: Utc::now(),
            results: new.results,
            ledger_contract_ref: new.ledger_contract_ref,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_ledger_id(
        &self,
        ledger: LedgerElectionId,
    ) -> Result<Option<ArchivedElection>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.ledger_election_id == ledger)
            .cloned())
    }

    async fn find_by_id(&self, id: ArchiveId) -> Result<Option<ArchivedElection>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_recent(&self) -> Result<Vec<ArchivedElection>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        Ok(rows)
    }

    async fn latest(&self) -> Result<Option<ArchivedElection>> {
        Ok(self.list_recent().await?.into_iter().next())
    }
}

// --- fake ledger --------------------------------------------------------

#[derive(Default)]
struct FakeLedgerState {
    next_election_id: i64,
    completed: HashSet<i64>,
    votes: HashMap<(i64, i64), u64>,
    positions: Vec<String>,
    summaries: HashMap<i64, LedgerResults>,
    complete_calls: u32,
    deactivated_batches: Vec<Vec<String>>,
    fail_create: bool,
    fail_complete: bool,
    fail_deactivate: bool,
}

/// Fake gateway that enforces the real contract: results are rejected with
/// `NotCompleted` until `complete_election` has taken effect, and a second
/// completion attempt is rejected with `AlreadyCompleted`.
#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<FakeLedgerState>,
}

impl FakeLedger {
    pub fn new(positions: &[&str]) -> Self {
        let ledger = Self::default();
        {
            let mut state = ledger.state.lock().unwrap();
            state.next_election_id = 1;
            state.positions = positions.iter().map(|p| (*p).to_owned()).collect();
        }
        ledger
    }

    pub fn seed_votes(&self, election: LedgerElectionId, candidate: i64, votes: u64) {
        self.state
            .lock()
            .unwrap()
            .votes
            .insert((election.value(), candidate), votes);
    }

    pub fn set_completed(&self, election: LedgerElectionId) {
        self.state.lock().unwrap().completed.insert(election.value());
    }

    pub fn set_summary(&self, election: LedgerElectionId, summary: LedgerResults) {
        self.state
            .lock()
            .unwrap()
            .summaries
            .insert(election.value(), summary);
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }

    pub fn set_fail_complete(&self, fail: bool) {
        self.state.lock().unwrap().fail_complete = fail;
    }

    pub fn set_fail_deactivate(&self, fail: bool) {
        self.state.lock().unwrap().fail_deactivate = fail;
    }

    pub fn is_completed(&self, election: LedgerElectionId) -> bool {
        self.state
            .lock()
            .unwrap()
            .completed
            .contains(&election.value())
    }

    pub fn complete_calls(&self) -> u32 {
        self.state.lock().unwrap().complete_calls
    }

    pub fn deactivated_batches(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().deactivated_batches.clone()
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn create_election(
        &self,
        _title: &str,
        _description: &str,
        _voting_start: DateTime<Utc>,
        _voting_end: DateTime<Utc>,
    ) -> LedgerResult<CreatedElection> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(LedgerError::Rejected("election creation reverted".into()));
        }
        let id = state.next_election_id;
        state.next_election_id += 1;
        Ok(CreatedElection {
            ledger_election_id: LedgerElectionId(id),
            transaction_hash: format!("0xcreate{id}"),
        })
    }

    async fn complete_election(
        &self,
        election: LedgerElectionId,
    ) -> LedgerResult<LedgerReceipt> {
        let mut state = self.state.lock().unwrap();
        state.complete_calls += 1;
        if state.fail_complete {
            return Err(LedgerError::Rejected("completion reverted".into()));
        }
        if !state.completed.insert(election.value()) {
            return Err(LedgerError::AlreadyCompleted);
        }
        Ok(LedgerReceipt {
            transaction_hash: format!("0xcomplete{}", election.value()),
        })
    }

    async fn election_results(
        &self,
        election: LedgerElectionId,
    ) -> LedgerResult<LedgerResults> {
        let state = self.state.lock().unwrap();
        if !state.completed.contains(&election.value()) {
            return Err(LedgerError::NotCompleted);
        }
        Ok(state
            .summaries
            .get(&election.value())
            .cloned()
            .unwrap_or_else(LedgerResults::empty))
    }

    async fn positions(&self) -> LedgerResult<Vec<String>> {
        Ok(self.state.lock().unwrap().positions.clone())
    }

    async fn candidate_votes(
        &self,
        election: LedgerElectionId,
        candidate: i64,
    ) -> LedgerResult<u64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .get(&(election.value(), candidate))
            .copied()
            .unwrap_or(0))
    }

    async fn deactivate_voters(&self, addresses: &[String]) -> LedgerResult<LedgerReceipt> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deactivate {
            return Err(LedgerError::Rejected("voter deactivation reverted".into()));
        }
        state.deactivated_batches.push(addresses.to_vec());
        Ok(LedgerReceipt {
            transaction_hash: format!("0xdeactivate{}", state.deactivated_batches.len()),
        })
    }
}

// --- harness ------------------------------------------------------------

pub struct TestHarness {
    pub elections: Arc<InMemoryElections>,
    pub candidates: Arc<InMemoryCandidates>,
    pub voters: Arc<InMemoryVoters>,
    pub archives: Arc<InMemoryArchives>,
    pub ledger: Arc<FakeLedger>,
    pub media: Arc<CandidateMediaStore>,
    pub service: LifecycleService,
    _media_dir: TempDir,
}

pub fn harness(positions: &[&str]) -> TestHarness {
    let elections = Arc::new(InMemoryElections::new());
    let candidates = Arc::new(InMemoryCandidates::new());
    let voters = Arc::new(InMemoryVoters::new());
    let archives = Arc::new(InMemoryArchives::new());
    let ledger = Arc::new(FakeLedger::new(positions));
    let media_dir = tempfile::tempdir().expect("create media tempdir");
    let media = Arc::new(CandidateMediaStore::new(media_dir.path()));

    let service = LifecycleService::new(
        elections.clone(),
        candidates.clone(),
        voters.clone(),
        archives.clone(),
        ledger.clone(),
        media.clone(),
        Some("0xfacade".into()),
    );

    TestHarness {
        elections,
        candidates,
        voters,
        archives,
        ledger,
        media,
        service,
        _media_dir: media_dir,
    }
}

// --- fixtures -----------------------------------------------------------

/// Windows whose voting phase closed an hour ago.
pub fn closed_windows() -> ElectionWindows {
    let now = Utc::now();
    ElectionWindows {
        registration_start: now - Duration::days(10),
        registration_end: now - Duration::days(8),
        voting_start: now - Duration::days(7),
        voting_end: now - Duration::hours(1),
    }
}

/// Windows entirely in the future, valid for creation.
pub fn future_windows() -> ElectionWindows {
    let now = Utc::now();
    ElectionWindows {
        registration_start: now + Duration::hours(1),
        registration_end: now + Duration::hours(2),
        voting_start: now + Duration::hours(3),
        voting_end: now + Duration::hours(4),
    }
}

/// A registry record already provisioned on-chain, voting closed.
pub fn retired_election(ledger_id: i64) -> Election {
    Election {
        id: ElectionId::new(),
        title: format!("Student Council {ledger_id}"),
        windows: closed_windows(),
        ledger_election_id: Some(LedgerElectionId(ledger_id)),
        ledger_created: true,
        ledger_contract_ref: Some("0xfacade".into()),
        created_at: Utc::now() - Duration::days(12),
    }
}

pub fn approved_candidate(name: &str, position: &str, ledger_candidate_id: Option<i64>) -> Candidate {
    Candidate {
        id: CandidateId::new(),
        name: name.to_owned(),
        email: format!("{}@campus.test", name.to_lowercase().replace(' ', ".")),
        position: position.to_owned(),
        status: CandidateStatus::Approved,
        ledger_candidate_id,
        wallet_address: Some(format!("0x{name:0>8}")),
        photo_path: None,
        created_at: Utc::now(),
    }
}

pub fn voter(n: usize) -> Voter {
    Voter {
        id: VoterId::new(),
        full_name: format!("Voter {n}"),
        email: format!("voter{n}@campus.test"),
        wallet_address: Some(format!("0xv{n:06}")),
        ledger_registered: true,
        created_at: Utc::now(),
    }
}
