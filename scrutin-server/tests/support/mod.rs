//! In-memory doubles behind the HTTP tests. No database and no gateway
//! process: the router is exercised end to end over fakes wired into
//! [`AppState`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use scrutin_core::database::{
    ArchiveRepository, CandidateRepository, ElectionRepository, NewElection, VoterRepository,
};
use scrutin_core::ledger::{LedgerClient, LedgerError, LedgerResult};
use scrutin_core::lifecycle::LifecycleService;
use scrutin_core::uploads::CandidateMediaStore;
use scrutin_core::{ElectionError, Result};
use scrutin_model::{
    ArchiveId, ArchivedElection, Candidate, CandidateId, CandidateStatus, CreatedElection,
    Election, ElectionId, ElectionWindows, GatewayStatus, LedgerElectionId, LedgerReceipt,
    LedgerResults, NewArchivedElection, Voter, VoterId,
};
use scrutin_server::AppState;
use scrutin_server::infra::config::{Config, SweepEnvConfig};
use scrutin_server::routes::create_app;

#[derive(Default)]
pub struct FakeElections {
    record: Mutex<Option<Election>>,
}

impl FakeElections {
    pub fn seed(&self, election: Election) {
        *self.record.lock().unwrap() = Some(election);
    }

    pub fn stored(&self) -> Option<Election> {
        self.record.lock().unwrap().clone()
    }
}

#[async_trait]
impl ElectionRepository for FakeElections {
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
                if let Some(contract) = contract_ref {
                    e.ledger_contract_ref = Some(contract.to_string());
                }
                Ok(())
            }
            _ => Err(ElectionError::NotFound(format!(
                "no election record with id {id}"
            ))),
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
            return Ok(true);
        }
        Ok(false)
    }

    async fn remove_all(&self) -> Result<u64> {
        Ok(if self.record.lock().unwrap().take().is_some() {
            1
        } else {
            0
        })
    }
}

#[derive(Default)]
pub struct FakeCandidates {
    rows: Mutex<Vec<Candidate>>,
}

impl FakeCandidates {
    pub fn seed(&self, candidate: Candidate) {
        self.rows.lock().unwrap().push(candidate);
    }

    pub fn remaining(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl CandidateRepository for FakeCandidates {
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
pub struct FakeVoters {
    rows: Mutex<Vec<Voter>>,
}

impl FakeVoters {
    pub fn seed(&self, voter: Voter) {
        self.rows.lock().unwrap().push(voter);
    }

    pub fn remaining(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl VoterRepository for FakeVoters {
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

#[derive(Default)]
pub struct FakeArchives {
    rows: Mutex<Vec<ArchivedElection>>,
}

impl FakeArchives {
    pub fn seed(&self, archive: ArchivedElection) {
        self.rows.lock().unwrap().push(archive);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ArchiveRepository for FakeArchives {
    async fn insert(&self, new: NewArchivedElection) -> Result<ArchivedElection> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter()
            .find(|a| a.ledger_election_id == new.ledger_election_id)
        {
            return Ok(existing.clone());
        }
        let archive = ArchivedElection {
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
        rows.push(archive.clone());
        Ok(archive)
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

#[derive(Default)]
struct FakeLedgerState {
    next_election_id: i64,
    completed: HashSet<i64>,
    votes: HashMap<(i64, i64), u64>,
    positions: Vec<String>,
    deactivated_batches: Vec<Vec<String>>,
    connected: bool,
}

/// Stateful ledger double: hands out sequential election ids, tracks the
/// completion flag per election, and records deactivation batches.
pub struct FakeLedger {
    state: Mutex<FakeLedgerState>,
}

impl FakeLedger {
    pub fn new(positions: &[&str]) -> Self {
        FakeLedger {
            state: Mutex::new(FakeLedgerState {
                next_election_id: 1,
                positions: positions.iter().map(|p| p.to_string()).collect(),
                connected: true,
                ..FakeLedgerState::default()
            }),
        }
    }

    pub fn seed_votes(&self, election: i64, candidate: i64, votes: u64) {
        self.state
            .lock()
            .unwrap()
            .votes
            .insert((election, candidate), votes);
    }

    pub fn set_completed(&self, election: i64) {
        self.state.lock().unwrap().completed.insert(election);
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().unwrap().connected = connected;
    }

    pub fn is_completed(&self, election: i64) -> bool {
        self.state.lock().unwrap().completed.contains(&election)
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
        let id = state.next_election_id;
        state.next_election_id += 1;
        Ok(CreatedElection {
            ledger_election_id: LedgerElectionId(id),
            transaction_hash: format!("0xcreate{id}"),
        })
    }

    async fn complete_election(&self, election: LedgerElectionId) -> LedgerResult<LedgerReceipt> {
        let mut state = self.state.lock().unwrap();
        if !state.completed.insert(election.value()) {
            return Err(LedgerError::AlreadyCompleted);
        }
        Ok(LedgerReceipt {
            transaction_hash: format!("0xcomplete{}", election.value()),
        })
    }

    async fn election_results(&self, election: LedgerElectionId) -> LedgerResult<LedgerResults> {
        let state = self.state.lock().unwrap();
        if !state.completed.contains(&election.value()) {
            return Err(LedgerError::NotCompleted);
        }
        Ok(LedgerResults::empty())
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
        state.deactivated_batches.push(addresses.to_vec());
        Ok(LedgerReceipt {
            transaction_hash: format!("0xdeactivate{}", state.deactivated_batches.len()),
        })
    }

    async fn status(&self) -> GatewayStatus {
        let state = self.state.lock().unwrap();
        GatewayStatus {
            connected: state.connected,
            contract_ref: state.connected.then(|| "0xfacade".to_string()),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub elections: Arc<FakeElections>,
    pub candidates: Arc<FakeCandidates>,
    pub voters: Arc<FakeVoters>,
    pub archives: Arc<FakeArchives>,
    pub ledger: Arc<FakeLedger>,
    _upload_dir: TempDir,
}

pub fn build_test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().expect("create upload dir");

    let elections = Arc::new(FakeElections::default());
    let candidates = Arc::new(FakeCandidates::default());
    let voters = Arc::new(FakeVoters::default());
    let archives = Arc::new(FakeArchives::default());
    let ledger = Arc::new(FakeLedger::new(&["President", "Secretary"]));
    let media = Arc::new(CandidateMediaStore::new(upload_dir.path()));

    let lifecycle = Arc::new(LifecycleService::new(
        elections.clone(),
        candidates.clone(),
        voters.clone(),
        archives.clone(),
        ledger.clone(),
        media,
        Some("0xfacade".to_string()),
    ));

    let config = Arc::new(Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: None,
        ledger_gateway_url: "http://ledger.invalid".to_string(),
        contract_address: Some("0xfacade".to_string()),
        ledger_timeout: Duration::from_secs(5),
        upload_dir: upload_dir.path().to_path_buf(),
        cors_allowed_origins: Vec::new(),
        dev_mode: true,
        sweeps: SweepEnvConfig::default(),
    });

    let state = AppState::new(
        config,
        lifecycle,
        elections.clone(),
        candidates.clone(),
        archives.clone(),
        ledger.clone(),
    );

    let server = TestServer::new(create_app(state)).expect("build test server");

    TestApp {
        server,
        elections,
        candidates,
        voters,
        archives,
        ledger,
        _upload_dir: upload_dir,
    }
}

pub fn closed_windows() -> ElectionWindows {
    let now = Utc::now();
    ElectionWindows {
        registration_start: now - chrono::Duration::days(10),
        registration_end: now - chrono::Duration::days(7),
        voting_start: now - chrono::Duration::days(3),
        voting_end: now - chrono::Duration::hours(1),
    }
}

pub fn open_windows() -> ElectionWindows {
    let now = Utc::now();
    ElectionWindows {
        registration_start: now - chrono::Duration::days(7),
        registration_end: now - chrono::Duration::days(3),
        voting_start: now - chrono::Duration::hours(1),
        voting_end: now + chrono::Duration::days(1),
    }
}

pub fn future_windows() -> ElectionWindows {
    let now = Utc::now();
    ElectionWindows {
        registration_start: now + chrono::Duration::hours(1),
        registration_end: now + chrono::Duration::days(1),
        voting_start: now + chrono::Duration::days(2),
        voting_end: now + chrono::Duration::days(3),
    }
}

/// A ledger-backed registry record whose voting window already closed.
pub fn retired_election(ledger_id: i64) -> Election {
    Election {
        id: ElectionId::new(),
        title: format!("Student Council {ledger_id}"),
        windows: closed_windows(),
        ledger_election_id: Some(LedgerElectionId(ledger_id)),
        ledger_created: true,
        ledger_contract_ref: Some("0xfacade".to_string()),
        created_at: Utc::now() - chrono::Duration::days(12),
    }
}

pub fn approved_candidate(name: &str, position: &str, ledger_candidate_id: i64) -> Candidate {
    Candidate {
        id: CandidateId::new(),
        name: name.to_string(),
        email: format!("{}@example.edu", name.to_lowercase()),
        position: position.to_string(),
        status: CandidateStatus::Approved,
        ledger_candidate_id: Some(ledger_candidate_id),
        wallet_address: Some(format!("0x{ledger_candidate_id:040x}")),
        photo_path: None,
        created_at: Utc::now(),
    }
}

pub fn voter(n: usize) -> Voter {
    Voter {
        id: VoterId::new(),
        full_name: format!("Voter {n}"),
        email: format!("voter{n}@example.edu"),
        wallet_address: Some(format!("0x{n:040x}")),
        ledger_registered: true,
        created_at: Utc::now(),
    }
}

/// A pre-existing archive row for seeding read-path tests.
pub fn archived(ledger_id: i64, title: &str) -> ArchivedElection {
    let windows = closed_windows();
    ArchivedElection {
        id: ArchiveId::new(),
        ledger_election_id: LedgerElectionId(ledger_id),
        title: title.to_string(),
        registration_start: Some(windows.registration_start),
        registration_end: Some(windows.registration_end),
        voting_start: Some(windows.voting_start),
        voting_end: Some(windows.voting_end),
        archived_at: Utc::now(),
        results: Vec::new(),
        ledger_contract_ref: Some("0xfacade".to_string()),
    }
}
