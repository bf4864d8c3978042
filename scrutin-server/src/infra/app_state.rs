use std::{fmt, sync::Arc};

use scrutin_core::database::{ArchiveRepository, CandidateRepository, ElectionRepository};
use scrutin_core::ledger::LedgerClient;
use scrutin_core::lifecycle::LifecycleService;

use crate::infra::config::Config;

/// Shared state for every handler. Repositories are held as trait objects so
/// the HTTP tests can run against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lifecycle: Arc<LifecycleService>,
    pub elections: Arc<dyn ElectionRepository>,
    pub candidates: Arc<dyn CandidateRepository>,
    pub archives: Arc<dyn ArchiveRepository>,
    pub ledger: Arc<dyn LedgerClient>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        lifecycle: Arc<LifecycleService>,
        elections: Arc<dyn ElectionRepository>,
        candidates: Arc<dyn CandidateRepository>,
        archives: Arc<dyn ArchiveRepository>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            config,
            lifecycle,
            elections,
            candidates,
            archives,
            ledger,
        }
    }
}
