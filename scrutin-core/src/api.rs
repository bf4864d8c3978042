//! Shared API envelope and response shapes for the admin HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scrutin_model::{ArchivedElection, CategoryResult, LedgerElectionId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(error),
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// Results for one election, served archived-first: once an archive exists
/// it always wins over a live computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub ledger_election_id: LedgerElectionId,
    pub title: String,
    pub results: Vec<CategoryResult>,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl ResultsView {
    pub fn from_archive(archive: ArchivedElection) -> Self {
        ResultsView {
            ledger_election_id: archive.ledger_election_id,
            title: archive.title,
            results: archive.results,
            archived: true,
            archived_at: Some(archive.archived_at),
        }
    }

    pub fn live(
        ledger_election_id: LedgerElectionId,
        title: String,
        results: Vec<CategoryResult>,
    ) -> Self {
        ResultsView {
            ledger_election_id,
            title,
            results,
            archived: false,
            archived_at: None,
        }
    }
}
