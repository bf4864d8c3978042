//! Core data model definitions shared across scrutin crates.
#![allow(missing_docs)]

pub mod archive;
pub mod election;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod results;
pub mod rosters;
pub mod windows;

// Re-exports for downstream consumers.
pub use archive::{ArchivedElection, NewArchivedElection};
pub use election::Election;
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ArchiveId, CandidateId, ElectionId, LedgerElectionId, VoterId};
pub use ledger::{CreatedElection, GatewayStatus, LedgerReceipt, LedgerResults, PositionSummary};
pub use results::{CandidateTally, CategoryResult};
pub use rosters::{Candidate, CandidateStatus, Voter};
pub use windows::ElectionWindows;
