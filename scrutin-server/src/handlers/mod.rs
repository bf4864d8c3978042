pub mod admin;
pub mod elections;
pub mod health;
pub mod results;

use scrutin_model::LedgerElectionId;

use crate::errors::AppError;

/// Parsed by hand rather than through the path extractor so a non-numeric id
/// yields an explicit 400 instead of a routing-level rejection.
pub(crate) fn parse_ledger_id(raw: &str) -> Result<LedgerElectionId, AppError> {
    raw.parse::<LedgerElectionId>()
        .map_err(|e| AppError::bad_request(e.to_string()))
}
