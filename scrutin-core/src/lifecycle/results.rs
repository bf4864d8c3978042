//! Result computation for the archival pipeline: authoritative tallies from
//! the ledger, names and categories from the approved roster.

use scrutin_model::{CandidateTally, CategoryResult, LedgerElectionId, LedgerResults};

use crate::database::ports::CandidateRepository;
use crate::error::Result;
use crate::ledger::LedgerClient;

/// Computes final standings for every ballot position.
///
/// Positions come from the ledger (the fixed on-chain category list), the
/// candidate list per position from the approved roster, and each tally from
/// the ledger; a candidate that never made it on-chain counts zero votes.
pub async fn compute_roster_results(
    ledger: &dyn LedgerClient,
    candidates: &dyn CandidateRepository,
    election: LedgerElectionId,
) -> Result<Vec<CategoryResult>> {
    let positions = ledger.positions().await?;
    let mut categories = Vec::with_capacity(positions.len());

    for position in positions {
        let roster = candidates.approved_for_position(&position).await?;
        let mut tallies = Vec::with_capacity(roster.len());

        for candidate in roster {
            let votes = match candidate.ledger_candidate_id {
                Some(ledger_candidate) => {
                    ledger.candidate_votes(election, ledger_candidate).await?
                }
                None => 0,
            };
            tallies.push(CandidateTally::new(candidate.name, votes));
        }

        categories.push(CategoryResult::from_tallies(position, tallies));
    }

    Ok(categories)
}

/// Shapes the ledger's own winner summary into category results. Used for
/// the minimal archive written when the roster is already gone, so the
/// records stay uniformly typed even in the degraded path.
pub fn results_from_summary(summary: &LedgerResults) -> Vec<CategoryResult> {
    summary
        .positions
        .iter()
        .map(|p| {
            if p.winner.is_empty() {
                CategoryResult::empty(p.position.clone())
            } else {
                CategoryResult::from_tallies(
                    p.position.clone(),
                    vec![CandidateTally::new(p.winner.clone(), p.winning_votes)],
                )
            }
        })
        .collect()
}
