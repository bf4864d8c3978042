//! Per-category result records as archived after an election completes.

/// One candidate's final tally within a category.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CandidateTally {
    pub name: String,
    pub votes: u64,
}

impl CandidateTally {
    pub fn new(name: impl Into<String>, votes: u64) -> Self {
        CandidateTally {
            name: name.into(),
            votes,
        }
    }
}

/// Final standings for one ballot category (position).
///
/// `winners` holds every candidate at the category maximum, so a tie yields
/// multiple names. A category where nobody received a vote has no winners,
/// and a category with no candidates at all is valid and empty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub candidates: Vec<CandidateTally>,
    pub winners: Vec<String>,
}

impl CategoryResult {
    /// Builds a category result from raw tallies, applying the winner rule.
    pub fn from_tallies(category: impl Into<String>, candidates: Vec<CandidateTally>) -> Self {
        let max_votes = candidates.iter().map(|c| c.votes).max().unwrap_or(0);
        let winners = if max_votes == 0 {
            Vec::new()
        } else {
            candidates
                .iter()
                .filter(|c| c.votes == max_votes)
                .map(|c| c.name.clone())
                .collect()
        };
        CategoryResult {
            category: category.into(),
            candidates,
            winners,
        }
    }

    pub fn empty(category: impl Into<String>) -> Self {
        CategoryResult {
            category: category.into(),
            candidates: Vec::new(),
            winners: Vec::new(),
        }
    }
}
