use chrono::{DateTime, Utc};

use crate::error::{ModelError, Result};

/// The two phases of an election cycle: a registration window followed by a
/// voting window. All four instants are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionWindows {
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub voting_start: DateTime<Utc>,
    pub voting_end: DateTime<Utc>,
}

impl ElectionWindows {
    /// Validates the strict ordering invariant and, because windows are only
    /// ever created for upcoming elections, that every instant lies in the
    /// future relative to `now`.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<()> {
        if self.registration_start <= now
            || self.registration_end <= now
            || self.voting_start <= now
            || self.voting_end <= now
        {
            return Err(ModelError::InvalidWindows(
                "all dates must be in the future".into(),
            ));
        }
        if self.registration_start >= self.registration_end {
            return Err(ModelError::InvalidWindows(
                "registration start must be before registration end".into(),
            ));
        }
        if self.voting_start <= self.registration_end {
            return Err(ModelError::InvalidWindows(
                "voting must start after registration ends".into(),
            ));
        }
        if self.voting_start >= self.voting_end {
            return Err(ModelError::InvalidWindows(
                "voting start must be before voting end".into(),
            ));
        }
        Ok(())
    }

    /// True once the voting window lies strictly in the past.
    pub fn voting_closed(&self, at: DateTime<Utc>) -> bool {
        self.voting_end < at
    }

    pub fn voting_open(&self, at: DateTime<Utc>) -> bool {
        self.voting_start <= at && at <= self.voting_end
    }

    pub fn registration_open(&self, at: DateTime<Utc>) -> bool {
        self.registration_start <= at && at <= self.registration_end
    }
}
