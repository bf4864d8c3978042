use std::str::FromStr;

use crate::error::ModelError;
use uuid::Uuid;

/// Strongly typed ID for election registry records (local, off-chain).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, serde::Serialize, serde::Deserialize,
)]
pub struct ElectionId(pub Uuid);

/// Strongly typed ID for candidate roster rows.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, serde::Serialize, serde::Deserialize,
)]
pub struct CandidateId(pub Uuid);

/// Strongly typed ID for voter roster rows.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, serde::Serialize, serde::Deserialize,
)]
pub struct VoterId(pub Uuid);

/// Strongly typed ID for archived result records.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, serde::Serialize, serde::Deserialize,
)]
pub struct ArchiveId(pub Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            pub fn new() -> Self {
                $name(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                $name(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(ElectionId);
uuid_id!(CandidateId);
uuid_id!(VoterId);
uuid_id!(ArchiveId);

/// Numeric election identifier assigned by the ledger at on-chain creation.
///
/// Immutable once attached to a registry record; the archive store is keyed
/// by it because the registry record itself does not survive teardown.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LedgerElectionId(pub i64);

impl LedgerElectionId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for LedgerElectionId {
    fn from(value: i64) -> Self {
        LedgerElectionId(value)
    }
}

impl std::fmt::Display for LedgerElectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LedgerElectionId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(LedgerElectionId)
            .map_err(|_| ModelError::InvalidId(format!("not a numeric election id: {s:?}")))
    }
}
