use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Error, Debug)]
pub enum ElectionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<scrutin_model::ModelError> for ElectionError {
    fn from(err: scrutin_model::ModelError) -> Self {
        ElectionError::Validation(err.to_string())
    }
}

impl ElectionError {
    /// True for failures worth retrying on a later sweep tick (connectivity,
    /// local store), false for semantic rejections and bad input.
    pub fn is_transient(&self) -> bool {
        match self {
            ElectionError::Ledger(e) => e.is_transient(),
            ElectionError::Database(_) | ElectionError::Io(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ElectionError>;
