use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use scrutin_model::{Candidate, CandidateId, CandidateStatus};

use crate::database::ports::{CandidateRepository, VoterRepository};
use crate::error::{ElectionError, Result};

#[derive(Clone, Debug)]
pub struct PostgresCandidateRepository {
    pool: PgPool,
}

impl PostgresCandidateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CandidateRepository for PostgresCandidateRepository {
    async fn approved_for_position(&self, position: &str) -> Result<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT
                id, name, email, position, status,
                ledger_candidate_id, wallet_address, photo_path, created_at
            FROM candidates
            WHERE status = 'approved' AND position = $1
            ORDER BY name
            "#,
        )
        .bind(position)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            ElectionError::Database(format!("Failed to load approved candidates: {e}"))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM candidates")
            .execute(self.pool())
            .await
            .map_err(|e| ElectionError::Database(format!("Failed to delete candidates: {e}")))?;

        Ok(result.rows_affected())
    }
}

#[derive(Clone, Debug)]
pub struct PostgresVoterRepository {
    pool: PgPool,
}

impl PostgresVoterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VoterRepository for PostgresVoterRepository {
    async fn wallet_addresses(&self) -> Result<Vec<String>> {
        let addresses = sqlx::query_scalar::<_, String>(
            r#"
            SELECT wallet_address
            FROM voters
            WHERE wallet_address IS NOT NULL
            ORDER BY created_at
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            ElectionError::Database(format!("Failed to load voter wallet addresses: {e}"))
        })?;

        Ok(addresses)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM voters")
            .execute(self.pool())
            .await
            .map_err(|e| ElectionError::Database(format!("Failed to delete voters: {e}")))?;

        Ok(result.rows_affected())
    }
}

// Database row type for candidate roster entries
#[derive(sqlx::FromRow)]
struct CandidateRow {
    id: Uuid,
    name: String,
    email: String,
    position: String,
    status: String,
    ledger_candidate_id: Option<i64>,
    wallet_address: Option<String>,
    photo_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        let status =
            CandidateStatus::parse(&row.status).unwrap_or(CandidateStatus::Pending);

        Candidate {
            id: CandidateId(row.id),
            name: row.name,
            email: row.email,
            position: row.position,
            status,
            ledger_candidate_id: row.ledger_candidate_id,
            wallet_address: row.wallet_address,
            photo_path: row.photo_path,
            created_at: row.created_at,
        }
    }
}
