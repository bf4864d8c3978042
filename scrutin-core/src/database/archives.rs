use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use scrutin_model::{
    ArchiveId, ArchivedElection, CategoryResult, LedgerElectionId, NewArchivedElection,
};

use crate::database::ports::ArchiveRepository;
use crate::error::{ElectionError, Result};

#[derive(Clone, Debug)]
pub struct PostgresArchiveRepository {
    pool: PgPool,
}

impl PostgresArchiveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ArchiveRepository for PostgresArchiveRepository {
    async fn insert(&self, new: NewArchivedElection) -> Result<ArchivedElection> {
        let results = serde_json::to_value(&new.results)?;

        // The unique index on ledger_election_id turns a lost race into a
        // no-op insert; the winner's row is fetched instead of erroring.
        let inserted = sqlx::query_as::<_, ArchiveRow>(
            r#"
            INSERT INTO archived_results (
                id, ledger_election_id, title,
                registration_start, registration_end, voting_start, voting_end,
                results, ledger_contract_ref
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (ledger_election_id) DO NOTHING
            RETURNING
                id, ledger_election_id, title,
                registration_start, registration_end, voting_start, voting_end,
                archived_at, results, ledger_contract_ref
            "#,
        )
        .bind(ArchiveId::new().as_uuid())
        .bind(new.ledger_election_id.value())
        .bind(&new.title)
        .bind(new.registration_start)
        .bind(new.registration_end)
        .bind(new.voting_start)
        .bind(new.voting_end)
        .bind(results)
        .bind(&new.ledger_contract_ref)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to insert archive: {e}")))?;

        if let Some(row) = inserted {
            return map_row(row);
        }

        self.find_by_ledger_id(new.ledger_election_id)
            .await?
            .ok_or_else(|| {
                ElectionError::Internal(format!(
                    "archive for ledger election {} vanished after conflict",
                    new.ledger_election_id
                ))
            })
    }

    async fn find_by_ledger_id(
        &self,
        ledger: LedgerElectionId,
    ) -> Result<Option<ArchivedElection>> {
        let row = sqlx::query_as::<_, ArchiveRow>(
            r#"
            SELECT
                id, ledger_election_id, title,
                registration_start, registration_end, voting_start, voting_end,
                archived_at, results, ledger_contract_ref
            FROM archived_results
            WHERE ledger_election_id = $1
            "#,
        )
        .bind(ledger.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            ElectionError::Database(format!("Failed to find archive by ledger id: {e}"))
        })?;

        row.map(map_row).transpose()
    }

    async fn find_by_id(&self, id: ArchiveId) -> Result<Option<ArchivedElection>> {
        let row = sqlx::query_as::<_, ArchiveRow>(
            r#"
            SELECT
                id, ledger_election_id, title,
                registration_start, registration_end, voting_start, voting_end,
                archived_at, results, ledger_contract_ref
            FROM archived_results
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to find archive: {e}")))?;

        row.map(map_row).transpose()
    }

    async fn list_recent(&self) -> Result<Vec<ArchivedElection>> {
        let rows = sqlx::query_as::<_, ArchiveRow>(
            r#"
            SELECT
                id, ledger_election_id, title,
                registration_start, registration_end, voting_start, voting_end,
                archived_at, results, ledger_contract_ref
            FROM archived_results
            ORDER BY archived_at DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to list archives: {e}")))?;

        rows.into_iter().map(map_row).collect()
    }

    async fn latest(&self) -> Result<Option<ArchivedElection>> {
        let row = sqlx::query_as::<_, ArchiveRow>(
            r#"
            SELECT
                id, ledger_election_id, title,
                registration_start, registration_end, voting_start, voting_end,
                archived_at, results, ledger_contract_ref
            FROM archived_results
            ORDER BY archived_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to load latest archive: {e}")))?;

        row.map(map_row).transpose()
    }
}

// Database row type for archived results
#[derive(sqlx::FromRow)]
struct ArchiveRow {
    id: Uuid,
    ledger_election_id: i64,
    title: String,
    registration_start: Option<DateTime<Utc>>,
    registration_end: Option<DateTime<Utc>>,
    voting_start: Option<DateTime<Utc>>,
    voting_end: Option<DateTime<Utc>>,
    archived_at: DateTime<Utc>,
    results: serde_json::Value,
    ledger_contract_ref: Option<String>,
}

fn map_row(row: ArchiveRow) -> Result<ArchivedElection> {
    let results: Vec<CategoryResult> = serde_json::from_value(row.results)?;

    Ok(ArchivedElection {
        id: ArchiveId(row.id),
        ledger_election_id: LedgerElectionId(row.ledger_election_id),
        title: row.title,
        registration_start: row.registration_start,
        registration_end: row.registration_end,
        voting_start: row.voting_start,
        voting_end: row.voting_end,
        archived_at: row.archived_at,
        results,
        ledger_contract_ref: row.ledger_contract_ref,
    })
}
