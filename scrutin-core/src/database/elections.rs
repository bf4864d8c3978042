use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use scrutin_model::{Election, ElectionId, ElectionWindows, LedgerElectionId};

use crate::database::ports::{ElectionRepository, NewElection};
use crate::error::{ElectionError, Result};

#[derive(Clone, Debug)]
pub struct PostgresElectionRepository {
    pool: PgPool,
}

impl PostgresElectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ElectionRepository for PostgresElectionRepository {
    async fn replace_current(&self, new: NewElection) -> Result<Election> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| ElectionError::Database(format!("Failed to begin transaction: {e}")))?;

        // The registry holds at most one record; any stale one goes first.
        // The current_election FK clears itself via ON DELETE SET NULL.
        sqlx::query("DELETE FROM elections")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                ElectionError::Database(format!("Failed to clear stale elections: {e}"))
            })?;

        let id = ElectionId::new();
        let row = sqlx::query_as::<_, ElectionRow>(
            r#"
            INSERT INTO elections (
                id, title, registration_start, registration_end,
                voting_start, voting_end, ledger_contract_ref
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, title, registration_start, registration_end,
                voting_start, voting_end, ledger_election_id,
                ledger_created, ledger_contract_ref, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&new.title)
        .bind(new.windows.registration_start)
        .bind(new.windows.registration_end)
        .bind(new.windows.voting_start)
        .bind(new.windows.voting_end)
        .bind(&new.ledger_contract_ref)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to insert election: {e}")))?;

        sqlx::query("UPDATE current_election SET election_id = $1 WHERE slot")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                ElectionError::Database(format!("Failed to point at new election: {e}"))
            })?;

        tx.commit()
            .await
            .map_err(|e| ElectionError::Database(format!("Failed to commit election swap: {e}")))?;

        Ok(row.into())
    }

    async fn current(&self) -> Result<Option<Election>> {
        let row = sqlx::query_as::<_, ElectionRow>(
            r#"
            SELECT
                e.id, e.title, e.registration_start, e.registration_end,
                e.voting_start, e.voting_end, e.ledger_election_id,
                e.ledger_created, e.ledger_contract_ref, e.created_at
            FROM elections e
            JOIN current_election c ON c.election_id = e.id
            WHERE c.slot
            "#,
        )
        .fetch_optional(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to load current election: {e}")))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_ledger_id(&self, ledger: LedgerElectionId) -> Result<Option<Election>> {
        let row = sqlx::query_as::<_, ElectionRow>(
            r#"
            SELECT
                id, title, registration_start, registration_end,
                voting_start, voting_end, ledger_election_id,
                ledger_created, ledger_contract_ref, created_at
            FROM elections
            WHERE ledger_election_id = $1
            "#,
        )
        .bind(ledger.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            ElectionError::Database(format!("Failed to find election by ledger id: {e}"))
        })?;

        Ok(row.map(Into::into))
    }

    async fn attach_ledger_election(
        &self,
        id: ElectionId,
        ledger: LedgerElectionId,
        contract_ref: Option<&str>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE elections
            SET ledger_election_id = $2,
                ledger_created = TRUE,
                ledger_contract_ref = COALESCE($3, ledger_contract_ref)
            WHERE id = $1 AND ledger_election_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(ledger.value())
        .bind(contract_ref)
        .execute(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to attach ledger id: {e}")))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM elections WHERE id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to check election: {e}")))?;

        if exists {
            Err(ElectionError::Validation(
                "ledger election id is already attached and immutable".into(),
            ))
        } else {
            Err(ElectionError::NotFound(format!("election {id}")))
        }
    }

    async fn due_for_retirement(&self, now: DateTime<Utc>) -> Result<Vec<Election>> {
        let rows = sqlx::query_as::<_, ElectionRow>(
            r#"
            SELECT
                id, title, registration_start, registration_end,
                voting_start, voting_end, ledger_election_id,
                ledger_created, ledger_contract_ref, created_at
            FROM elections
            WHERE ledger_created = TRUE
              AND ledger_election_id IS NOT NULL
              AND voting_end < $1
            ORDER BY voting_end
            "#,
        )
        .bind(now)
        .fetch_all(self.pool())
        .await
        .map_err(|e| ElectionError::Database(format!("Failed to list due elections: {e}")))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn remove(&self, id: ElectionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM elections WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| ElectionError::Database(format!("Failed to delete election: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM elections")
            .execute(self.pool())
            .await
            .map_err(|e| ElectionError::Database(format!("Failed to delete elections: {e}")))?;

        Ok(result.rows_affected())
    }
}

// Database row type for the election registry
#[derive(sqlx::FromRow)]
struct ElectionRow {
    id: Uuid,
    title: String,
    registration_start: DateTime<Utc>,
    registration_end: DateTime<Utc>,
    voting_start: DateTime<Utc>,
    voting_end: DateTime<Utc>,
    ledger_election_id: Option<i64>,
    ledger_created: bool,
    ledger_contract_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ElectionRow> for Election {
    fn from(row: ElectionRow) -> Self {
        Election {
            id: ElectionId(row.id),
            title: row.title,
            windows: ElectionWindows {
                registration_start: row.registration_start,
                registration_end: row.registration_end,
                voting_start: row.voting_start,
                voting_end: row.voting_end,
            },
            ledger_election_id: row.ledger_election_id.map(LedgerElectionId),
            ledger_created: row.ledger_created,
            ledger_contract_ref: row.ledger_contract_ref,
            created_at: row.created_at,
        }
    }
}
