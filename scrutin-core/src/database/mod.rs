//! Postgres-backed off-chain mirror: pool management, embedded migrations,
//! and the repository implementations behind the ports.

pub mod archives;
pub mod elections;
pub mod ports;
pub mod rosters;

pub use archives::PostgresArchiveRepository;
pub use elections::PostgresElectionRepository;
pub use ports::{
    ArchiveRepository, CandidateRepository, ElectionRepository, NewElection, VoterRepository,
};
pub use rosters::{PostgresCandidateRepository, PostgresVoterRepository};

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::fmt;
use tracing::info;

use crate::error::{ElectionError, Result};

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
    pub min_idle: u32,
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
    min_connections: u32,
    elections: PostgresElectionRepository,
    candidates: PostgresCandidateRepository,
    voters: PostgresVoterRepository,
    archives: PostgresArchiveRepository,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pool_size = self.pool.size();
        let idle = self.pool.num_idle();

        f.debug_struct("PostgresDatabase")
            .field("pool_size", &pool_size)
            .field("idle_connections", &idle)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(connection_string: &str) -> Result<Self> {
        // Pool configuration from environment or small-service defaults
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(2);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .idle_timeout(std::time::Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| ElectionError::Database(format!("Database connection failed: {e}")))?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            max_connections, min_connections
        );

        let elections = PostgresElectionRepository::new(pool.clone());
        let candidates = PostgresCandidateRepository::new(pool.clone());
        let voters = PostgresVoterRepository::new(pool.clone());
        let archives = PostgresArchiveRepository::new(pool.clone());

        Ok(PostgresDatabase {
            pool,
            max_connections,
            min_connections,
            elections,
            candidates,
            voters,
            archives,
        })
    }

    /// Get a reference to the connection pool for use in extension modules
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn elections(&self) -> &PostgresElectionRepository {
        &self.elections
    }

    pub fn candidates(&self) -> &PostgresCandidateRepository {
        &self.candidates
    }

    pub fn voters(&self) -> &PostgresVoterRepository {
        &self.voters
    }

    pub fn archives(&self) -> &PostgresArchiveRepository {
        &self.archives
    }

    /// Get connection pool statistics for monitoring
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.max_connections,
            min_idle: self.min_connections,
        }
    }

    /// Run the preflight checks without applying migrations.
    pub async fn preflight_only(&self) -> Result<()> {
        self.preflight_check().await
    }

    /// Run migrations after performing a connectivity preflight.
    pub async fn initialize_schema(&self) -> Result<()> {
        self.preflight_check().await?;

        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| ElectionError::Database(format!("Migration failed: {e}")))?;

        Ok(())
    }

    /// Surfaces actionable errors (connectivity, missing CREATE privilege)
    /// before migrations run into them with less helpful messages.
    async fn preflight_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ElectionError::Database(format!("Connectivity preflight failed: {e}")))?;

        let can_create = sqlx::query_scalar::<_, bool>(
            "SELECT has_schema_privilege(current_user, 'public', 'CREATE')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ElectionError::Database(format!("Privilege preflight failed: {e}")))?;

        if !can_create {
            return Err(ElectionError::Database(
                "current role lacks CREATE on schema public; grant it before running migrations"
                    .into(),
            ));
        }

        Ok(())
    }
}
