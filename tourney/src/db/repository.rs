//! Tournament repositories.
//!
//! A tournament is stored whole: roster, bracket topology and ledger state
//! serialize to one JSON document, so a load returns exactly what was saved.

use super::DatabaseConfig;
use crate::tournament::{Tournament, TournamentId};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored state could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage for tournaments
///
/// `save` is called after every successful mutation and may see the same
/// snapshot more than once, so implementations must upsert.
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Load one tournament
    async fn load(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    /// Load every stored tournament, ordered by ID
    async fn load_all(&self) -> StoreResult<Vec<Tournament>>;

    /// Insert or replace a tournament
    async fn save(&self, tournament: &Tournament) -> StoreResult<()>;

    /// Delete a tournament, returning whether it existed
    async fn delete(&self, id: TournamentId) -> StoreResult<bool>;
}

/// PostgreSQL implementation storing each tournament as a JSONB document
pub struct PgTournamentRepository {
    pool: PgPool,
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool sized by `config` and make sure the table exists
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Create the `tournaments` table if it does not exist
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tournaments (
                id BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL,
                organizer TEXT NOT NULL,
                state JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn load(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        let row = sqlx::query("SELECT state FROM tournaments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| serde_json::from_value(r.get::<serde_json::Value, _>("state")))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn load_all(&self) -> StoreResult<Vec<Tournament>> {
        let rows = sqlx::query("SELECT state FROM tournaments ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| serde_json::from_value(r.get::<serde_json::Value, _>("state")).map_err(StoreError::from))
            .collect()
    }

    async fn save(&self, tournament: &Tournament) -> StoreResult<()> {
        let state = serde_json::to_value(tournament)?;
        sqlx::query(
            "INSERT INTO tournaments (id, name, status, organizer, state, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (id) DO UPDATE
             SET name = EXCLUDED.name,
                 status = EXCLUDED.status,
                 state = EXCLUDED.state,
                 updated_at = NOW()",
        )
        .bind(tournament.id)
        .bind(&tournament.config.name)
        .bind(tournament.status.to_string())
        .bind(&tournament.organizer)
        .bind(state)
        .bind(tournament.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: TournamentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-process repository for tests and database-less runs
///
/// Snapshots are kept as JSON so the same encode/decode path as the
/// PostgreSQL store is exercised.
#[derive(Default, Clone)]
pub struct InMemoryTournamentRepository {
    documents: Arc<RwLock<BTreeMap<TournamentId, serde_json::Value>>>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tournaments
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    async fn load(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        let documents = self.documents.read().await;
        documents
            .get(&id)
            .map(|doc| serde_json::from_value(doc.clone()))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn load_all(&self) -> StoreResult<Vec<Tournament>> {
        let documents = self.documents.read().await;
        documents
            .values()
            .map(|doc| serde_json::from_value(doc.clone()).map_err(StoreError::from))
            .collect()
    }

    async fn save(&self, tournament: &Tournament) -> StoreResult<()> {
        let doc = serde_json::to_value(tournament)?;
        self.documents.write().await.insert(tournament.id, doc);
        Ok(())
    }

    async fn delete(&self, id: TournamentId) -> StoreResult<bool> {
        Ok(self.documents.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::NewTeam;
    use crate::tournament::TournamentConfig;
    use chrono::Utc;

    fn started_tournament(id: TournamentId) -> Tournament {
        let now = Utc::now();
        let mut t = Tournament::new(id, TournamentConfig::double_elimination("Cup"), "org", now).unwrap();
        for (name, leader) in [("A", "a"), ("B", "b"), ("C", "c")] {
            t.register_team(NewTeam::new(name, leader).with_photo("file-1"), now)
                .unwrap();
        }
        t.lock(now).unwrap();
        t.submit_result(1, 2, now).unwrap();
        t
    }

    #[tokio::test]
    async fn test_in_memory_round_trips_full_state() {
        let repo = InMemoryTournamentRepository::new();
        let tournament = started_tournament(4);
        repo.save(&tournament).await.unwrap();

        let loaded = repo.load(4).await.unwrap().unwrap();
        assert_eq!(loaded, tournament);
        assert_eq!(loaded.bracket(), tournament.bracket());
    }

    #[tokio::test]
    async fn test_in_memory_save_is_idempotent() {
        let repo = InMemoryTournamentRepository::new();
        let tournament = started_tournament(1);
        repo.save(&tournament).await.unwrap();
        repo.save(&tournament).await.unwrap();
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_in_memory_load_all_and_delete() {
        let repo = InMemoryTournamentRepository::new();
        repo.save(&started_tournament(2)).await.unwrap();
        repo.save(&started_tournament(1)).await.unwrap();

        let ids: Vec<_> = repo.load_all().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
        assert!(repo.load(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let config = DatabaseConfig::with_url("not a database url");
        let err = PgTournamentRepository::connect(&config).await.err().unwrap();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
