//! Persistence for tournaments.
//!
//! The engine never touches storage itself. The tournament actor hands each
//! new snapshot to a [`TournamentRepository`] and only commits it once the
//! save has succeeded. [`PgTournamentRepository::connect`] opens the
//! PostgreSQL pool described by a [`DatabaseConfig`].

pub mod config;
pub mod repository;

pub use config::DatabaseConfig;
pub use repository::{
    InMemoryTournamentRepository, PgTournamentRepository, StoreError, StoreResult,
    TournamentRepository,
};
