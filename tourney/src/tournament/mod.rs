//! Tournament lifecycle, single-writer actors and command dispatch.
//!
//! A [`Tournament`] owns its roster and, once built, its match ledger. The
//! methods that move it through its lifecycle live in `state_machine`.
//! At runtime every tournament is owned by one [`TournamentActor`]; the
//! [`TournamentManager`] routes front-end commands to the right actor.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tourney::db::InMemoryTournamentRepository;
//! use tourney::roster::NewTeam;
//! use tourney::tournament::{Mutation, TournamentConfig, TournamentManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(InMemoryTournamentRepository::new()));
//!
//!     let cup = manager
//!         .create_tournament(TournamentConfig::double_elimination("Friday Cup"), "@organizer")
//!         .await?;
//!
//!     for (name, leader) in [("Rockets", "@ace"), ("Comets", "@blaze")] {
//!         manager
//!             .apply(cup.id, Mutation::RegisterTeam(NewTeam::new(name, leader)))
//!             .await?;
//!     }
//!
//!     let started = manager.apply(cup.id, Mutation::Lock).await?;
//!     println!("{} matches", started.bracket().map_or(0, |b| b.matches.len()));
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod errors;
pub mod manager;
pub mod messages;
pub mod models;
mod state_machine;

pub use actor::{TournamentActor, TournamentHandle};
pub use errors::{Entity, ServiceError, ServiceResult, TournamentError, TournamentResult};
pub use manager::{PlayerStats, TeamEntry, TournamentManager};
pub use messages::{Mutation, TournamentCommand, TournamentMessage};
pub use models::{
    TeamStanding, Tournament, TournamentConfig, TournamentId, TournamentInfo, TournamentStatus,
};
