//! # Tourney
//!
//! A bracket engine for single- and double-elimination team tournaments.
//!
//! Teams register into a [`roster::RosterRegistry`]; locking the tournament
//! runs the [`bracket::build_bracket`] builder once, and from then on the
//! [`bracket::MatchLedger`] records results and advances teams until a
//! champion is decided. [`tournament::Tournament`] ties these together as a
//! lifecycle state machine:
//!
//! ```text
//! Open -> Locked -> InProgress -> Complete
//!    \        \
//!     +--------+--> Cancelled
//! ```
//!
//! ## Core Modules
//!
//! - [`roster`]: Teams and the registry that seeds the bracket
//! - [`bracket`]: Bracket topology, seeding, byes, result propagation and undo
//! - [`tournament`]: Lifecycle, per-tournament actors and command dispatch
//! - [`auth`]: Capability check consulted before mutating commands
//! - [`db`]: Tournament repositories (PostgreSQL and in-memory)
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use tourney::{NewTeam, Tournament, TournamentConfig, TournamentStatus};
//!
//! let now = Utc::now();
//! let mut cup = Tournament::new(1, TournamentConfig::single_elimination("Cup"), "@org", now).unwrap();
//! cup.register_team(NewTeam::new("Rockets", "@ace"), now).unwrap();
//! cup.register_team(NewTeam::new("Comets", "@blaze"), now).unwrap();
//! cup.lock(now).unwrap();
//!
//! cup.submit_result(0, 1, now).unwrap();
//! assert_eq!(cup.status, TournamentStatus::Complete);
//! assert_eq!(cup.champion().map(|t| t.name.as_str()), Some("Rockets"));
//! ```

/// Authorization collaborator.
pub mod auth;

/// Bracket builder and match ledger.
pub mod bracket;

/// Persistence layer.
pub mod db;

/// Team roster registry.
pub mod roster;

/// Tournament lifecycle and actors.
pub mod tournament;

pub use auth::{AdminList, Authorizer};
pub use bracket::{Bracket, BracketSide, Match, MatchId, MatchLedger, MatchResult, SeedingMethod, Slot, TournamentFormat};
pub use roster::{NewTeam, Team, TeamId};
pub use tournament::{
    ServiceError, Tournament, TournamentCommand, TournamentConfig, TournamentError, TournamentId,
    TournamentManager, TournamentStatus,
};
