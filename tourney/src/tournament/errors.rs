//! Tournament error types.

use super::models::{TournamentId, TournamentStatus};
use crate::bracket::MatchId;
use crate::roster::TeamId;
use crate::db::StoreError;
use std::fmt;
use thiserror::Error;

/// Kind of entity a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Team(TeamId),
    Match(MatchId),
    Tournament(TournamentId),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Team(id) => write!(f, "team {id}"),
            Entity::Match(id) => write!(f, "match {id}"),
            Entity::Tournament(id) => write!(f, "tournament {id}"),
        }
    }
}

/// Engine errors
///
/// Every variant is caller-correctable; a failed operation leaves the
/// tournament untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    /// Registry no longer accepts changes
    #[error("Registration is closed")]
    RegistrationClosed,

    /// Team name or a roster handle is already registered
    #[error("Duplicate team: {0}")]
    DuplicateTeam(String),

    /// Unknown team, match or tournament
    #[error("Not found: {0}")]
    NotFound(Entity),

    /// Not enough teams to build a bracket
    #[error("Insufficient teams: need at least {needed}, have {current}")]
    InsufficientTeams { needed: usize, current: usize },

    /// Unrecognised elimination format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Match already has a result
    #[error("Match {0} is already resolved")]
    AlreadyResolved(MatchId),

    /// Submitted team is not playing in the match, or the result kind is not allowed there
    #[error("Invalid participant for match {match_id}: {detail}")]
    InvalidParticipant { match_id: MatchId, detail: String },

    /// One of the match slots still waits on another match
    #[error("Match {0} is still waiting on an earlier match")]
    ParticipantsNotResolved(MatchId),

    /// Undo blocked by a result recorded further down the bracket
    #[error("Cannot undo match {match_id}: match {downstream} already has a result")]
    DownstreamResolved { match_id: MatchId, downstream: MatchId },

    /// Operation not allowed in the current status
    #[error("Cannot {action} a tournament that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: TournamentStatus,
    },

    /// Team capacity reached
    #[error("Tournament is full ({0} teams)")]
    TournamentFull(usize),

    /// Undo requested for a match without a submitted result
    #[error("Match {0} has no submitted result")]
    NoSubmittedResult(MatchId),

    /// Malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for engine operations
pub type TournamentResult<T> = Result<T, TournamentError>;

/// Errors raised by the tournament service (actors, manager, storage)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Engine rejected the operation
    #[error(transparent)]
    Tournament(#[from] TournamentError),

    /// Persistence failed; the mutation was not committed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Tournament actor has shut down
    #[error("Tournament {0} is unavailable")]
    Unavailable(TournamentId),
}

impl ServiceError {
    /// Get a client-safe error message
    ///
    /// Storage errors are sanitized so SQL and serialization details never
    /// reach the front-end.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Tournament(err) => err.to_string(),
            ServiceError::Storage(_) => "Internal server error".to_string(),
            ServiceError::Unavailable(_) => "Tournament is unavailable, try again".to_string(),
        }
    }

    /// Engine error, if this is one
    pub fn as_tournament_error(&self) -> Option<&TournamentError> {
        match self {
            ServiceError::Tournament(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
