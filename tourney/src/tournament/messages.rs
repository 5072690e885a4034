//! Tournament actor message types and front-end command intents.

use super::errors::{ServiceResult, TournamentResult};
use super::models::{Tournament, TournamentConfig, TournamentId};
use crate::bracket::MatchId;
use crate::roster::{NewTeam, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::oneshot;

/// A state change applied to one tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    RegisterTeam(NewTeam),
    UnregisterTeam(TeamId),
    Lock,
    Start,
    SubmitResult { match_id: MatchId, winner: TeamId },
    SubmitDoubleLoss { match_id: MatchId },
    UndoResult { match_id: MatchId },
    Cancel,
}

impl Mutation {
    /// Apply to a tournament
    pub fn apply(self, tournament: &mut Tournament, now: DateTime<Utc>) -> TournamentResult<()> {
        match self {
            Mutation::RegisterTeam(team) => tournament.register_team(team, now).map(|_| ()),
            Mutation::UnregisterTeam(team_id) => tournament.unregister_team(team_id).map(|_| ()),
            Mutation::Lock => tournament.lock(now),
            Mutation::Start => tournament.start(now),
            Mutation::SubmitResult { match_id, winner } => tournament.submit_result(match_id, winner, now),
            Mutation::SubmitDoubleLoss { match_id } => tournament.submit_double_loss(match_id, now),
            Mutation::UndoResult { match_id } => tournament.undo_result(match_id),
            Mutation::Cancel => tournament.cancel(now),
        }
    }

    /// Short name for logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::RegisterTeam(_) => "register_team",
            Mutation::UnregisterTeam(_) => "unregister_team",
            Mutation::Lock => "lock",
            Mutation::Start => "start",
            Mutation::SubmitResult { .. } => "submit_result",
            Mutation::SubmitDoubleLoss { .. } => "submit_double_loss",
            Mutation::UndoResult { .. } => "undo_result",
            Mutation::Cancel => "cancel",
        }
    }
}

/// Messages that can be sent to a TournamentActor
#[derive(Debug)]
pub enum TournamentMessage {
    /// Apply a mutation, persist, and reply with the committed snapshot
    Apply {
        mutation: Mutation,
        response: oneshot::Sender<ServiceResult<Arc<Tournament>>>,
    },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}

/// Command intents sent by the messaging front-end
///
/// Each maps onto one engine operation. Commands other than `Create` and
/// `QueryBracket` mutate an existing tournament and need an authorized caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TournamentCommand {
    CreateTournament {
        config: TournamentConfig,
    },
    RegisterTeam {
        tournament_id: TournamentId,
        team: NewTeam,
    },
    UnregisterTeam {
        tournament_id: TournamentId,
        team_id: TeamId,
    },
    LockTournament {
        tournament_id: TournamentId,
    },
    StartTournament {
        tournament_id: TournamentId,
    },
    SubmitResult {
        tournament_id: TournamentId,
        match_id: MatchId,
        winner: TeamId,
    },
    SubmitDoubleLoss {
        tournament_id: TournamentId,
        match_id: MatchId,
    },
    UndoResult {
        tournament_id: TournamentId,
        match_id: MatchId,
    },
    CancelTournament {
        tournament_id: TournamentId,
    },
    QueryBracket {
        tournament_id: TournamentId,
    },
}

impl TournamentCommand {
    /// Tournament the command targets (none for creation)
    pub fn tournament_id(&self) -> Option<TournamentId> {
        match self {
            TournamentCommand::CreateTournament { .. } => None,
            TournamentCommand::RegisterTeam { tournament_id, .. }
            | TournamentCommand::UnregisterTeam { tournament_id, .. }
            | TournamentCommand::LockTournament { tournament_id }
            | TournamentCommand::StartTournament { tournament_id }
            | TournamentCommand::SubmitResult { tournament_id, .. }
            | TournamentCommand::SubmitDoubleLoss { tournament_id, .. }
            | TournamentCommand::UndoResult { tournament_id, .. }
            | TournamentCommand::CancelTournament { tournament_id }
            | TournamentCommand::QueryBracket { tournament_id } => Some(*tournament_id),
        }
    }

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            TournamentCommand::CreateTournament { .. } => "create_tournament",
            TournamentCommand::RegisterTeam { .. } => "register_team",
            TournamentCommand::UnregisterTeam { .. } => "unregister_team",
            TournamentCommand::LockTournament { .. } => "lock_tournament",
            TournamentCommand::StartTournament { .. } => "start_tournament",
            TournamentCommand::SubmitResult { .. } => "submit_result",
            TournamentCommand::SubmitDoubleLoss { .. } => "submit_double_loss",
            TournamentCommand::UndoResult { .. } => "undo_result",
            TournamentCommand::CancelTournament { .. } => "cancel_tournament",
            TournamentCommand::QueryBracket { .. } => "query_bracket",
        }
    }

    /// Whether the command requires an organizer capability
    ///
    /// Team registration is open to any identified user, as is reading.
    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            TournamentCommand::RegisterTeam { .. } | TournamentCommand::QueryBracket { .. }
        )
    }

    /// Mutation carried by the command, for commands against an existing tournament
    pub fn into_mutation(self) -> Option<Mutation> {
        match self {
            TournamentCommand::CreateTournament { .. } | TournamentCommand::QueryBracket { .. } => None,
            TournamentCommand::RegisterTeam { team, .. } => Some(Mutation::RegisterTeam(team)),
            TournamentCommand::UnregisterTeam { team_id, .. } => Some(Mutation::UnregisterTeam(team_id)),
            TournamentCommand::LockTournament { .. } => Some(Mutation::Lock),
            TournamentCommand::StartTournament { .. } => Some(Mutation::Start),
            TournamentCommand::SubmitResult { match_id, winner, .. } => {
                Some(Mutation::SubmitResult { match_id, winner })
            }
            TournamentCommand::SubmitDoubleLoss { match_id, .. } => Some(Mutation::SubmitDoubleLoss { match_id }),
            TournamentCommand::UndoResult { match_id, .. } => Some(Mutation::UndoResult { match_id }),
            TournamentCommand::CancelTournament { .. } => Some(Mutation::Cancel),
        }
    }
}
