//! Tournament API handlers.
//!
//! Every state change is expressed as a [`TournamentCommand`] and funnelled
//! through [`run_command`], which checks the caller against the authorizer,
//! executes the command on the tournament's actor and records the outcome.
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments \
//!   -H "x-user-handle: @alice" \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Spring Cup", "format": "double", "max_teams": 8}'
//! ```
//!
//! Report a result:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments/1/matches/0/result \
//!   -H "x-user-handle: @alice" \
//!   -H "Content-Type: application/json" \
//!   -d '{"winner": 3}'
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tourney::{
    Bracket, MatchId, NewTeam, SeedingMethod, Team, TeamId, Tournament, TournamentCommand,
    TournamentConfig, TournamentFormat, TournamentId, TournamentStatus,
    roster::PhotoRef,
    tournament::{PlayerStats, TeamEntry, TeamStanding, TournamentInfo},
};

use super::{
    AppState,
    errors::{ApiError, error_response, service_error},
    middleware::{Caller, RequestId},
};
use crate::{logging, metrics, render};

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    /// `single`, `double`, `single_elimination`, ...
    pub format: String,
    #[serde(default)]
    pub seeding: SeedingMethod,
    pub max_teams: Option<usize>,
    pub auto_start: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListTournamentsQuery {
    pub status: Option<TournamentStatus>,
    /// Case-insensitive name search
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterTeamRequest {
    pub name: String,
    /// Defaults to the caller
    pub leader: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResultRequest {
    pub winner: Option<TeamId>,
    #[serde(default)]
    pub double_loss: bool,
}

#[derive(Debug, Serialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub info: TournamentInfo,
    pub teams: Vec<Team>,
    pub standings: Vec<TeamStanding>,
    pub runner_up: Option<TeamId>,
}

impl From<&Tournament> for TournamentDetail {
    fn from(tournament: &Tournament) -> Self {
        Self {
            info: tournament.info(),
            teams: tournament.teams().to_vec(),
            standings: tournament.standings(),
            runner_up: tournament.bracket().and_then(Bracket::runner_up),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BracketResponse {
    pub tournament_id: TournamentId,
    pub status: TournamentStatus,
    /// `None` until the bracket is built
    pub bracket: Option<Bracket>,
    /// Matches waiting for a result
    pub ready_matches: Vec<MatchId>,
}

/// Check authorization, execute a command and record the outcome
///
/// # Errors
///
/// - `403 Forbidden`: the command needs an organizer and the caller is not one
/// - Engine and service errors mapped by [`service_error`]
pub async fn run_command(
    state: &AppState,
    caller: &Caller,
    request_id: &RequestId,
    mut command: TournamentCommand,
) -> Result<Arc<Tournament>, ApiError> {
    let name = command.name();

    if command.requires_admin()
        && !state
            .authorizer
            .can_mutate(caller.as_str(), command.tournament_id())
    {
        logging::log_rejected_command(name, Some(caller.as_str()), "not an organizer");
        metrics::commands_rejected_total(name, "forbidden");
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Only tournament organizers can do that",
        ));
    }

    if let TournamentCommand::CreateTournament { config } = &mut command {
        if config.max_teams.is_none() {
            config.max_teams = state.default_max_teams;
        }
    }

    let submitted = match &command {
        TournamentCommand::SubmitResult { .. } => Some(false),
        TournamentCommand::SubmitDoubleLoss { .. } => Some(true),
        _ => None,
    };

    let started = Instant::now();
    match state.manager.execute(caller.as_str(), command).await {
        Ok(tournament) => {
            logging::log_command(
                name,
                caller.as_str(),
                tournament.id,
                started.elapsed().as_millis() as u64,
            );
            metrics::commands_executed_total(name);
            if let Some(double_loss) = submitted {
                metrics::results_submitted_total(double_loss);
            }
            metrics::active_tournaments(state.manager.active_tournament_count().await);
            Ok(tournament)
        }
        Err(err) => {
            tracing::debug!(request_id = %request_id.as_str(), error = %err, "Command failed");
            let reason = if err.as_tournament_error().is_some() {
                "rejected"
            } else {
                "error"
            };
            logging::log_rejected_command(name, Some(caller.as_str()), &err.to_string());
            metrics::commands_rejected_total(name, reason);
            Err(service_error(&err))
        }
    }
}

/// List tournaments, newest first
///
/// `?status=open` filters by status, `?q=cup` searches names.
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<ListTournamentsQuery>,
) -> Json<Vec<TournamentInfo>> {
    let infos = match query.q.as_deref() {
        Some(q) => state.manager.search_tournaments(q).await,
        None => state.manager.list_tournaments(None).await,
    };
    Json(
        infos
            .into_iter()
            .filter(|info| query.status.is_none_or(|s| info.status == s))
            .collect(),
    )
}

/// Create a tournament
///
/// # Errors
///
/// - `400 Bad Request`: unknown format, blank name or capacity below 2
/// - `403 Forbidden`: caller is not an organizer
pub async fn create_tournament(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Json(request): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<TournamentInfo>), ApiError> {
    let format: TournamentFormat = request
        .format
        .parse()
        .map_err(|err: tourney::TournamentError| service_error(&err.into()))?;

    let config = TournamentConfig {
        name: request.name,
        format,
        seeding: request.seeding,
        max_teams: request.max_teams,
        auto_start: request.auto_start.unwrap_or(true),
    };

    let tournament = run_command(
        &state,
        &caller,
        &request_id,
        TournamentCommand::CreateTournament { config },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(tournament.info())))
}

/// Tournament summary with teams and standings
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentDetail>, ApiError> {
    let tournament = state
        .manager
        .get_tournament(tournament_id)
        .await
        .map_err(|err| service_error(&err))?;
    Ok(Json(TournamentDetail::from(tournament.as_ref())))
}

/// Delete a tournament (organizers only)
pub async fn delete_tournament(
    State(state): State<AppState>,
    caller: Caller,
    Path(tournament_id): Path<TournamentId>,
) -> Result<StatusCode, ApiError> {
    if !state.authorizer.can_mutate(caller.as_str(), Some(tournament_id)) {
        logging::log_rejected_command("delete_tournament", Some(caller.as_str()), "not an organizer");
        metrics::commands_rejected_total("delete_tournament", "forbidden");
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Only tournament organizers can do that",
        ));
    }

    state
        .manager
        .delete_tournament(tournament_id)
        .await
        .map_err(|err| service_error(&err))?;
    metrics::active_tournaments(state.manager.active_tournament_count().await);
    Ok(StatusCode::NO_CONTENT)
}

/// Register a team; any identified caller may register
///
/// # Errors
///
/// - `409 Conflict`: registration closed, tournament full, or duplicate name/handle
pub async fn register_team(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<RegisterTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = NewTeam {
        name: request.name,
        leader: request.leader.unwrap_or_else(|| caller.as_str().to_string()),
        members: request.members,
        photos: request.photos,
    };

    let tournament = run_command(
        &state,
        &caller,
        &request_id,
        TournamentCommand::RegisterTeam {
            tournament_id,
            team,
        },
    )
    .await?;

    // Registration appends, so the new team is last in registry order
    let team = tournament.teams().last().cloned().ok_or_else(|| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Withdraw a team before the tournament is locked
pub async fn unregister_team(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path((tournament_id, team_id)): Path<(TournamentId, TeamId)>,
) -> Result<StatusCode, ApiError> {
    run_command(
        &state,
        &caller,
        &request_id,
        TournamentCommand::UnregisterTeam {
            tournament_id,
            team_id,
        },
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Close registration (and build the bracket unless the tournament starts manually)
pub async fn lock_tournament(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentInfo>, ApiError> {
    let tournament = run_command(
        &state,
        &caller,
        &request_id,
        TournamentCommand::LockTournament { tournament_id },
    )
    .await?;
    Ok(Json(tournament.info()))
}

/// Build the bracket of a locked tournament
pub async fn start_tournament(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentInfo>, ApiError> {
    let tournament = run_command(
        &state,
        &caller,
        &request_id,
        TournamentCommand::StartTournament { tournament_id },
    )
    .await?;
    Ok(Json(tournament.info()))
}

/// Cancel a tournament before it starts
pub async fn cancel_tournament(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentInfo>, ApiError> {
    let tournament = run_command(
        &state,
        &caller,
        &request_id,
        TournamentCommand::CancelTournament { tournament_id },
    )
    .await?;
    Ok(Json(tournament.info()))
}

/// Record a match result
///
/// Body is `{"winner": <team_id>}` or `{"double_loss": true}`.
///
/// # Errors
///
/// - `400 Bad Request`: neither a winner nor a double loss, or the winner is not playing
/// - `409 Conflict`: match already resolved or still waiting on its participants
pub async fn submit_result(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
    Json(request): Json<SubmitResultRequest>,
) -> Result<Json<TournamentDetail>, ApiError> {
    let command = match (request.winner, request.double_loss) {
        (None, true) => TournamentCommand::SubmitDoubleLoss {
            tournament_id,
            match_id,
        },
        (Some(winner), false) => TournamentCommand::SubmitResult {
            tournament_id,
            match_id,
            winner,
        },
        (Some(_), true) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "A double loss has no winner",
            ));
        }
        (None, false) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Provide a winner or double_loss",
            ));
        }
    };

    let tournament = run_command(&state, &caller, &request_id, command).await?;
    Ok(Json(TournamentDetail::from(tournament.as_ref())))
}

/// Revert a submitted result
pub async fn undo_result(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
) -> Result<Json<TournamentDetail>, ApiError> {
    let tournament = run_command(
        &state,
        &caller,
        &request_id,
        TournamentCommand::UndoResult {
            tournament_id,
            match_id,
        },
    )
    .await?;
    Ok(Json(TournamentDetail::from(tournament.as_ref())))
}

/// Bracket as JSON
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<BracketResponse>, ApiError> {
    let tournament = state
        .manager
        .get_tournament(tournament_id)
        .await
        .map_err(|err| service_error(&err))?;

    let bracket = tournament.bracket().cloned();
    let ready_matches = bracket
        .as_ref()
        .map(|b| b.ready_matches().iter().map(|m| m.id).collect())
        .unwrap_or_default();

    Ok(Json(BracketResponse {
        tournament_id,
        status: tournament.status,
        bracket,
        ready_matches,
    }))
}

/// Bracket as plain text
pub async fn get_bracket_text(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<String, ApiError> {
    let tournament = state
        .manager
        .get_tournament(tournament_id)
        .await
        .map_err(|err| service_error(&err))?;
    Ok(render::render_bracket(&tournament))
}

/// Teams led by a handle, across tournaments
pub async fn teams_led_by(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Json<Vec<TeamEntry>> {
    Json(state.manager.teams_led_by(&handle).await)
}

/// Participation and results for a handle
pub async fn player_stats(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Json<PlayerStats> {
    Json(state.manager.player_stats(&handle).await)
}

/// Execute any front-end command
///
/// The body is a tagged command, e.g.
/// `{"command": "lock_tournament", "tournament_id": 1}`.
pub async fn execute_command(
    State(state): State<AppState>,
    caller: Caller,
    request_id: RequestId,
    Json(command): Json<TournamentCommand>,
) -> Result<Json<TournamentDetail>, ApiError> {
    let tournament = run_command(&state, &caller, &request_id, command).await?;
    Ok(Json(TournamentDetail::from(tournament.as_ref())))
}
