//! Mapping of engine and service errors onto HTTP responses.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use tourney::{ServiceError, TournamentError};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build an error response
pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Status code for a service error
///
/// Engine rejections are the caller's to fix (4xx); storage failures and
/// stopped actors are ours (5xx).
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Tournament(err) => match err {
            TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
            TournamentError::InvalidFormat(_)
            | TournamentError::InvalidParticipant { .. }
            | TournamentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TournamentError::RegistrationClosed
            | TournamentError::DuplicateTeam(_)
            | TournamentError::InsufficientTeams { .. }
            | TournamentError::AlreadyResolved(_)
            | TournamentError::ParticipantsNotResolved(_)
            | TournamentError::DownstreamResolved { .. }
            | TournamentError::InvalidTransition { .. }
            | TournamentError::TournamentFull(_)
            | TournamentError::NoSubmittedResult(_) => StatusCode::CONFLICT,
        },
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Response for a service error, with a client-safe message
pub fn service_error(err: &ServiceError) -> ApiError {
    error_response(status_for(err), err.client_message())
}
