//! HTTP API for the tournament server.
//!
//! The chat front-end (or anything else) drives tournaments through these
//! endpoints. Reads are public; writes need an `x-user-handle` header, and
//! organizer-only commands additionally need that handle to pass the
//! configured [`Authorizer`].
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                                         - Health check
//! GET    /api/v1/tournaments?status=&q=                  - List / search tournaments
//! POST   /api/v1/tournaments                             - Create (organizer)
//! GET    /api/v1/tournaments/{id}                        - Summary, teams, standings
//! DELETE /api/v1/tournaments/{id}                        - Delete (organizer)
//! POST   /api/v1/tournaments/{id}/teams                  - Register a team
//! DELETE /api/v1/tournaments/{id}/teams/{team_id}        - Withdraw a team (organizer)
//! POST   /api/v1/tournaments/{id}/lock                   - Close registration (organizer)
//! POST   /api/v1/tournaments/{id}/start                  - Build bracket (organizer)
//! POST   /api/v1/tournaments/{id}/cancel                 - Cancel (organizer)
//! POST   /api/v1/tournaments/{id}/matches/{mid}/result   - Submit result (organizer)
//! DELETE /api/v1/tournaments/{id}/matches/{mid}/result   - Undo result (organizer)
//! GET    /api/v1/tournaments/{id}/bracket                - Bracket as JSON
//! GET    /api/v1/tournaments/{id}/bracket.txt            - Bracket as text
//! GET    /api/v1/players/{handle}/teams                  - Teams led by a handle
//! GET    /api/v1/players/{handle}/stats                  - Player stats
//! POST   /api/v1/commands                                - Any tagged command
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tourney::{AdminList, TournamentManager, db::InMemoryTournamentRepository};
//! use tourney_server::api::{AppState, create_router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = TournamentManager::new(Arc::new(InMemoryTournamentRepository::new()));
//! let state = AppState {
//!     manager: Arc::new(manager),
//!     authorizer: Arc::new(AdminList::from_csv("@alice")),
//!     default_max_teams: None,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod middleware;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tourney::{Authorizer, TournamentManager};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<TournamentManager>,
    pub authorizer: Arc<dyn Authorizer>,
    /// Capacity applied when a create request names none
    pub default_max_teams: Option<usize>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/tournaments/{tournament_id}",
            get(tournaments::get_tournament).delete(tournaments::delete_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/teams",
            post(tournaments::register_team),
        )
        .route(
            "/tournaments/{tournament_id}/teams/{team_id}",
            delete(tournaments::unregister_team),
        )
        .route(
            "/tournaments/{tournament_id}/lock",
            post(tournaments::lock_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/start",
            post(tournaments::start_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/cancel",
            post(tournaments::cancel_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/matches/{match_id}/result",
            post(tournaments::submit_result).delete(tournaments::undo_result),
        )
        .route(
            "/tournaments/{tournament_id}/bracket",
            get(tournaments::get_bracket),
        )
        .route(
            "/tournaments/{tournament_id}/bracket.txt",
            get(tournaments::get_bracket_text),
        )
        .route("/players/{handle}/teams", get(tournaments::teams_led_by))
        .route("/players/{handle}/stats", get(tournaments::player_stats))
        .route("/commands", post(tournaments::execute_command))
}

/// Health check endpoint for monitoring and load balancers.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let active = state.manager.active_tournament_count().await;
    tracing::debug!(active_tournaments = active, "Health check");
    (StatusCode::OK, "OK")
}
