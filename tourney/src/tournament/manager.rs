//! Tournament manager: registry of tournament actors and command dispatch.

use super::{
    actor::{TournamentActor, TournamentHandle},
    errors::{Entity, ServiceResult, TournamentError},
    messages::{Mutation, TournamentCommand},
    models::{Tournament, TournamentConfig, TournamentId, TournamentInfo, TournamentStatus},
};
use crate::db::TournamentRepository;
use crate::roster::{Team, normalize_handle};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Aggregate numbers for one player handle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Normalized handle
    pub handle: String,
    /// Teams the player leads
    pub teams_led: usize,
    /// Tournaments the player is rostered in
    pub tournaments_joined: usize,
    /// Matches won by the player's teams
    pub matches_won: u32,
    /// Tournaments won by the player's teams
    pub championships: usize,
}

/// A team together with the tournament it is registered in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub tournament_id: TournamentId,
    pub tournament_name: String,
    pub team: Team,
}

/// Manages every tournament's actor
///
/// Tournaments are independent: each has its own actor and no state is
/// shared between them beyond this index.
pub struct TournamentManager {
    /// Persistence collaborator
    repository: Arc<dyn TournamentRepository>,

    /// Active tournament handles
    tournaments: Arc<RwLock<HashMap<TournamentId, TournamentHandle>>>,

    /// Next tournament ID
    next_tournament_id: Arc<RwLock<TournamentId>>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(repository: Arc<dyn TournamentRepository>) -> Self {
        Self {
            repository,
            tournaments: Arc::new(RwLock::new(HashMap::new())),
            next_tournament_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Load stored tournaments and spawn their actors
    ///
    /// # Returns
    ///
    /// * `ServiceResult<usize>` - Number of tournaments loaded
    pub async fn load_existing_tournaments(&self) -> ServiceResult<usize> {
        let stored = self.repository.load_all().await?;
        let count = stored.len();
        let max_id = stored.iter().map(|t| t.id).max().unwrap_or(0);

        for tournament in stored {
            let id = tournament.id;
            self.spawn(tournament).await;
            log::info!("Loaded tournament {}", id);
        }

        let mut next_id = self.next_tournament_id.write().await;
        *next_id = (*next_id).max(max_id + 1);
        drop(next_id);

        Ok(count)
    }

    /// Create a tournament and spawn its actor
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an invalid configuration
    /// - `Storage` if the tournament could not be saved
    pub async fn create_tournament(
        &self,
        config: TournamentConfig,
        organizer: &str,
    ) -> ServiceResult<Arc<Tournament>> {
        config.validate()?;

        let mut next_id = self.next_tournament_id.write().await;
        let tournament = Tournament::new(*next_id, config, organizer, Utc::now())?;
        self.repository.save(&tournament).await?;
        *next_id += 1;
        drop(next_id);

        log::info!(
            "Created tournament {} '{}' ({}) for {}",
            tournament.id,
            tournament.config.name,
            tournament.config.format,
            organizer
        );
        Ok(self.spawn(tournament).await.snapshot())
    }

    /// Get a tournament handle
    pub async fn handle(&self, tournament_id: TournamentId) -> ServiceResult<TournamentHandle> {
        let tournaments = self.tournaments.read().await;
        tournaments
            .get(&tournament_id)
            .cloned()
            .ok_or_else(|| TournamentError::NotFound(Entity::Tournament(tournament_id)).into())
    }

    /// Latest committed state of a tournament
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> ServiceResult<Arc<Tournament>> {
        Ok(self.handle(tournament_id).await?.snapshot())
    }

    /// Apply a mutation to a tournament
    pub async fn apply(&self, tournament_id: TournamentId, mutation: Mutation) -> ServiceResult<Arc<Tournament>> {
        self.handle(tournament_id).await?.apply(mutation).await
    }

    /// Execute a front-end command on behalf of an already-authorized caller
    ///
    /// # Returns
    ///
    /// * `ServiceResult<Arc<Tournament>>` - State snapshot after the command
    pub async fn execute(&self, organizer: &str, command: TournamentCommand) -> ServiceResult<Arc<Tournament>> {
        match command {
            TournamentCommand::CreateTournament { config } => self.create_tournament(config, organizer).await,
            TournamentCommand::QueryBracket { tournament_id } => self.get_tournament(tournament_id).await,
            command => {
                let Some(tournament_id) = command.tournament_id() else {
                    return Err(TournamentError::InvalidInput("command has no tournament".to_string()).into());
                };
                let Some(mutation) = command.into_mutation() else {
                    return Err(TournamentError::InvalidInput("command does not change state".to_string()).into());
                };
                self.apply(tournament_id, mutation).await
            }
        }
    }

    /// Summaries of all tournaments, optionally filtered by status, newest first
    pub async fn list_tournaments(&self, status: Option<TournamentStatus>) -> Vec<TournamentInfo> {
        let mut infos: Vec<TournamentInfo> = self
            .snapshots()
            .await
            .iter()
            .map(|t| t.info())
            .filter(|info| status.is_none_or(|s| info.status == s))
            .collect();
        infos.sort_by(|a, b| b.id.cmp(&a.id));
        infos
    }

    /// Tournaments whose name contains `query` (case-insensitive)
    pub async fn search_tournaments(&self, query: &str) -> Vec<TournamentInfo> {
        let needle = query.trim().to_lowercase();
        self.list_tournaments(None)
            .await
            .into_iter()
            .filter(|info| info.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Teams led by a handle, across tournaments
    pub async fn teams_led_by(&self, handle: &str) -> Vec<TeamEntry> {
        let mut entries: Vec<TeamEntry> = self
            .snapshots()
            .await
            .iter()
            .flat_map(|t| {
                t.registry().led_by(handle).map(|team| TeamEntry {
                    tournament_id: t.id,
                    tournament_name: t.config.name.clone(),
                    team: team.clone(),
                })
            })
            .collect();
        entries.sort_by_key(|entry| (entry.tournament_id, entry.team.id));
        entries
    }

    /// Participation and results for a handle
    pub async fn player_stats(&self, handle: &str) -> PlayerStats {
        let mut stats = PlayerStats {
            handle: normalize_handle(handle),
            ..PlayerStats::default()
        };

        for tournament in self.snapshots().await {
            let records = tournament.ledger().map(|l| l.records()).unwrap_or_default();
            let champion = tournament.champion().map(|team| team.id);
            let mut joined = false;

            for team in tournament.teams().iter().filter(|team| team.has_handle(handle)) {
                joined = true;
                if normalize_handle(&team.leader) == stats.handle {
                    stats.teams_led += 1;
                }
                stats.matches_won += records.get(&team.id).map_or(0, |r| r.wins);
                if champion == Some(team.id) {
                    stats.championships += 1;
                }
            }
            if joined {
                stats.tournaments_joined += 1;
            }
        }

        stats
    }

    /// Stop a tournament's actor and delete it from storage
    ///
    /// The actor is closed first so that mutations already queued are saved
    /// before the stored row is removed, never after.
    pub async fn delete_tournament(&self, tournament_id: TournamentId) -> ServiceResult<()> {
        let handle = self
            .tournaments
            .write()
            .await
            .remove(&tournament_id)
            .ok_or(TournamentError::NotFound(Entity::Tournament(tournament_id)))?;
        handle.close().await;

        self.repository.delete(tournament_id).await?;

        log::info!("Deleted tournament {}", tournament_id);
        Ok(())
    }

    /// Number of tournaments that have not finished
    pub async fn active_tournament_count(&self) -> usize {
        self.snapshots()
            .await
            .iter()
            .filter(|t| !t.status.is_terminal())
            .count()
    }

    /// Stop every actor
    pub async fn shutdown(&self) {
        let handles: Vec<TournamentHandle> = self.tournaments.write().await.drain().map(|(_, h)| h).collect();
        for handle in &handles {
            handle.close().await;
        }
        log::info!("Stopped {} tournament actors", handles.len());
    }

    async fn snapshots(&self) -> Vec<Arc<Tournament>> {
        let tournaments = self.tournaments.read().await;
        tournaments.values().map(TournamentHandle::snapshot).collect()
    }

    async fn spawn(&self, tournament: Tournament) -> TournamentHandle {
        let id = tournament.id;
        let (actor, handle) = TournamentActor::new(tournament, self.repository.clone());

        let mut tournaments = self.tournaments.write().await;
        tournaments.insert(id, handle.clone());
        drop(tournaments);

        tokio::spawn(async move {
            actor.run().await;
        });

        handle
    }
}
