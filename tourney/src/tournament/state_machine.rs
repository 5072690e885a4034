//! Tournament lifecycle transitions.
//!
//! ```text
//! Open --lock--> Locked --start--> InProgress --final result--> Complete
//!   \              |
//!    +--cancel-----+-----> Cancelled
//! ```
//!
//! With `auto_start` set, `lock` runs straight through to InProgress. Every
//! method checks before it mutates, so an error leaves the tournament as it
//! was.

use super::errors::{TournamentError, TournamentResult};
use super::models::{TeamStanding, Tournament, TournamentConfig, TournamentId, TournamentInfo, TournamentStatus};
use crate::bracket::{Bracket, MatchId, MatchLedger, build_bracket};
use crate::roster::{NewTeam, RosterRegistry, Team, TeamId};
use chrono::{DateTime, Utc};

impl Tournament {
    /// Create an open tournament
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the configuration is invalid
    pub fn new(
        id: TournamentId,
        config: TournamentConfig,
        organizer: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> TournamentResult<Self> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            organizer: organizer.into(),
            status: TournamentStatus::Open,
            created_at,
            locked_at: None,
            started_at: None,
            finished_at: None,
            registry: RosterRegistry::new(),
            ledger: None,
        })
    }

    /// Register a team
    ///
    /// # Returns
    ///
    /// * `TournamentResult<usize>` - Registry-order index of the team
    ///
    /// # Errors
    ///
    /// - `RegistrationClosed` unless the tournament is Open
    /// - `TournamentFull` if the capacity is reached
    /// - `DuplicateTeam` / `InvalidInput` from the registry
    pub fn register_team(&mut self, team: NewTeam, now: DateTime<Utc>) -> TournamentResult<usize> {
        if self.status != TournamentStatus::Open {
            return Err(TournamentError::RegistrationClosed);
        }
        if let Some(max) = self.config.max_teams {
            if self.registry.count() >= max {
                return Err(TournamentError::TournamentFull(max));
            }
        }

        let index = self.registry.register(team, now)?;
        log::info!(
            "Tournament {}: registered team {} ({} teams)",
            self.id,
            self.registry.list()[index].name,
            self.registry.count()
        );
        Ok(index)
    }

    /// Withdraw a team
    ///
    /// # Errors
    ///
    /// - `RegistrationClosed` unless the tournament is Open
    /// - `NotFound` if the team is not registered
    pub fn unregister_team(&mut self, team_id: TeamId) -> TournamentResult<Team> {
        if self.status != TournamentStatus::Open {
            return Err(TournamentError::RegistrationClosed);
        }
        let team = self.registry.unregister(team_id)?;
        log::info!("Tournament {}: unregistered team {}", self.id, team.name);
        Ok(team)
    }

    /// Close registration, and build the bracket if `auto_start` is set
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is Open
    /// - `InsufficientTeams` with fewer than two teams
    pub fn lock(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        self.expect_status(TournamentStatus::Open, "lock")?;
        let bracket = if self.config.auto_start {
            Some(self.build(now)?)
        } else {
            self.ensure_enough_teams()?;
            None
        };

        self.registry.freeze();
        self.status = TournamentStatus::Locked;
        self.locked_at = Some(now);
        log::info!("Tournament {} locked with {} teams", self.id, self.registry.count());

        if let Some(bracket) = bracket {
            self.begin(bracket, now);
        }
        Ok(())
    }

    /// Build the bracket of a locked tournament
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is Locked
    pub fn start(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        self.expect_status(TournamentStatus::Locked, "start")?;
        let bracket = self.build(now)?;
        self.begin(bracket, now);
        Ok(())
    }

    /// Cancel a tournament that has not started
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is Open or Locked
    pub fn cancel(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        match self.status {
            TournamentStatus::Open | TournamentStatus::Locked => {
                self.registry.freeze();
                self.status = TournamentStatus::Cancelled;
                self.finished_at = Some(now);
                log::info!("Tournament {} cancelled", self.id);
                Ok(())
            }
            status => Err(TournamentError::InvalidTransition {
                action: "cancel",
                status,
            }),
        }
    }

    /// Record the winner of a match
    ///
    /// Completes the tournament when the deciding match resolves.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is InProgress
    /// - ledger errors (`NotFound`, `AlreadyResolved`, `ParticipantsNotResolved`, `InvalidParticipant`)
    pub fn submit_result(&mut self, match_id: MatchId, winner: TeamId, now: DateTime<Utc>) -> TournamentResult<()> {
        self.active_ledger("submit results to")?
            .submit_result(match_id, winner, now)?;
        log::info!("Tournament {}: match {} won by team {}", self.id, match_id, winner);
        self.after_result(now);
        Ok(())
    }

    /// Record a double loss on a losers-bracket match
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is InProgress
    /// - ledger errors, `InvalidParticipant` outside the losers bracket
    pub fn submit_double_loss(&mut self, match_id: MatchId, now: DateTime<Utc>) -> TournamentResult<()> {
        self.active_ledger("submit results to")?
            .submit_double_loss(match_id, now)?;
        log::info!("Tournament {}: match {} recorded as a double loss", self.id, match_id);
        self.after_result(now);
        Ok(())
    }

    /// Revert a submitted result
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is InProgress
    /// - ledger errors (`NotFound`, `NoSubmittedResult`, `DownstreamResolved`)
    pub fn undo_result(&mut self, match_id: MatchId) -> TournamentResult<()> {
        self.active_ledger("undo results in")?.undo_result(match_id)?;
        log::info!("Tournament {}: result of match {} undone", self.id, match_id);
        self.refresh_eliminated();
        Ok(())
    }

    /// Registered teams in registry order
    pub fn teams(&self) -> &[Team] {
        self.registry.list()
    }

    /// Look up a team
    pub fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.registry.get(team_id)
    }

    /// Roster registry
    pub fn registry(&self) -> &RosterRegistry {
        &self.registry
    }

    /// Match ledger, once the bracket is built
    pub fn ledger(&self) -> Option<&MatchLedger> {
        self.ledger.as_ref()
    }

    /// Bracket with current results, once built
    pub fn bracket(&self) -> Option<&Bracket> {
        self.ledger.as_ref().map(MatchLedger::current_state)
    }

    /// Champion team, once complete
    pub fn champion(&self) -> Option<&Team> {
        self.ledger
            .as_ref()
            .and_then(MatchLedger::champion)
            .and_then(|id| self.registry.get(id))
    }

    /// Wins, losses and elimination per team, in registry order
    pub fn standings(&self) -> Vec<TeamStanding> {
        let records = self.ledger.as_ref().map(MatchLedger::records).unwrap_or_default();
        self.registry
            .list()
            .iter()
            .map(|team| {
                let record = records.get(&team.id).copied().unwrap_or_default();
                TeamStanding {
                    team_id: team.id,
                    name: team.name.clone(),
                    leader: team.leader.clone(),
                    wins: record.wins,
                    losses: record.losses,
                    eliminated: team.eliminated,
                }
            })
            .collect()
    }

    /// Summary for listings
    pub fn info(&self) -> TournamentInfo {
        let champion = self.champion();
        TournamentInfo {
            id: self.id,
            name: self.config.name.clone(),
            format: self.config.format,
            status: self.status,
            organizer: self.organizer.clone(),
            team_count: self.registry.count(),
            max_teams: self.config.max_teams,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            champion: champion.map(|team| team.id),
            champion_name: champion.map(|team| team.name.clone()),
        }
    }

    fn expect_status(&self, expected: TournamentStatus, action: &'static str) -> TournamentResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TournamentError::InvalidTransition {
                action,
                status: self.status,
            })
        }
    }

    fn ensure_enough_teams(&self) -> TournamentResult<()> {
        let current = self.registry.count();
        if current < crate::bracket::MIN_TEAMS {
            return Err(TournamentError::InsufficientTeams {
                needed: crate::bracket::MIN_TEAMS,
                current,
            });
        }
        Ok(())
    }

    fn build(&self, now: DateTime<Utc>) -> TournamentResult<Bracket> {
        self.ensure_enough_teams()?;
        build_bracket(&self.registry.team_ids(), self.config.format, self.config.seeding, now)
    }

    fn begin(&mut self, bracket: Bracket, now: DateTime<Utc>) {
        self.ledger = Some(MatchLedger::new(bracket));
        self.status = TournamentStatus::InProgress;
        self.started_at = Some(now);
        log::info!("Tournament {} started ({})", self.id, self.config.format);
        self.after_result(now);
    }

    fn active_ledger(&mut self, action: &'static str) -> TournamentResult<&mut MatchLedger> {
        if self.status != TournamentStatus::InProgress {
            return Err(TournamentError::InvalidTransition {
                action,
                status: self.status,
            });
        }
        self.ledger.as_mut().ok_or(TournamentError::InvalidTransition {
            action,
            status: self.status,
        })
    }

    fn refresh_eliminated(&mut self) {
        let eliminated = self.ledger.as_ref().map(MatchLedger::eliminated).unwrap_or_default();
        self.registry.set_eliminated(&eliminated);
    }

    fn after_result(&mut self, now: DateTime<Utc>) {
        self.refresh_eliminated();
        if self.ledger.as_ref().is_some_and(MatchLedger::is_complete) {
            self.status = TournamentStatus::Complete;
            self.finished_at = Some(now);
            log::info!(
                "Tournament {} complete, champion: {}",
                self.id,
                self.champion().map_or("none", |team| team.name.as_str())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{MatchState, SeedingMethod, Slot};
    use crate::tournament::errors::Entity;

    fn open(config: TournamentConfig, teams: &[&str]) -> Tournament {
        let now = Utc::now();
        let mut t = Tournament::new(1, config, "organizer", now).unwrap();
        for name in teams {
            t.register_team(NewTeam::new(*name, format!("{}_lead", name.to_lowercase())), now)
                .unwrap();
        }
        t
    }

    #[test]
    fn test_three_team_scenario() {
        let config = TournamentConfig::single_elimination("Cup").with_seeding(SeedingMethod::Sequential);
        let mut t = open(config, &["A", "B", "C"]);
        let now = Utc::now();
        t.lock(now).unwrap();
        assert_eq!(t.status, TournamentStatus::InProgress);

        let bracket = t.bracket().unwrap();
        assert_eq!(bracket.matches[0].participants, [Slot::team(1), Slot::team(2)]);
        assert_eq!(bracket.matches[1].participants, [Slot::team(3), Slot::Bye]);
        assert_eq!(bracket.matches[1].winner(), Some(3));

        t.submit_result(0, 1, now).unwrap();
        let final_match = &t.bracket().unwrap().matches[2];
        assert_eq!(final_match.participants, [Slot::team(1), Slot::team(3)]);
        assert_eq!(final_match.state(), MatchState::Ready);

        t.submit_result(2, 3, now).unwrap();
        assert_eq!(t.status, TournamentStatus::Complete);
        assert_eq!(t.champion().map(|team| team.name.as_str()), Some("C"));
        assert!(t.team(1).unwrap().eliminated);
        assert!(t.team(2).unwrap().eliminated);
    }

    #[test]
    fn test_register_after_lock_fails() {
        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        t.lock(Utc::now()).unwrap();
        assert_eq!(
            t.register_team(NewTeam::new("D", "d_lead"), Utc::now()),
            Err(TournamentError::RegistrationClosed)
        );
        assert_eq!(t.unregister_team(1).unwrap_err(), TournamentError::RegistrationClosed);
    }

    #[test]
    fn test_lock_requires_two_teams() {
        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A"]);
        let before = t.clone();
        assert_eq!(
            t.lock(Utc::now()),
            Err(TournamentError::InsufficientTeams { needed: 2, current: 1 })
        );
        assert_eq!(t, before);
    }

    #[test]
    fn test_manual_start() {
        let config = TournamentConfig::double_elimination("Cup").with_manual_start();
        let mut t = open(config, &["A", "B", "C", "D"]);
        let now = Utc::now();

        assert!(matches!(
            t.start(now),
            Err(TournamentError::InvalidTransition { action: "start", status: TournamentStatus::Open })
        ));
        t.lock(now).unwrap();
        assert_eq!(t.status, TournamentStatus::Locked);
        assert!(t.bracket().is_none());

        t.start(now).unwrap();
        assert_eq!(t.status, TournamentStatus::InProgress);
        assert!(t.bracket().is_some());
        assert!(matches!(t.start(now), Err(TournamentError::InvalidTransition { .. })));
    }

    #[test]
    fn test_capacity() {
        let mut t = open(TournamentConfig::single_elimination("Cup").with_max_teams(2), &["A", "B"]);
        assert_eq!(
            t.register_team(NewTeam::new("C", "c_lead"), Utc::now()),
            Err(TournamentError::TournamentFull(2))
        );
    }

    #[test]
    fn test_cancel_only_before_start() {
        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        t.lock(Utc::now()).unwrap();
        assert!(matches!(
            t.cancel(Utc::now()),
            Err(TournamentError::InvalidTransition { action: "cancel", status: TournamentStatus::InProgress })
        ));

        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        t.cancel(Utc::now()).unwrap();
        assert_eq!(t.status, TournamentStatus::Cancelled);
        assert!(matches!(t.lock(Utc::now()), Err(TournamentError::InvalidTransition { .. })));
        assert_eq!(
            t.register_team(NewTeam::new("C", "c_lead"), Utc::now()),
            Err(TournamentError::RegistrationClosed)
        );
    }

    #[test]
    fn test_results_rejected_before_start() {
        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        assert!(matches!(
            t.submit_result(0, 1, Utc::now()),
            Err(TournamentError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_undo_after_complete_rejected() {
        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        let now = Utc::now();
        t.lock(now).unwrap();
        t.submit_result(0, 2, now).unwrap();
        assert_eq!(t.status, TournamentStatus::Complete);
        assert!(matches!(
            t.undo_result(0),
            Err(TournamentError::InvalidTransition { status: TournamentStatus::Complete, .. })
        ));
    }

    #[test]
    fn test_undo_clears_elimination() {
        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A", "B", "C", "D"]);
        let now = Utc::now();
        t.lock(now).unwrap();
        t.submit_result(0, 1, now).unwrap();
        assert!(t.team(4).unwrap().eliminated);

        t.undo_result(0).unwrap();
        assert!(!t.team(4).unwrap().eliminated);
        assert_eq!(
            t.undo_result(9),
            Err(TournamentError::NotFound(Entity::Match(9)))
        );
    }

    #[test]
    fn test_standings_and_info() {
        let mut t = open(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        let now = Utc::now();
        t.lock(now).unwrap();
        t.submit_result(0, 1, now).unwrap();

        let standings = t.standings();
        assert_eq!(standings[0].wins, 1);
        assert_eq!(standings[1].losses, 1);
        assert!(standings[1].eliminated);

        let info = t.info();
        assert_eq!(info.status, TournamentStatus::Complete);
        assert_eq!(info.champion_name.as_deref(), Some("A"));
        assert_eq!(info.team_count, 2);
    }
}
