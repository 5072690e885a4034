//! Tournament data models.

use crate::bracket::{MIN_TEAMS, MatchLedger, SeedingMethod, TournamentFormat};
use crate::roster::{RosterRegistry, TeamId};
use super::errors::{TournamentError, TournamentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tournament ID type
pub type TournamentId = i64;

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting registrations
    Open,
    /// Registration closed, bracket not built yet
    Locked,
    /// Bracket built, accepting results
    InProgress,
    /// Champion decided
    Complete,
    /// Cancelled before any result was recorded
    Cancelled,
}

impl TournamentStatus {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Complete | TournamentStatus::Cancelled)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Open => "open",
            TournamentStatus::Locked => "locked",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Complete => "complete",
            TournamentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Tournament configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Display name
    pub name: String,
    /// Single or double elimination
    pub format: TournamentFormat,
    /// First-round seeding
    #[serde(default)]
    pub seeding: SeedingMethod,
    /// Team capacity (unlimited if unset)
    #[serde(default)]
    pub max_teams: Option<usize>,
    /// Build the bracket as part of locking
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

fn default_auto_start() -> bool {
    true
}

impl TournamentConfig {
    /// Single-elimination tournament with default seeding
    pub fn single_elimination(name: impl Into<String>) -> Self {
        Self::new(name, TournamentFormat::SingleElimination)
    }

    /// Double-elimination tournament with default seeding
    pub fn double_elimination(name: impl Into<String>) -> Self {
        Self::new(name, TournamentFormat::DoubleElimination)
    }

    fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            name: name.into(),
            format,
            seeding: SeedingMethod::Standard,
            max_teams: None,
            auto_start: true,
        }
    }

    /// Set the seeding method
    pub fn with_seeding(mut self, seeding: SeedingMethod) -> Self {
        self.seeding = seeding;
        self
    }

    /// Cap the number of teams
    pub fn with_max_teams(mut self, max_teams: usize) -> Self {
        self.max_teams = Some(max_teams);
        self
    }

    /// Keep the tournament in Locked until an explicit start
    pub fn with_manual_start(mut self) -> Self {
        self.auto_start = false;
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank name or a capacity below two teams
    pub fn validate(&self) -> TournamentResult<()> {
        if self.name.trim().is_empty() {
            return Err(TournamentError::InvalidInput("tournament name is empty".to_string()));
        }
        match self.max_teams {
            Some(max) if max < MIN_TEAMS => Err(TournamentError::InvalidInput(format!(
                "max_teams must be at least {MIN_TEAMS}, got {max}"
            ))),
            _ => Ok(()),
        }
    }
}

/// A tournament: lifecycle, roster and (once built) bracket
///
/// Mutations go through the methods in `state_machine`; this struct is also
/// the unit that gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament ID
    pub id: TournamentId,
    /// Configuration
    pub config: TournamentConfig,
    /// Identity of the organizer who created it
    pub organizer: String,
    /// Lifecycle status
    pub status: TournamentStatus,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Registration closed at
    pub locked_at: Option<DateTime<Utc>>,
    /// Bracket built at
    pub started_at: Option<DateTime<Utc>>,
    /// Completed or cancelled at
    pub finished_at: Option<DateTime<Utc>>,
    pub(crate) registry: RosterRegistry,
    pub(crate) ledger: Option<MatchLedger>,
}

/// Tournament summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentInfo {
    /// Tournament ID
    pub id: TournamentId,
    /// Display name
    pub name: String,
    /// Elimination format
    pub format: TournamentFormat,
    /// Lifecycle status
    pub status: TournamentStatus,
    /// Organizer identity
    pub organizer: String,
    /// Registered teams
    pub team_count: usize,
    /// Team capacity
    pub max_teams: Option<usize>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Started at timestamp
    pub started_at: Option<DateTime<Utc>>,
    /// Finished at timestamp
    pub finished_at: Option<DateTime<Utc>>,
    /// Champion, once complete
    pub champion: Option<TeamId>,
    /// Champion's team name, once complete
    pub champion_name: Option<String>,
}

/// One row of the standings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub name: String,
    pub leader: String,
    pub wins: u32,
    pub losses: u32,
    pub eliminated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = TournamentConfig::double_elimination("Spring Cup")
            .with_seeding(SeedingMethod::Shuffled { seed: 7 })
            .with_max_teams(16)
            .with_manual_start();
        assert_eq!(config.format, TournamentFormat::DoubleElimination);
        assert_eq!(config.seeding, SeedingMethod::Shuffled { seed: 7 });
        assert_eq!(config.max_teams, Some(16));
        assert!(!config.auto_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            TournamentConfig::single_elimination("  ").validate(),
            Err(TournamentError::InvalidInput(_))
        ));
        assert!(matches!(
            TournamentConfig::single_elimination("Cup").with_max_teams(1).validate(),
            Err(TournamentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: TournamentConfig =
            serde_json::from_str(r#"{"name":"Cup","format":"single_elimination"}"#).unwrap();
        assert_eq!(config.seeding, SeedingMethod::Standard);
        assert_eq!(config.max_teams, None);
        assert!(config.auto_start);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TournamentStatus::InProgress.to_string(), "in_progress");
        assert!(TournamentStatus::Cancelled.is_terminal());
        assert!(!TournamentStatus::Locked.is_terminal());
    }
}
