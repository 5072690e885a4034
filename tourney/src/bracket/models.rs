//! Bracket data models: matches, slots and results.

use crate::roster::TeamId;
use crate::tournament::errors::TournamentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Match ID type (index into the bracket's match list)
pub type MatchId = u32;

/// Elimination format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// One loss eliminates
    SingleElimination,
    /// Two losses eliminate; losers bracket plus grand final
    DoubleElimination,
}

impl TournamentFormat {
    /// Losses that knock a team out
    pub fn elimination_losses(self) -> u32 {
        match self {
            TournamentFormat::SingleElimination => 1,
            TournamentFormat::DoubleElimination => 2,
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentFormat::SingleElimination => write!(f, "single_elimination"),
            TournamentFormat::DoubleElimination => write!(f, "double_elimination"),
        }
    }
}

impl FromStr for TournamentFormat {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "single" | "single_elimination" | "se" => Ok(TournamentFormat::SingleElimination),
            "double" | "double_elimination" | "de" => Ok(TournamentFormat::DoubleElimination),
            _ => Err(TournamentError::InvalidFormat(s.to_string())),
        }
    }
}

/// How registry order is turned into first-round positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Registry order as seed order, fold pairing (1 vs s, 2 vs s-1, ...)
    #[default]
    Standard,
    /// Registry-adjacent teams face each other; trailing teams get the byes
    Sequential,
    /// Registry order shuffled with a fixed RNG seed, then fold pairing
    Shuffled { seed: u64 },
}

/// Part of the bracket a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    GrandFinal,
}

/// Which outcome of an earlier match fills a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Winner,
    Loser,
}

/// Occupant of one side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slot {
    /// A registered team
    Team { team_id: TeamId },
    /// Empty position; the opponent advances without playing
    Bye,
    /// Waiting on the outcome of another match
    PendingOn { match_id: MatchId, feed: Feed },
}

impl Slot {
    /// Team slot
    pub fn team(team_id: TeamId) -> Self {
        Slot::Team { team_id }
    }

    /// Slot filled by the winner of a match
    pub fn winner_of(match_id: MatchId) -> Self {
        Slot::PendingOn {
            match_id,
            feed: Feed::Winner,
        }
    }

    /// Slot filled by the loser of a match
    pub fn loser_of(match_id: MatchId) -> Self {
        Slot::PendingOn {
            match_id,
            feed: Feed::Loser,
        }
    }

    /// Whether the occupant is known (a team or a bye)
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Slot::PendingOn { .. })
    }

    /// Team ID if the slot holds a team
    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            Slot::Team { team_id } => Some(*team_id),
            _ => None,
        }
    }
}

/// Outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchResult {
    /// The team advanced (played, or against a bye)
    Winner { team_id: TeamId },
    /// Both teams lose (losers bracket only)
    DoubleLoss,
    /// Nobody advances: bye against bye, or a bracket reset that was not needed
    Void,
}

/// Per-match lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// At least one participant is still unknown
    Pending,
    /// Both participants known, waiting for a result
    Ready,
    /// Result recorded
    Resolved,
}

/// A single bracket match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Match ID
    pub id: MatchId,
    /// Bracket side
    pub side: BracketSide,
    /// Round within the side (0-indexed)
    pub round: u32,
    /// Position within the round (0-indexed)
    pub index: u32,
    /// Slot occupants as built; what an undo restores
    pub sources: [Slot; 2],
    /// Current slot occupants
    pub participants: [Slot; 2],
    /// Result, once decided
    pub result: Option<MatchResult>,
    /// When the result was recorded
    pub completed_at: Option<DateTime<Utc>>,
    /// Result came from a bye (or an unneeded reset), not a submission
    pub auto_resolved: bool,
    /// Second grand final, only played if the losers-bracket champion wins the first
    pub bracket_reset: bool,
}

impl Match {
    pub(crate) fn new(id: MatchId, side: BracketSide, round: u32, index: u32, sources: [Slot; 2]) -> Self {
        Self {
            id,
            side,
            round,
            index,
            sources,
            participants: sources,
            result: None,
            completed_at: None,
            auto_resolved: false,
            bracket_reset: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> MatchState {
        if self.result.is_some() {
            MatchState::Resolved
        } else if self.participants.iter().all(Slot::is_resolved) {
            MatchState::Ready
        } else {
            MatchState::Pending
        }
    }

    /// Whether a result was submitted for this match (as opposed to auto-resolved)
    pub fn is_submitted(&self) -> bool {
        self.result.is_some() && !self.auto_resolved
    }

    /// Whether the team currently occupies one of the slots
    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.participants.contains(&Slot::team(team_id))
    }

    /// Winning team, if decided
    pub fn winner(&self) -> Option<TeamId> {
        match self.result {
            Some(MatchResult::Winner { team_id }) => Some(team_id),
            _ => None,
        }
    }

    /// Losing team of a decided match, if there was a real opponent
    pub fn loser(&self) -> Option<TeamId> {
        self.outcome(Feed::Loser).team_id()
    }

    /// Occupant this match hands to a slot fed by it
    ///
    /// Only meaningful once the match is resolved; unresolved matches feed
    /// a pending slot.
    pub fn outcome(&self, feed: Feed) -> Slot {
        match (self.result, feed) {
            (None, _) => Slot::PendingOn {
                match_id: self.id,
                feed,
            },
            (Some(MatchResult::Winner { team_id }), Feed::Winner) => Slot::team(team_id),
            (Some(MatchResult::Winner { team_id }), Feed::Loser) => self
                .participants
                .iter()
                .copied()
                .find(|slot| *slot != Slot::team(team_id))
                .unwrap_or(Slot::Bye),
            (Some(MatchResult::DoubleLoss | MatchResult::Void), _) => Slot::Bye,
        }
    }

    /// Short label, e.g. `W1-M2`, `L3-M1`, `GF`, `GF-R`
    pub fn label(&self) -> String {
        match self.side {
            BracketSide::Winners => format!("W{}-M{}", self.round + 1, self.index + 1),
            BracketSide::Losers => format!("L{}-M{}", self.round + 1, self.index + 1),
            BracketSide::GrandFinal if self.bracket_reset => "GF-R".to_string(),
            BracketSide::GrandFinal => "GF".to_string(),
        }
    }
}

/// Win/loss record of a team in the bracket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Matches won (byes excluded)
    pub wins: u32,
    /// Matches lost
    pub losses: u32,
}

/// Full bracket: match graph plus round structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Elimination format
    pub format: TournamentFormat,
    /// First-round slot count (power of two)
    pub size: usize,
    /// All matches, indexed by ID
    pub matches: Vec<Match>,
    /// Winners-bracket rounds
    pub winners: Vec<Vec<MatchId>>,
    /// Losers-bracket rounds (double elimination)
    pub losers: Vec<Vec<MatchId>>,
    /// First grand final (double elimination)
    pub grand_final: Option<MatchId>,
    /// Bracket-reset grand final (double elimination)
    pub bracket_reset: Option<MatchId>,
}

impl Bracket {
    /// Look up a match
    pub fn get(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.get(match_id as usize)
    }

    /// Matches of one round, in slot order
    pub fn round(&self, side: BracketSide, round: usize) -> Vec<&Match> {
        let rounds = match side {
            BracketSide::Winners => &self.winners,
            BracketSide::Losers => &self.losers,
            BracketSide::GrandFinal => {
                return self
                    .grand_final
                    .iter()
                    .chain(self.bracket_reset.iter())
                    .filter_map(|id| self.get(*id))
                    .filter(|m| m.round as usize == round)
                    .collect();
            }
        };
        rounds
            .get(round)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    /// The match whose winner is the winners-bracket champion
    pub fn winners_final(&self) -> Option<&Match> {
        self.winners
            .last()
            .and_then(|round| round.first())
            .and_then(|id| self.get(*id))
    }

    /// Whether the bracket has produced its champion
    pub fn is_complete(&self) -> bool {
        match self.format {
            TournamentFormat::SingleElimination => {
                self.winners_final().is_some_and(|m| m.result.is_some())
            }
            TournamentFormat::DoubleElimination => self
                .bracket_reset
                .and_then(|id| self.get(id))
                .is_some_and(|m| m.result.is_some()),
        }
    }

    /// The match that decided the champion, once complete
    fn deciding_match(&self) -> Option<&Match> {
        if !self.is_complete() {
            return None;
        }
        match self.format {
            TournamentFormat::SingleElimination => self.winners_final(),
            TournamentFormat::DoubleElimination => {
                let reset = self.bracket_reset.and_then(|id| self.get(id))?;
                if reset.result == Some(MatchResult::Void) {
                    self.grand_final.and_then(|id| self.get(id))
                } else {
                    Some(reset)
                }
            }
        }
    }

    /// Tournament champion, once complete
    pub fn champion(&self) -> Option<TeamId> {
        self.deciding_match().and_then(Match::winner)
    }

    /// Runner-up, once complete
    pub fn runner_up(&self) -> Option<TeamId> {
        self.deciding_match().and_then(Match::loser)
    }

    /// Matches currently waiting for a result
    pub fn ready_matches(&self) -> Vec<&Match> {
        self.matches
            .iter()
            .filter(|m| m.state() == MatchState::Ready)
            .collect()
    }

    /// Number of matches with a submitted result
    pub fn submitted_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_submitted()).count()
    }
}
