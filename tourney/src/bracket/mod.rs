//! Bracket engine: construction and match progression.
//!
//! [`build_bracket`] turns an ordered team list into a match graph, settling
//! first-round byes on the way. [`MatchLedger`] then owns that graph for the
//! rest of the tournament, recording results and moving teams forward.
//!
//! Slots that wait on an earlier match are [`Slot::PendingOn`] values naming
//! the match and whether its winner or loser fills the slot, so an
//! unresolved participant can be matched on rather than checked for null.

pub mod builder;
pub mod ledger;
pub mod models;

pub use builder::{MIN_TEAMS, build_bracket, losers_drop_round, seed_positions};
pub use ledger::MatchLedger;
pub use models::{
    Bracket, BracketSide, Feed, Match, MatchId, MatchResult, MatchState, SeedingMethod, Slot,
    TeamRecord, TournamentFormat,
};
