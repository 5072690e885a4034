//! Match ledger: result submission, propagation and undo.
//!
//! Every operation validates before it mutates, so a rejected call leaves
//! the bracket exactly as it was. Propagation runs to completion inside the
//! call, including byes that resolve as a consequence.

use super::models::{Bracket, BracketSide, Feed, Match, MatchId, MatchResult, MatchState, Slot, TeamRecord};
use crate::roster::TeamId;
use crate::tournament::errors::{Entity, TournamentError, TournamentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Mutable bracket state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLedger {
    bracket: Bracket,
}

impl MatchLedger {
    /// Wrap a freshly built bracket
    pub fn new(bracket: Bracket) -> Self {
        Self { bracket }
    }

    /// Full bracket with current resolution status
    pub fn current_state(&self) -> &Bracket {
        &self.bracket
    }

    /// Record the winner of a match and advance teams downstream
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `NotFound` if the match does not exist
    /// - `AlreadyResolved` if the match has a result
    /// - `ParticipantsNotResolved` if a slot still waits on another match
    /// - `InvalidParticipant` if `winner` is not playing in the match
    pub fn submit_result(&mut self, match_id: MatchId, winner: TeamId, at: DateTime<Utc>) -> TournamentResult<()> {
        let m = self.ready_match(match_id)?;
        if !m.has_team(winner) {
            return Err(TournamentError::InvalidParticipant {
                match_id,
                detail: format!("team {} is not playing in {}", winner, m.label()),
            });
        }

        self.record(match_id, MatchResult::Winner { team_id: winner }, at);
        Ok(())
    }

    /// Record a double loss on a losers-bracket match
    ///
    /// Both teams are charged a loss and the downstream slot becomes a bye.
    ///
    /// # Errors
    ///
    /// Same checks as [`submit_result`](Self::submit_result); matches outside
    /// the losers bracket fail with `InvalidParticipant`.
    pub fn submit_double_loss(&mut self, match_id: MatchId, at: DateTime<Utc>) -> TournamentResult<()> {
        let m = self.ready_match(match_id)?;
        if m.side != BracketSide::Losers {
            return Err(TournamentError::InvalidParticipant {
                match_id,
                detail: format!("double loss is only allowed in the losers bracket, not {}", m.label()),
            });
        }

        self.record(match_id, MatchResult::DoubleLoss, at);
        Ok(())
    }

    /// Revert a submitted result
    ///
    /// Matches that resolved automatically because of this result (byes, an
    /// unneeded bracket reset) are reverted with it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the match does not exist
    /// - `NoSubmittedResult` if the match has no submitted result
    /// - `DownstreamResolved` if a match fed by it already has a submitted result
    pub fn undo_result(&mut self, match_id: MatchId) -> TournamentResult<()> {
        let m = self
            .bracket
            .get(match_id)
            .ok_or(TournamentError::NotFound(Entity::Match(match_id)))?;
        if !m.is_submitted() {
            return Err(TournamentError::NoSubmittedResult(match_id));
        }

        let mut cleared = vec![match_id];
        let mut stack = vec![match_id];
        while let Some(id) = stack.pop() {
            for (consumer, _, _) in consumers(&self.bracket, id) {
                let downstream = &self.bracket.matches[consumer as usize];
                if downstream.is_submitted() {
                    return Err(TournamentError::DownstreamResolved {
                        match_id,
                        downstream: consumer,
                    });
                }
                if downstream.auto_resolved && !cleared.contains(&consumer) {
                    cleared.push(consumer);
                    stack.push(consumer);
                }
            }
        }

        for &id in &cleared {
            for (consumer, slot, _) in consumers(&self.bracket, id) {
                let m = &mut self.bracket.matches[consumer as usize];
                m.participants[slot] = m.sources[slot];
            }
        }
        for &id in &cleared {
            let m = &mut self.bracket.matches[id as usize];
            m.result = None;
            m.completed_at = None;
            m.auto_resolved = false;
        }

        log::debug!("Undid match {} ({} matches reverted)", match_id, cleared.len());
        Ok(())
    }

    /// Per-match lifecycle state
    pub fn match_state(&self, match_id: MatchId) -> TournamentResult<MatchState> {
        self.bracket
            .get(match_id)
            .map(|m| m.state())
            .ok_or(TournamentError::NotFound(Entity::Match(match_id)))
    }

    /// Whether the champion is decided
    pub fn is_complete(&self) -> bool {
        self.bracket.is_complete()
    }

    /// Champion, once complete
    pub fn champion(&self) -> Option<TeamId> {
        self.bracket.champion()
    }

    /// Whether any result was submitted (byes don't count)
    pub fn has_submitted_results(&self) -> bool {
        self.bracket.matches.iter().any(|m| m.is_submitted())
    }

    /// Wins and losses per team
    ///
    /// Bye advances are not counted as wins.
    pub fn records(&self) -> BTreeMap<TeamId, TeamRecord> {
        let mut records: BTreeMap<TeamId, TeamRecord> = self
            .bracket
            .round(BracketSide::Winners, 0)
            .iter()
            .flat_map(|m| m.participants)
            .filter_map(|slot| slot.team_id())
            .map(|id| (id, TeamRecord::default()))
            .collect();

        for m in &self.bracket.matches {
            match m.result {
                Some(MatchResult::Winner { team_id }) => {
                    if let Some(loser) = m.loser() {
                        records.entry(team_id).or_default().wins += 1;
                        records.entry(loser).or_default().losses += 1;
                    }
                }
                Some(MatchResult::DoubleLoss) => {
                    for id in m.participants.iter().filter_map(Slot::team_id) {
                        records.entry(id).or_default().losses += 1;
                    }
                }
                Some(MatchResult::Void) | None => {}
            }
        }

        records
    }

    /// Teams with enough losses to be out of the tournament
    pub fn eliminated(&self) -> HashSet<TeamId> {
        let limit = self.bracket.format.elimination_losses();
        self.records()
            .into_iter()
            .filter(|(_, record)| record.losses >= limit)
            .map(|(id, _)| id)
            .collect()
    }

    fn ready_match(&self, match_id: MatchId) -> TournamentResult<&Match> {
        let m = self
            .bracket
            .get(match_id)
            .ok_or(TournamentError::NotFound(Entity::Match(match_id)))?;
        if m.result.is_some() {
            return Err(TournamentError::AlreadyResolved(match_id));
        }
        if m.state() != MatchState::Ready {
            return Err(TournamentError::ParticipantsNotResolved(match_id));
        }
        Ok(m)
    }

    fn record(&mut self, match_id: MatchId, result: MatchResult, at: DateTime<Utc>) {
        let m = &mut self.bracket.matches[match_id as usize];
        m.result = Some(result);
        m.completed_at = Some(at);
        m.auto_resolved = false;
        log::debug!("Recorded {:?} for {}", result, m.label());
        propagate(&mut self.bracket, match_id, at);
    }
}

/// Resolve every first-round bye and push the winners forward
pub(crate) fn settle_byes(bracket: &mut Bracket, at: DateTime<Utc>) {
    let first_round = bracket.winners.first().cloned().unwrap_or_default();
    for id in first_round {
        if auto_resolve(bracket, id, at) {
            propagate(bracket, id, at);
        }
    }
}

/// Slots fed by a match: (consumer match, slot index, feed)
fn consumers(bracket: &Bracket, match_id: MatchId) -> Vec<(MatchId, usize, Feed)> {
    bracket
        .matches
        .iter()
        .flat_map(|m| {
            m.sources.iter().enumerate().filter_map(move |(slot, source)| match source {
                Slot::PendingOn { match_id: from, feed } if *from == match_id => Some((m.id, slot, *feed)),
                _ => None,
            })
        })
        .collect()
}

/// Fill the slots fed by a resolved match, cascading through matches that
/// resolve automatically as a result
fn propagate(bracket: &mut Bracket, from: MatchId, at: DateTime<Utc>) {
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        for (consumer, slot, feed) in consumers(bracket, id) {
            let occupant = bracket.matches[id as usize].outcome(feed);
            bracket.matches[consumer as usize].participants[slot] = occupant;
            if auto_resolve(bracket, consumer, at) {
                stack.push(consumer);
            }
        }
    }
}

/// Resolve a ready match that needs no result submission
///
/// Returns true if the match was resolved.
fn auto_resolve(bracket: &mut Bracket, match_id: MatchId, at: DateTime<Utc>) -> bool {
    let Some(m) = bracket.get(match_id) else {
        return false;
    };
    if m.state() != MatchState::Ready {
        return false;
    }

    let result = if m.bracket_reset && reset_unneeded(bracket, m.sources[0]) {
        MatchResult::Void
    } else {
        match m.participants {
            [Slot::Team { team_id }, Slot::Bye] | [Slot::Bye, Slot::Team { team_id }] => {
                MatchResult::Winner { team_id }
            }
            [Slot::Bye, Slot::Bye] => MatchResult::Void,
            _ => return false,
        }
    };

    let m = &mut bracket.matches[match_id as usize];
    m.result = Some(result);
    m.completed_at = Some(at);
    m.auto_resolved = true;
    true
}

/// The reset is only played when the first grand final was lost by the
/// winners-bracket champion
fn reset_unneeded(bracket: &Bracket, first_final: Slot) -> bool {
    let Slot::PendingOn { match_id, .. } = first_final else {
        return false;
    };
    bracket.get(match_id).is_some_and(|gf| {
        let winner = gf.winner();
        winner.is_some() && winner == gf.participants[0].team_id()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::builder::build_bracket;
    use crate::bracket::models::{SeedingMethod, TournamentFormat};

    fn ledger(n: u32, format: TournamentFormat, seeding: SeedingMethod) -> MatchLedger {
        let teams: Vec<TeamId> = (1..=n).collect();
        MatchLedger::new(build_bracket(&teams, format, seeding, Utc::now()).unwrap())
    }

    fn single(n: u32) -> MatchLedger {
        ledger(n, TournamentFormat::SingleElimination, SeedingMethod::Standard)
    }

    fn double(n: u32) -> MatchLedger {
        ledger(n, TournamentFormat::DoubleElimination, SeedingMethod::Standard)
    }

    #[test]
    fn test_submit_propagates_winner() {
        let mut ledger = single(4);
        let now = Utc::now();
        ledger.submit_result(0, 1, now).unwrap();

        let final_match = ledger.current_state().get(2).unwrap();
        assert_eq!(final_match.participants[0], Slot::team(1));
        assert_eq!(final_match.state(), MatchState::Pending);

        ledger.submit_result(1, 3, now).unwrap();
        assert_eq!(ledger.match_state(2).unwrap(), MatchState::Ready);
        ledger.submit_result(2, 3, now).unwrap();
        assert!(ledger.is_complete());
        assert_eq!(ledger.champion(), Some(3));
        assert_eq!(ledger.current_state().runner_up(), Some(1));
    }

    #[test]
    fn test_submit_check_order() {
        let mut ledger = single(4);
        let now = Utc::now();

        assert_eq!(
            ledger.submit_result(99, 1, now),
            Err(TournamentError::NotFound(Entity::Match(99)))
        );
        assert_eq!(
            ledger.submit_result(2, 42, now),
            Err(TournamentError::ParticipantsNotResolved(2))
        );
        assert!(matches!(
            ledger.submit_result(0, 2, now),
            Err(TournamentError::InvalidParticipant { match_id: 0, .. })
        ));

        ledger.submit_result(0, 4, now).unwrap();
        assert_eq!(ledger.submit_result(0, 1, now), Err(TournamentError::AlreadyResolved(0)));
    }

    #[test]
    fn test_failed_submit_leaves_state_untouched() {
        let mut ledger = single(4);
        let before = ledger.clone();
        let _ = ledger.submit_result(0, 3, Utc::now());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut ledger = single(8);
        let before = ledger.clone();
        ledger.submit_result(0, 1, Utc::now()).unwrap();
        ledger.undo_result(0).unwrap();
        assert_eq!(ledger, before);
        assert_eq!(ledger.match_state(0).unwrap(), MatchState::Ready);
    }

    #[test]
    fn test_undo_blocked_by_downstream_result() {
        let mut ledger = single(4);
        let now = Utc::now();
        ledger.submit_result(0, 1, now).unwrap();
        ledger.submit_result(1, 2, now).unwrap();
        ledger.submit_result(2, 1, now).unwrap();

        assert_eq!(
            ledger.undo_result(0),
            Err(TournamentError::DownstreamResolved {
                match_id: 0,
                downstream: 2
            })
        );
    }

    #[test]
    fn test_undo_rejects_byes_and_pending() {
        let mut ledger = single(3);
        // Standard seeding: seed 1 gets the bye in match 0
        assert!(ledger.current_state().get(0).unwrap().auto_resolved);
        assert_eq!(ledger.undo_result(0), Err(TournamentError::NoSubmittedResult(0)));
        assert_eq!(ledger.undo_result(1), Err(TournamentError::NoSubmittedResult(1)));
        assert_eq!(
            ledger.undo_result(7),
            Err(TournamentError::NotFound(Entity::Match(7)))
        );
    }

    #[test]
    fn test_double_loss_only_in_losers_bracket() {
        let mut ledger = double(4);
        let now = Utc::now();
        assert!(matches!(
            ledger.submit_double_loss(0, now),
            Err(TournamentError::InvalidParticipant { .. })
        ));

        ledger.submit_result(0, 1, now).unwrap();
        ledger.submit_result(1, 2, now).unwrap();
        let losers_opener = ledger.current_state().losers[0][0];
        ledger.submit_double_loss(losers_opener, now).unwrap();

        let records = ledger.records();
        assert_eq!(records[&4].losses, 2);
        assert_eq!(records[&3].losses, 2);
        assert!(ledger.eliminated().contains(&3));
        assert!(ledger.eliminated().contains(&4));
    }

    #[test]
    fn test_double_loss_hands_a_bye_downstream() {
        let mut ledger = double(4);
        let now = Utc::now();
        ledger.submit_result(0, 1, now).unwrap();
        ledger.submit_result(1, 2, now).unwrap();
        let losers_opener = ledger.current_state().losers[0][0];
        ledger.submit_double_loss(losers_opener, now).unwrap();

        // Loser of the winners final walks through the losers final
        ledger.submit_result(2, 1, now).unwrap();
        let losers_final = ledger.current_state().losers[1][0];
        let m = ledger.current_state().get(losers_final).unwrap();
        assert!(m.auto_resolved);
        assert_eq!(m.winner(), Some(2));
    }

    #[test]
    fn test_bracket_reset_voided_when_winners_champion_wins() {
        let mut ledger = double(2);
        let now = Utc::now();
        ledger.submit_result(0, 1, now).unwrap();
        let gf = ledger.current_state().grand_final.unwrap();
        ledger.submit_result(gf, 1, now).unwrap();

        let reset = ledger.current_state().bracket_reset.unwrap();
        assert_eq!(ledger.current_state().get(reset).unwrap().result, Some(MatchResult::Void));
        assert!(ledger.is_complete());
        assert_eq!(ledger.champion(), Some(1));
        assert_eq!(ledger.current_state().runner_up(), Some(2));
    }

    #[test]
    fn test_bracket_reset_played_when_losers_champion_wins() {
        let mut ledger = double(2);
        let now = Utc::now();
        ledger.submit_result(0, 1, now).unwrap();
        let gf = ledger.current_state().grand_final.unwrap();
        ledger.submit_result(gf, 2, now).unwrap();
        assert!(!ledger.is_complete());

        let reset = ledger.current_state().bracket_reset.unwrap();
        assert_eq!(ledger.match_state(reset).unwrap(), MatchState::Ready);
        ledger.submit_result(reset, 2, now).unwrap();
        assert!(ledger.is_complete());
        assert_eq!(ledger.champion(), Some(2));
        assert!(ledger.eliminated().contains(&1));
    }

    #[test]
    fn test_undo_grand_final_reverts_voided_reset() {
        let mut ledger = double(2);
        let now = Utc::now();
        ledger.submit_result(0, 1, now).unwrap();
        let before = ledger.clone();
        let gf = ledger.current_state().grand_final.unwrap();
        ledger.submit_result(gf, 1, now).unwrap();
        ledger.undo_result(gf).unwrap();
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_records_ignore_byes() {
        let mut ledger = single(3);
        let now = Utc::now();
        ledger.submit_result(1, 2, now).unwrap();
        let records = ledger.records();
        assert_eq!(records[&1], TeamRecord::default());
        assert_eq!(records[&2].wins, 1);
        assert_eq!(records[&3].losses, 1);
        assert!(ledger.has_submitted_results());
    }
}
