//! Bracket construction from an ordered team list.
//!
//! Building is pure: the same teams, format and seeding always produce the
//! same match graph, so a bracket can be re-derived from a persisted roster.

use super::ledger::settle_byes;
use super::models::{Bracket, BracketSide, Match, MatchId, SeedingMethod, Slot, TournamentFormat};
use crate::roster::TeamId;
use crate::tournament::errors::{TournamentError, TournamentResult};
use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Minimum number of teams needed for a bracket
pub const MIN_TEAMS: usize = 2;

/// Seed numbers (1-based) in bracket-position order for a bracket of `size` slots
///
/// Adjacent positions play each other in the first round, so seed 1 meets
/// seed `size`, seed 2 meets seed `size - 1`, and the top seeds can only meet
/// in late rounds.
pub fn seed_positions(size: usize) -> Vec<usize> {
    let mut seeds = vec![1usize];
    while seeds.len() < size {
        let mirror = seeds.len() * 2 + 1;
        seeds = seeds.iter().flat_map(|&seed| [seed, mirror - seed]).collect();
    }
    seeds
}

/// Losers-bracket round (0-indexed) that receives the losers of winners round `winners_round`
///
/// Round 0 losers play each other in losers round 0. From winners round 1 on,
/// losers drop into the odd losers rounds, where they face the survivors of
/// the losers round just before.
pub fn losers_drop_round(winners_round: usize) -> usize {
    if winners_round == 0 {
        0
    } else {
        2 * winners_round - 1
    }
}

/// Build a bracket and settle its first-round byes
///
/// # Arguments
///
/// * `teams` - Team IDs in registry order
/// * `format` - Single or double elimination
/// * `seeding` - How registry order maps to first-round positions
/// * `built_at` - Timestamp recorded on bye matches
///
/// # Errors
///
/// - `InsufficientTeams` if fewer than two teams are given
pub fn build_bracket(
    teams: &[TeamId],
    format: TournamentFormat,
    seeding: SeedingMethod,
    built_at: DateTime<Utc>,
) -> TournamentResult<Bracket> {
    if teams.len() < MIN_TEAMS {
        return Err(TournamentError::InsufficientTeams {
            needed: MIN_TEAMS,
            current: teams.len(),
        });
    }

    let size = teams.len().next_power_of_two();
    let positions = first_round_positions(teams, size, seeding);
    let mut layout = Layout::default();

    let mut winners: Vec<Vec<MatchId>> = vec![
        positions
            .chunks(2)
            .enumerate()
            .map(|(index, pair)| layout.push(BracketSide::Winners, 0, index, [pair[0], pair[1]]))
            .collect(),
    ];
    while let Some(prev) = winners.last().filter(|round| round.len() > 1).cloned() {
        let round = winners.len();
        let ids = prev
            .chunks(2)
            .enumerate()
            .map(|(index, pair)| {
                layout.push(
                    BracketSide::Winners,
                    round,
                    index,
                    [Slot::winner_of(pair[0]), Slot::winner_of(pair[1])],
                )
            })
            .collect();
        winners.push(ids);
    }

    let mut losers: Vec<Vec<MatchId>> = Vec::new();
    let mut grand_final = None;
    let mut bracket_reset = None;

    if format == TournamentFormat::DoubleElimination {
        for winners_round in 1..winners.len() {
            let major = losers_drop_round(winners_round);
            let minor = major - 1;

            let feeders: Vec<Slot> = if winners_round == 1 {
                winners[0].iter().map(|&id| Slot::loser_of(id)).collect()
            } else {
                losers
                    .last()
                    .map(|round| round.iter().map(|&id| Slot::winner_of(id)).collect())
                    .unwrap_or_default()
            };
            let minor_ids: Vec<MatchId> = feeders
                .chunks(2)
                .enumerate()
                .map(|(index, pair)| layout.push(BracketSide::Losers, minor, index, [pair[0], pair[1]]))
                .collect();

            let major_ids: Vec<MatchId> = minor_ids
                .iter()
                .zip(&winners[winners_round])
                .enumerate()
                .map(|(index, (&survivor, &dropped))| {
                    layout.push(
                        BracketSide::Losers,
                        major,
                        index,
                        [Slot::winner_of(survivor), Slot::loser_of(dropped)],
                    )
                })
                .collect();

            losers.push(minor_ids);
            losers.push(major_ids);
        }

        let winners_final = winners.last().and_then(|round| round.first()).copied();
        let losers_final = losers.last().and_then(|round| round.first()).copied();
        if let Some(winners_final) = winners_final {
            let challenger = match losers_final {
                Some(id) => Slot::winner_of(id),
                None => Slot::loser_of(winners_final),
            };
            let first = layout.push(
                BracketSide::GrandFinal,
                0,
                0,
                [Slot::winner_of(winners_final), challenger],
            );
            let reset = layout.push(
                BracketSide::GrandFinal,
                1,
                0,
                [Slot::winner_of(first), Slot::loser_of(first)],
            );
            layout.matches[reset as usize].bracket_reset = true;
            grand_final = Some(first);
            bracket_reset = Some(reset);
        }
    }

    let mut bracket = Bracket {
        format,
        size,
        matches: layout.matches,
        winners,
        losers,
        grand_final,
        bracket_reset,
    };
    settle_byes(&mut bracket, built_at);

    log::debug!(
        "Built {} bracket: {} teams, {} slots, {} matches",
        format,
        teams.len(),
        size,
        bracket.matches.len()
    );

    Ok(bracket)
}

/// First-round slots in bracket-position order
fn first_round_positions(teams: &[TeamId], size: usize, seeding: SeedingMethod) -> Vec<Slot> {
    match seeding {
        SeedingMethod::Standard => fold_positions(teams, size),
        SeedingMethod::Shuffled { seed } => {
            let mut order = teams.to_vec();
            order.shuffle(&mut StdRng::seed_from_u64(seed));
            fold_positions(&order, size)
        }
        SeedingMethod::Sequential => {
            let byes = size - teams.len();
            let paired = teams.len() - byes;
            let mut slots: Vec<Slot> = teams[..paired].iter().map(|&id| Slot::team(id)).collect();
            for &id in &teams[paired..] {
                slots.push(Slot::team(id));
                slots.push(Slot::Bye);
            }
            slots
        }
    }
}

fn fold_positions(seeded: &[TeamId], size: usize) -> Vec<Slot> {
    seed_positions(size)
        .into_iter()
        .map(|seed| seeded.get(seed - 1).map_or(Slot::Bye, |&id| Slot::team(id)))
        .collect()
}

#[derive(Default)]
struct Layout {
    matches: Vec<Match>,
}

impl Layout {
    fn push(&mut self, side: BracketSide, round: usize, index: usize, sources: [Slot; 2]) -> MatchId {
        let id = self.matches.len() as MatchId;
        self.matches
            .push(Match::new(id, side, round as u32, index as u32, sources));
        id
    }
}
