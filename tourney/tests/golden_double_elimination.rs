//! Golden layouts for double-elimination brackets
//!
//! The losers-bracket drop-down order is pinned here for 4, 8 and 16 teams,
//! and the full bracket is played through to check the grand final and the
//! bracket reset.

use chrono::Utc;
use tourney::bracket::{
    Bracket, BracketSide, Feed, MatchLedger, MatchResult, MatchState, SeedingMethod, Slot,
    TournamentFormat, build_bracket, losers_drop_round,
};

fn double(n: u32) -> Bracket {
    let teams: Vec<u32> = (1..=n).collect();
    build_bracket(
        &teams,
        TournamentFormat::DoubleElimination,
        SeedingMethod::Standard,
        Utc::now(),
    )
    .unwrap()
}

fn slot(bracket: &Bracket, slot: Slot) -> String {
    match slot {
        Slot::Team { team_id } => format!("#{team_id}"),
        Slot::Bye => "BYE".to_string(),
        Slot::PendingOn { match_id, feed } => {
            let label = bracket.get(match_id).unwrap().label();
            match feed {
                Feed::Winner => format!("W({label})"),
                Feed::Loser => format!("L({label})"),
            }
        }
    }
}

fn describe(bracket: &Bracket) -> Vec<String> {
    bracket
        .matches
        .iter()
        .map(|m| {
            format!(
                "{}: {} vs {}",
                m.label(),
                slot(bracket, m.sources[0]),
                slot(bracket, m.sources[1])
            )
        })
        .collect()
}

#[test]
fn test_four_team_layout() {
    assert_eq!(
        describe(&double(4)),
        vec![
            "W1-M1: #1 vs #4",
            "W1-M2: #2 vs #3",
            "W2-M1: W(W1-M1) vs W(W1-M2)",
            "L1-M1: L(W1-M1) vs L(W1-M2)",
            "L2-M1: W(L1-M1) vs L(W2-M1)",
            "GF: W(W2-M1) vs W(L2-M1)",
            "GF-R: W(GF) vs L(GF)",
        ]
    );
}

#[test]
fn test_eight_team_layout() {
    assert_eq!(
        describe(&double(8)),
        vec![
            "W1-M1: #1 vs #8",
            "W1-M2: #4 vs #5",
            "W1-M3: #2 vs #7",
            "W1-M4: #3 vs #6",
            "W2-M1: W(W1-M1) vs W(W1-M2)",
            "W2-M2: W(W1-M3) vs W(W1-M4)",
            "W3-M1: W(W2-M1) vs W(W2-M2)",
            "L1-M1: L(W1-M1) vs L(W1-M2)",
            "L1-M2: L(W1-M3) vs L(W1-M4)",
            "L2-M1: W(L1-M1) vs L(W2-M1)",
            "L2-M2: W(L1-M2) vs L(W2-M2)",
            "L3-M1: W(L2-M1) vs W(L2-M2)",
            "L4-M1: W(L3-M1) vs L(W3-M1)",
            "GF: W(W3-M1) vs W(L4-M1)",
            "GF-R: W(GF) vs L(GF)",
        ]
    );
}

#[test]
fn test_sixteen_team_layout() {
    assert_eq!(
        describe(&double(16)),
        vec![
            "W1-M1: #1 vs #16",
            "W1-M2: #8 vs #9",
            "W1-M3: #4 vs #13",
            "W1-M4: #5 vs #12",
            "W1-M5: #2 vs #15",
            "W1-M6: #7 vs #10",
            "W1-M7: #3 vs #14",
            "W1-M8: #6 vs #11",
            "W2-M1: W(W1-M1) vs W(W1-M2)",
            "W2-M2: W(W1-M3) vs W(W1-M4)",
            "W2-M3: W(W1-M5) vs W(W1-M6)",
            "W2-M4: W(W1-M7) vs W(W1-M8)",
            "W3-M1: W(W2-M1) vs W(W2-M2)",
            "W3-M2: W(W2-M3) vs W(W2-M4)",
            "W4-M1: W(W3-M1) vs W(W3-M2)",
            "L1-M1: L(W1-M1) vs L(W1-M2)",
            "L1-M2: L(W1-M3) vs L(W1-M4)",
            "L1-M3: L(W1-M5) vs L(W1-M6)",
            "L1-M4: L(W1-M7) vs L(W1-M8)",
            "L2-M1: W(L1-M1) vs L(W2-M1)",
            "L2-M2: W(L1-M2) vs L(W2-M2)",
            "L2-M3: W(L1-M3) vs L(W2-M3)",
            "L2-M4: W(L1-M4) vs L(W2-M4)",
            "L3-M1: W(L2-M1) vs W(L2-M2)",
            "L3-M2: W(L2-M3) vs W(L2-M4)",
            "L4-M1: W(L3-M1) vs L(W3-M1)",
            "L4-M2: W(L3-M2) vs L(W3-M2)",
            "L5-M1: W(L4-M1) vs W(L4-M2)",
            "L6-M1: W(L5-M1) vs L(W4-M1)",
            "GF: W(W4-M1) vs W(L6-M1)",
            "GF-R: W(GF) vs L(GF)",
        ]
    );
}

#[test]
fn test_losers_enter_at_drop_round() {
    for n in [4, 8, 16, 32] {
        let bracket = double(n);
        for (losers_round, ids) in bracket.losers.iter().enumerate() {
            for id in ids {
                let m = bracket.get(*id).unwrap();
                for source in m.sources {
                    if let Slot::PendingOn { match_id, feed: Feed::Loser } = source {
                        let feeder = bracket.get(match_id).unwrap();
                        assert_eq!(feeder.side, BracketSide::Winners);
                        assert_eq!(
                            losers_drop_round(feeder.round as usize),
                            losers_round,
                            "{} feeds {}",
                            feeder.label(),
                            m.label()
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_match_counts() {
    for n in [2u32, 4, 8, 16, 32] {
        let bracket = double(n);
        let s = n as usize;
        // every team but the champion loses twice, plus the grand final pair
        assert_eq!(bracket.matches.len(), 2 * s - 1, "n = {n}");
        assert_eq!(bracket.losers.len(), 2 * (bracket.winners.len() - 1));
    }
}

/// Play every ready match with the lower team ID winning
fn play_out(ledger: &mut MatchLedger) {
    let now = Utc::now();
    loop {
        let next = ledger.current_state().ready_matches().first().map(|m| (*m).clone());
        let Some(m) = next else {
            break;
        };
        let mut teams: Vec<u32> = m.participants.iter().filter_map(Slot::team_id).collect();
        teams.sort_unstable();
        ledger.submit_result(m.id, teams[0], now).unwrap();
    }
}

#[test]
fn test_winners_champion_takes_first_grand_final() {
    let mut ledger = MatchLedger::new(double(8));
    play_out(&mut ledger);

    let bracket = ledger.current_state();
    let reset = bracket.get(bracket.bracket_reset.unwrap()).unwrap();
    assert_eq!(reset.result, Some(MatchResult::Void));
    assert!(reset.auto_resolved);
    assert!(ledger.is_complete());
    assert_eq!(ledger.champion(), Some(1));
    // seed 2 loses W3-M1, then wins the losers bracket
    assert_eq!(bracket.runner_up(), Some(2));
}

#[test]
fn test_losers_champion_forces_bracket_reset() {
    let mut ledger = MatchLedger::new(double(4));
    let now = Utc::now();

    // 1 and 2 win round one, 1 wins the winners final
    ledger.submit_result(0, 1, now).unwrap();
    ledger.submit_result(1, 2, now).unwrap();
    ledger.submit_result(2, 1, now).unwrap();
    // 3 beats 4, then 2 beats 3 in the losers final
    ledger.submit_result(3, 3, now).unwrap();
    ledger.submit_result(4, 2, now).unwrap();

    let gf = ledger.current_state().grand_final.unwrap();
    let reset = ledger.current_state().bracket_reset.unwrap();
    assert_eq!(
        ledger.current_state().get(gf).unwrap().participants,
        [Slot::team(1), Slot::team(2)]
    );

    ledger.submit_result(gf, 2, now).unwrap();
    assert!(!ledger.is_complete());
    assert_eq!(ledger.match_state(reset).unwrap(), MatchState::Ready);
    assert_eq!(
        ledger.current_state().get(reset).unwrap().participants,
        [Slot::team(2), Slot::team(1)]
    );

    ledger.submit_result(reset, 2, now).unwrap();
    assert!(ledger.is_complete());
    assert_eq!(ledger.champion(), Some(2));
    assert_eq!(ledger.current_state().runner_up(), Some(1));
    assert_eq!(ledger.eliminated().len(), 3);
}

#[test]
fn test_byes_flow_into_losers_bracket() {
    // 5 teams in 8 slots: seeds 1-3 get byes, so their "losers" are byes too
    let teams: Vec<u32> = (1..=5).collect();
    let mut ledger = MatchLedger::new(
        build_bracket(
            &teams,
            TournamentFormat::DoubleElimination,
            SeedingMethod::Standard,
            Utc::now(),
        )
        .unwrap(),
    );

    let bracket = ledger.current_state();
    let l1: Vec<_> = bracket.round(BracketSide::Losers, 0);
    // L1-M1 takes the losers of (1 vs BYE) and (4 vs 5): waits on the real match
    assert_eq!(l1[0].participants[0], Slot::Bye);
    assert_eq!(l1[0].state(), MatchState::Pending);
    // L1-M2 takes two byes and voids itself
    assert_eq!(l1[1].result, Some(MatchResult::Void));

    ledger.submit_result(1, 4, Utc::now()).unwrap();
    let l1 = ledger.current_state().round(BracketSide::Losers, 0);
    assert_eq!(l1[0].winner(), Some(5));
    assert!(l1[0].auto_resolved);

    play_out(&mut ledger);
    assert!(ledger.is_complete());
    assert_eq!(ledger.champion(), Some(1));
}
