//! Plain-text bracket, as shown to chat users.

use std::fmt::Write;
use tourney::{BracketSide, Match, MatchResult, Slot, TeamId, Tournament, TournamentFormat};

/// Render the bracket of a tournament, one section per round
///
/// ```text
/// Spring Cup (single_elimination, in_progress)
///
/// --- Round 1 ---
/// Match 1: Rockets vs Comets → 🏆 Rockets
/// Match 2: Owls vs BYE → 🏆 Owls
/// --- Round 2 ---
/// Match 1: Rockets vs Owls
/// ```
pub fn render_bracket(tournament: &Tournament) -> String {
    let mut text = format!(
        "{} ({}, {})\n\n",
        tournament.config.name, tournament.config.format, tournament.status
    );

    let Some(bracket) = tournament.bracket() else {
        text.push_str("Bracket not generated yet.\n");
        return text;
    };

    let double = bracket.format == TournamentFormat::DoubleElimination;
    for (round, _) in bracket.winners.iter().enumerate() {
        let heading = if double {
            format!("Winners Round {}", round + 1)
        } else {
            format!("Round {}", round + 1)
        };
        section(&mut text, &heading, &bracket.round(BracketSide::Winners, round), tournament);
    }
    for (round, _) in bracket.losers.iter().enumerate() {
        let heading = format!("Losers Round {}", round + 1);
        section(&mut text, &heading, &bracket.round(BracketSide::Losers, round), tournament);
    }
    for (heading, id) in [("Grand Final", bracket.grand_final), ("Bracket Reset", bracket.bracket_reset)] {
        let matches: Vec<&Match> = id.and_then(|id| bracket.get(id)).into_iter().collect();
        section(&mut text, heading, &matches, tournament);
    }

    if let Some(champion) = tournament.champion() {
        let _ = writeln!(text, "\nChampion: 🏆 {}", champion.name);
    }
    text
}

fn section(text: &mut String, heading: &str, matches: &[&Match], tournament: &Tournament) {
    if matches.is_empty() {
        return;
    }
    let _ = writeln!(text, "--- {heading} ---");
    for m in matches {
        let _ = writeln!(text, "{}", match_line(m, tournament));
    }
}

fn match_line(m: &Match, tournament: &Tournament) -> String {
    let line = format!(
        "Match {}: {} vs {}",
        m.index + 1,
        slot_name(&m.participants[0], tournament),
        slot_name(&m.participants[1], tournament)
    );
    match m.result {
        Some(MatchResult::Winner { team_id }) => {
            format!("{line} → 🏆 {}", team_name(team_id, tournament))
        }
        Some(MatchResult::DoubleLoss) => format!("{line} → both eliminated"),
        Some(MatchResult::Void) if m.bracket_reset => format!("{line} → not needed"),
        Some(MatchResult::Void) | None => line,
    }
}

fn slot_name(slot: &Slot, tournament: &Tournament) -> String {
    match slot {
        Slot::Team { team_id } => team_name(*team_id, tournament),
        Slot::Bye => "BYE".to_string(),
        Slot::PendingOn { .. } => "TBD".to_string(),
    }
}

fn team_name(team_id: TeamId, tournament: &Tournament) -> String {
    tournament
        .team(team_id)
        .map(|team| team.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tourney::{NewTeam, TournamentConfig};

    fn tournament(config: TournamentConfig, names: &[&str]) -> Tournament {
        let now = Utc::now();
        let mut tournament = Tournament::new(1, config, "alice", now).unwrap();
        for (i, name) in names.iter().enumerate() {
            tournament
                .register_team(NewTeam::new(*name, format!("@lead{i}")), now)
                .unwrap();
        }
        tournament
    }

    #[test]
    fn test_render_before_bracket() {
        let cup = tournament(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        let text = render_bracket(&cup);
        assert!(text.starts_with("Cup (single_elimination, open)"));
        assert!(text.contains("Bracket not generated yet."));
    }

    #[test]
    fn test_render_single_elimination_with_bye() {
        let mut cup = tournament(TournamentConfig::single_elimination("Cup"), &["A", "B", "C"]);
        cup.lock(Utc::now()).unwrap();
        let text = render_bracket(&cup);

        assert!(text.contains("--- Round 1 ---"));
        assert!(text.contains("--- Round 2 ---"));
        assert!(text.contains("vs BYE → 🏆 A"));
        assert!(text.contains("TBD"));
        assert!(!text.contains("Losers"));
    }

    #[test]
    fn test_render_champion() {
        let mut cup = tournament(TournamentConfig::single_elimination("Cup"), &["A", "B"]);
        cup.lock(Utc::now()).unwrap();
        let winner = cup.teams()[1].id;
        cup.submit_result(0, winner, Utc::now()).unwrap();

        let text = render_bracket(&cup);
        assert!(text.contains("Match 1: A vs B → 🏆 B"));
        assert!(text.contains("Champion: 🏆 B"));
    }

    #[test]
    fn test_render_double_elimination_sections() {
        let mut cup = tournament(TournamentConfig::double_elimination("Cup"), &["A", "B", "C", "D"]);
        cup.lock(Utc::now()).unwrap();
        let text = render_bracket(&cup);

        assert!(text.contains("--- Winners Round 1 ---"));
        assert!(text.contains("--- Losers Round 1 ---"));
        assert!(text.contains("--- Grand Final ---"));
        assert!(text.contains("--- Bracket Reset ---"));
    }
}
