//! Walk a six-team double-elimination tournament from registration to champion.
//!
//! Run with: `cargo run --example bracket_walkthrough`

use chrono::Utc;
use tourney::bracket::{BracketSide, Slot};
use tourney::{NewTeam, Tournament, TournamentConfig};

fn slot_name(tournament: &Tournament, slot: Slot) -> String {
    match slot {
        Slot::Team { team_id } => tournament
            .team(team_id)
            .map_or_else(|| format!("#{team_id}"), |team| team.name.clone()),
        Slot::Bye => "BYE".to_string(),
        Slot::PendingOn { .. } => "TBD".to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let mut cup = Tournament::new(1, TournamentConfig::double_elimination("Walkthrough Cup"), "@organizer", now)?;

    for (name, leader) in [
        ("Rockets", "@ace"),
        ("Comets", "@blaze"),
        ("Meteors", "@cinder"),
        ("Pulsars", "@dash"),
        ("Quasars", "@echo"),
        ("Novas", "@flint"),
    ] {
        cup.register_team(NewTeam::new(name, leader), now)?;
    }
    cup.lock(now)?;

    // Higher seed (lower team ID) wins every match it plays
    loop {
        let next = cup.bracket().and_then(|b| {
            b.ready_matches()
                .first()
                .map(|m| (m.id, m.label(), m.participants))
        });
        let Some((id, label, participants)) = next else {
            break;
        };
        let mut teams: Vec<u32> = participants.iter().filter_map(Slot::team_id).collect();
        teams.sort_unstable();
        println!(
            "{label}: {} vs {} -> {}",
            slot_name(&cup, participants[0]),
            slot_name(&cup, participants[1]),
            slot_name(&cup, Slot::team(teams[0]))
        );
        cup.submit_result(id, teams[0], now)?;
    }

    if let Some(bracket) = cup.bracket() {
        let byes = bracket
            .round(BracketSide::Winners, 0)
            .iter()
            .filter(|m| m.auto_resolved)
            .count();
        println!("{} first-round byes, {} matches in total", byes, bracket.matches.len());
    }
    for standing in cup.standings() {
        println!("{:<8} {}-{}", standing.name, standing.wins, standing.losses);
    }
    println!(
        "Champion: {}",
        cup.champion().map_or("none", |team| team.name.as_str())
    );
    Ok(())
}
