//! Roster registry holding a tournament's teams in registration order.

use super::models::{NewTeam, Team, TeamId, normalize_handle};
use crate::tournament::errors::{Entity, TournamentError, TournamentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Registered teams, insertion order preserved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRegistry {
    teams: Vec<Team>,
    next_team_id: TeamId,
    frozen: bool,
}

impl Default for RosterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterRegistry {
    /// Create an empty, open registry
    pub fn new() -> Self {
        Self {
            teams: Vec::new(),
            next_team_id: 1,
            frozen: false,
        }
    }

    /// Register a team
    ///
    /// # Returns
    ///
    /// * `TournamentResult<usize>` - Registry-order index of the new team
    ///
    /// # Errors
    ///
    /// - `RegistrationClosed` if the registry is frozen
    /// - `DuplicateTeam` if the name or any handle is already registered
    /// - `InvalidInput` if the name or leader is blank
    pub fn register(&mut self, team: NewTeam, registered_at: DateTime<Utc>) -> TournamentResult<usize> {
        if self.frozen {
            return Err(TournamentError::RegistrationClosed);
        }

        let name = team.name.trim().to_string();
        if name.is_empty() {
            return Err(TournamentError::InvalidInput("team name is empty".to_string()));
        }
        if normalize_handle(&team.leader).is_empty() {
            return Err(TournamentError::InvalidInput("team leader is empty".to_string()));
        }

        if self
            .teams
            .iter()
            .any(|t| t.name.to_lowercase() == name.to_lowercase())
        {
            return Err(TournamentError::DuplicateTeam(name));
        }

        // A handle may appear on one roster only, and only once on it
        let mut handles = HashSet::new();
        for handle in std::iter::once(&team.leader).chain(team.members.iter()) {
            let handle = normalize_handle(handle);
            if handle.is_empty() {
                continue;
            }
            if !handles.insert(handle.clone()) && handle != normalize_handle(&team.leader) {
                return Err(TournamentError::DuplicateTeam(format!("@{handle} listed twice")));
            }
            if let Some(owner) = self.teams.iter().find(|t| t.has_handle(&handle)) {
                return Err(TournamentError::DuplicateTeam(format!(
                    "@{handle} already plays for {}",
                    owner.name
                )));
            }
        }

        let id = self.next_team_id;
        self.next_team_id += 1;

        // The leader may also appear in the member list; keep it once
        let leader = normalize_handle(&team.leader);
        let members = team
            .members
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty() && normalize_handle(m) != leader)
            .collect();

        self.teams.push(Team {
            id,
            name,
            leader: team.leader.trim().to_string(),
            members,
            photos: team.photos,
            registered_at,
            eliminated: false,
        });

        Ok(self.teams.len() - 1)
    }

    /// Remove a team while registration is open
    pub fn unregister(&mut self, team_id: TeamId) -> TournamentResult<Team> {
        if self.frozen {
            return Err(TournamentError::RegistrationClosed);
        }

        let index = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::NotFound(Entity::Team(team_id)))?;

        Ok(self.teams.remove(index))
    }

    /// Teams in registry order (the default seed order)
    pub fn list(&self) -> &[Team] {
        &self.teams
    }

    /// Number of registered teams
    pub fn count(&self) -> usize {
        self.teams.len()
    }

    /// Look up a team by ID
    pub fn get(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// Team IDs in registry order
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| t.id).collect()
    }

    /// Teams with the given handle as leader
    pub fn led_by<'a>(&'a self, handle: &str) -> impl Iterator<Item = &'a Team> + use<'a> {
        let handle = normalize_handle(handle);
        self.teams
            .iter()
            .filter(move |t| normalize_handle(&t.leader) == handle)
    }

    /// Close registration
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether registration is closed
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Refresh elimination flags from the ledger
    pub(crate) fn set_eliminated(&mut self, eliminated: &HashSet<TeamId>) {
        for team in &mut self.teams {
            team.eliminated = eliminated.contains(&team.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_register_preserves_order() {
        let mut registry = RosterRegistry::new();
        assert_eq!(registry.register(NewTeam::new("A", "a"), now()).unwrap(), 0);
        assert_eq!(registry.register(NewTeam::new("B", "b"), now()).unwrap(), 1);
        assert_eq!(registry.register(NewTeam::new("C", "c"), now()).unwrap(), 2);

        let names: Vec<_> = registry.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = RosterRegistry::new();
        registry.register(NewTeam::new("Rockets", "a"), now()).unwrap();
        let err = registry
            .register(NewTeam::new("rockets", "b"), now())
            .unwrap_err();
        assert!(matches!(err, TournamentError::DuplicateTeam(_)));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_overlapping_handles_rejected() {
        let mut registry = RosterRegistry::new();
        registry
            .register(NewTeam::new("A", "lead").with_members(["@Piper"]), now())
            .unwrap();
        let err = registry
            .register(NewTeam::new("B", "other").with_members(["piper"]), now())
            .unwrap_err();
        assert!(matches!(err, TournamentError::DuplicateTeam(_)));
    }

    #[test]
    fn test_leader_in_member_list_kept_once() {
        let mut registry = RosterRegistry::new();
        registry
            .register(NewTeam::new("A", "@lead").with_members(["lead", "x"]), now())
            .unwrap();
        assert_eq!(registry.list()[0].members, vec!["x".to_string()]);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut registry = RosterRegistry::new();
        let err = registry.register(NewTeam::new("  ", "a"), now()).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidInput(_)));
    }

    #[test]
    fn test_frozen_registry_rejects_changes() {
        let mut registry = RosterRegistry::new();
        registry.register(NewTeam::new("A", "a"), now()).unwrap();
        registry.freeze();

        assert_eq!(
            registry.register(NewTeam::new("B", "b"), now()),
            Err(TournamentError::RegistrationClosed)
        );
        assert_eq!(registry.unregister(1), Err(TournamentError::RegistrationClosed));
    }

    #[test]
    fn test_unregister_missing_team() {
        let mut registry = RosterRegistry::new();
        assert_eq!(
            registry.unregister(7),
            Err(TournamentError::NotFound(Entity::Team(7)))
        );
    }

    #[test]
    fn test_reregistration_appends_with_fresh_id() {
        let mut registry = RosterRegistry::new();
        registry.register(NewTeam::new("A", "a"), now()).unwrap();
        registry.register(NewTeam::new("B", "b"), now()).unwrap();
        registry.unregister(1).unwrap();
        let index = registry.register(NewTeam::new("A", "a"), now()).unwrap();

        assert_eq!(index, 1);
        assert_eq!(registry.team_ids(), vec![2, 3]);
    }

    #[test]
    fn test_led_by_matches_normalized_handle() {
        let mut registry = RosterRegistry::new();
        registry.register(NewTeam::new("A", "@Lead"), now()).unwrap();
        registry.register(NewTeam::new("B", "other"), now()).unwrap();
        let led: Vec<_> = registry.led_by("lead").map(|t| t.id).collect();
        assert_eq!(led, vec![1]);
    }
}
