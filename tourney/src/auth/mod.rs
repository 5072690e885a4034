//! Authorization collaborator consulted before mutating commands.
//!
//! The engine has no notion of identity; the front-end asks an
//! [`Authorizer`] whether a caller may change a tournament and only then
//! invokes the operation.

use crate::roster::normalize_handle;
use crate::tournament::TournamentId;
use std::collections::HashSet;

/// Capability check for mutating commands
pub trait Authorizer: Send + Sync {
    /// Whether `identity` may mutate the tournament (`None` for creating a new one)
    fn can_mutate(&self, identity: &str, tournament_id: Option<TournamentId>) -> bool;
}

/// Fixed set of admin handles allowed to mutate every tournament
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminList {
    admins: HashSet<String>,
}

impl AdminList {
    /// Build from handles; `@` prefixes and case are ignored
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            admins: admins
                .into_iter()
                .map(|h| normalize_handle(h.as_ref()))
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list, e.g. `"@alice, bob"`
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    /// Number of admins
    pub fn len(&self) -> usize {
        self.admins.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }

    /// Whether a handle is an admin
    pub fn contains(&self, identity: &str) -> bool {
        self.admins.contains(&normalize_handle(identity))
    }
}

impl Authorizer for AdminList {
    fn can_mutate(&self, identity: &str, _tournament_id: Option<TournamentId>) -> bool {
        self.contains(identity)
    }
}
