//! Team data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Team ID type (unique within a tournament)
pub type TeamId = u32;

/// Opaque handle to a roster photo held by the photo store.
///
/// The engine never looks inside; it only keeps and forwards the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(pub String);

impl From<&str> for PhotoRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Registration request for a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    /// Display name
    pub name: String,
    /// Handle of the team leader
    pub leader: String,
    /// Member handles, in roster order
    #[serde(default)]
    pub members: Vec<String>,
    /// Roster photos
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
}

impl NewTeam {
    /// Create a registration request with a leader and no other members
    pub fn new(name: impl Into<String>, leader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            leader: leader.into(),
            members: Vec::new(),
            photos: Vec::new(),
        }
    }

    /// Add member handles to the roster
    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members.extend(members.into_iter().map(Into::into));
        self
    }

    /// Attach a roster photo reference
    pub fn with_photo(mut self, photo: impl Into<PhotoRef>) -> Self {
        self.photos.push(photo.into());
        self
    }
}

/// A registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team ID
    pub id: TeamId,
    /// Display name
    pub name: String,
    /// Handle of the team leader
    pub leader: String,
    /// Member handles, in roster order
    pub members: Vec<String>,
    /// Roster photos
    pub photos: Vec<PhotoRef>,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
    /// Whether the team has been knocked out of the bracket
    pub eliminated: bool,
}

impl Team {
    /// Every handle on the team (leader first), normalized for comparison
    pub fn handles(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(&self.leader)
            .chain(self.members.iter())
            .map(|h| normalize_handle(h))
    }

    /// Check whether a handle belongs to this team
    pub fn has_handle(&self, handle: &str) -> bool {
        let handle = normalize_handle(handle);
        self.handles().any(|h| h == handle)
    }
}

/// Normalize a chat handle: trimmed, without a leading `@`, lowercase.
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}
