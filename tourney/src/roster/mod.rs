//! Roster module tracking the teams registered for a tournament.
//!
//! Teams are kept in registration order, which doubles as the default seed
//! order when the bracket is built. The registry only accepts changes while
//! registration is open; once frozen, the only thing that changes on a team
//! is its elimination flag.

pub mod models;
pub mod registry;

pub use models::{NewTeam, PhotoRef, Team, TeamId, normalize_handle};
pub use registry::RosterRegistry;
