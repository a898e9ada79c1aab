//! Matches and winner recording.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{MatchError, MatchResult};
pub use manager::MatchManager;
pub use models::{Match, MatchId, MatchStatus, NewMatch};
