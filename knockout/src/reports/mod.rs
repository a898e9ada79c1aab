//! Leaderboard and per-tournament match history.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ReportError, ReportResult};
pub use manager::{ReportsManager, build_leaderboard};
pub use models::{LeaderboardEntry, MatchHistoryEntry};
