//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::matches::Match;
use crate::players::PlayerId;

/// Tournament ID type
pub type TournamentId = i64;

/// Tournament lifecycle status.
///
/// Transitions only move forward: `Draft` → `Generated` → `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Accepting enrollments
    Draft,
    /// Bracket generated, matches being played
    Generated,
    /// Champion determined
    Finished,
}

impl TournamentStatus {
    /// Column value used by the store
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "DRAFT",
            TournamentStatus::Generated => "GENERATED",
            TournamentStatus::Finished => "FINISHED",
        }
    }

    /// Parse a stored column value
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(TournamentStatus::Draft),
            "GENERATED" => Some(TournamentStatus::Generated),
            "FINISHED" => Some(TournamentStatus::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-elimination tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament ID
    pub id: TournamentId,
    /// Display name
    pub name: String,
    /// Current status
    pub status: TournamentStatus,
    /// Champion, set once when the tournament finishes
    pub winner_id: Option<PlayerId>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_finished(&self) -> bool {
        self.status == TournamentStatus::Finished
    }
}

/// Result of advancing a tournament by one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advancement {
    /// The next round was created
    NextRound(Vec<Match>),
    /// The final was resolved and the tournament is finished
    Champion(PlayerId),
}

impl Advancement {
    /// Matches created by this advancement (empty once a champion is crowned)
    pub fn matches(&self) -> &[Match] {
        match self {
            Advancement::NextRound(matches) => matches,
            Advancement::Champion(_) => &[],
        }
    }

    pub fn into_matches(self) -> Vec<Match> {
        match self {
            Advancement::NextRound(matches) => matches,
            Advancement::Champion(_) => Vec::new(),
        }
    }

    pub fn champion(&self) -> Option<PlayerId> {
        match self {
            Advancement::Champion(winner) => Some(*winner),
            Advancement::NextRound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_column_value() {
        for status in [
            TournamentStatus::Draft,
            TournamentStatus::Generated,
            TournamentStatus::Finished,
        ] {
            assert_eq!(TournamentStatus::from_db(status.as_str()), Some(status));
        }
        assert_eq!(TournamentStatus::from_db("draft"), None);
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&TournamentStatus::Generated).unwrap();
        assert_eq!(json, r#""GENERATED""#);
    }

    #[test]
    fn test_champion_advancement_has_no_matches() {
        let advancement = Advancement::Champion(7);
        assert!(advancement.matches().is_empty());
        assert_eq!(advancement.champion(), Some(7));
        assert!(advancement.into_matches().is_empty());
    }
}
