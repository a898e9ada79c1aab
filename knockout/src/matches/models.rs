//! Match (bracket slot) models.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::players::PlayerId;
use crate::tournament::TournamentId;

/// Match ID type
pub type MatchId = i64;

/// Match resolution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Not played yet
    Pending,
    /// Winner recorded
    Resolved,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "PENDING",
            MatchStatus::Resolved => "RESOLVED",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(MatchStatus::Pending),
            "RESOLVED" => Some(MatchStatus::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted bracket slot, identified by (tournament, round, position)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Round number (1-indexed)
    pub round: u32,
    /// Slot within the round (1-indexed)
    pub position: u32,
    pub player1_id: Option<PlayerId>,
    /// Absent on a bye
    pub player2_id: Option<PlayerId>,
    /// Always one of the two players once resolved
    pub winner_id: Option<PlayerId>,
    pub status: MatchStatus,
}

impl Match {
    pub fn is_resolved(&self) -> bool {
        self.status == MatchStatus::Resolved
    }

    /// A bye has a first player and no opponent
    pub fn is_bye(&self) -> bool {
        self.player1_id.is_some() && self.player2_id.is_none()
    }

    /// Whether `player_id` occupies one of the two slots
    pub fn has_participant(&self, player_id: PlayerId) -> bool {
        self.player1_id == Some(player_id) || self.player2_id == Some(player_id)
    }

    /// The participant that did not win, if the match was contested and resolved
    pub fn loser_id(&self) -> Option<PlayerId> {
        let winner = self.winner_id?;
        match (self.player1_id, self.player2_id) {
            (Some(p1), Some(p2)) if p1 == winner => Some(p2),
            (Some(p1), Some(p2)) if p2 == winner => Some(p1),
            _ => None,
        }
    }
}

/// A match about to be persisted; the store assigns its ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub round: u32,
    pub position: u32,
    pub player1_id: Option<PlayerId>,
    pub player2_id: Option<PlayerId>,
    pub winner_id: Option<PlayerId>,
    pub status: MatchStatus,
}

impl NewMatch {
    /// A contested match waiting for a result
    pub fn pairing(
        tournament_id: TournamentId,
        round: u32,
        position: u32,
        player1_id: PlayerId,
        player2_id: PlayerId,
    ) -> Self {
        Self {
            tournament_id,
            round,
            position,
            player1_id: Some(player1_id),
            player2_id: Some(player2_id),
            winner_id: None,
            status: MatchStatus::Pending,
        }
    }

    /// A first-round bye, resolved in favour of its only player
    pub fn bye(tournament_id: TournamentId, position: u32, player_id: PlayerId) -> Self {
        Self {
            tournament_id,
            round: 1,
            position,
            player1_id: Some(player_id),
            player2_id: None,
            winner_id: Some(player_id),
            status: MatchStatus::Resolved,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player1_id.is_some() && self.player2_id.is_none()
    }

    /// Attach a store-assigned ID
    pub fn into_match(self, id: MatchId) -> Match {
        Match {
            id,
            tournament_id: self.tournament_id,
            round: self.round,
            position: self.position,
            player1_id: self.player1_id,
            player2_id: self.player2_id,
            winner_id: self.winner_id,
            status: self.status,
        }
    }
}
