//! Report rows.

use serde::{Deserialize, Serialize};

use crate::matches::{MatchId, MatchStatus};
use crate::players::PlayerId;

/// One player's record across every tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub nick: String,
    /// Resolved matches won, byes included
    pub wins: u32,
    /// Resolved matches played and lost; a bye is never a loss
    pub losses: u32,
}

/// A match with its players' nicks resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchHistoryEntry {
    pub match_id: MatchId,
    pub round: u32,
    pub position: u32,
    pub player1_id: Option<PlayerId>,
    pub player1_nick: Option<String>,
    pub player2_id: Option<PlayerId>,
    pub player2_nick: Option<String>,
    pub winner_id: Option<PlayerId>,
    pub winner_nick: Option<String>,
    pub status: MatchStatus,
}
