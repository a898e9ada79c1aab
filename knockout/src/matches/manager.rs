//! Match resolution guard.

use super::errors::{MatchError, MatchResult};
use super::models::{Match, MatchId};
use crate::db::{MatchRepository, SharedStore};
use crate::players::PlayerId;

/// Records match winners
#[derive(Clone)]
pub struct MatchManager {
    store: SharedStore,
}

impl MatchManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Get a match by ID
    pub async fn get_match(&self, match_id: MatchId) -> MatchResult<Match> {
        self.store
            .find_match(match_id)
            .await?
            .ok_or(MatchError::NotFound(match_id))
    }

    /// Record the winner of a pending match
    ///
    /// # Errors
    ///
    /// * `NotFound` - Unknown match
    /// * `AlreadyResolved` - The match already has a winner, including when
    ///   another caller resolved it first
    /// * `InvalidWinner` - `winner_id` is not one of the match's players
    pub async fn set_winner(&self, match_id: MatchId, winner_id: PlayerId) -> MatchResult<Match> {
        let current = self.get_match(match_id).await?;
        if current.is_resolved() {
            return Err(MatchError::AlreadyResolved(match_id));
        }
        if !current.has_participant(winner_id) {
            return Err(MatchError::InvalidWinner {
                match_id,
                winner_id,
            });
        }

        // Participants never change, so a rejected update means it was resolved meanwhile
        let resolved = self
            .store
            .resolve_match(match_id, winner_id)
            .await?
            .ok_or(MatchError::AlreadyResolved(match_id))?;

        log::info!(
            "Match {} (tournament {}, round {}, position {}) won by player {}",
            resolved.id,
            resolved.tournament_id,
            resolved.round,
            resolved.position,
            winner_id
        );
        Ok(resolved)
    }
}
