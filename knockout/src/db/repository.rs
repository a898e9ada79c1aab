//! Repository trait definitions for testability and dependency injection.
//!
//! The managers only talk to these traits. [`PgStore`](super::PgStore) backs
//! them with PostgreSQL and [`MemoryStore`](super::MemoryStore) keeps
//! everything in process.
//!
//! Writes that change tournament lifecycle state are single atomic
//! operations, each re-checking its precondition while holding the store's
//! lock on the tournament:
//!
//! | Method | Precondition | On violation |
//! |---|---|---|
//! | `insert_enrollment` | tournament DRAFT, pair not enrolled | `Conflict` / `Duplicate` |
//! | `create_bracket` | tournament DRAFT, round one seeds exactly the enrolled players | `Conflict` |
//! | `append_round` | tournament GENERATED, slots free | `Conflict` / `Duplicate` |
//! | `finish_tournament` | tournament GENERATED | `Conflict` |
//! | `resolve_match` | match PENDING, winner is a participant | `Ok(None)` |

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::errors::StoreResult;
use crate::matches::{Match, MatchId, NewMatch};
use crate::players::{NewPlayer, Player, PlayerId, PlayerUpdate};
use crate::tournament::{Tournament, TournamentId};

/// Trait for player repository operations
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Create a new player; `Duplicate` if the nick is taken
    async fn insert_player(&self, player: &NewPlayer) -> StoreResult<Player>;

    /// Find player by ID
    async fn find_player(&self, player_id: PlayerId) -> StoreResult<Option<Player>>;

    /// All players ordered by ID
    async fn list_players(&self) -> StoreResult<Vec<Player>>;

    /// Apply a partial update; `None` if the player does not exist
    async fn update_player(
        &self,
        player_id: PlayerId,
        changes: &PlayerUpdate,
    ) -> StoreResult<Option<Player>>;

    /// Flip the active flag; `None` if the player does not exist
    async fn toggle_player_active(&self, player_id: PlayerId) -> StoreResult<Option<Player>>;
}

/// Trait for tournament and enrollment repository operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a new DRAFT tournament
    async fn insert_tournament(&self, name: &str) -> StoreResult<Tournament>;

    /// Find tournament by ID
    async fn find_tournament(&self, tournament_id: TournamentId)
    -> StoreResult<Option<Tournament>>;

    /// All tournaments, newest first
    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>>;

    /// Enroll a player in a DRAFT tournament
    async fn insert_enrollment(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> StoreResult<()>;

    /// Whether the (tournament, player) enrollment exists
    async fn is_enrolled(&self, tournament_id: TournamentId, player_id: PlayerId)
    -> StoreResult<bool>;

    /// Enrolled players in enrollment order
    async fn enrolled_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>>;

    /// Persist round one and mark the tournament GENERATED
    ///
    /// `Conflict` if an enrollment changed after `matches` were seeded.
    async fn create_bracket(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>>;

    /// Persist the matches of a new round
    async fn append_round(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>>;

    /// Mark the tournament FINISHED with its champion
    async fn finish_tournament(
        &self,
        tournament_id: TournamentId,
        winner_id: PlayerId,
    ) -> StoreResult<Tournament>;
}

/// Trait for match repository operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Find match by ID
    async fn find_match(&self, match_id: MatchId) -> StoreResult<Option<Match>>;

    /// Matches of a tournament, optionally one round, ordered by (round, position)
    async fn list_matches(
        &self,
        tournament_id: TournamentId,
        round: Option<u32>,
    ) -> StoreResult<Vec<Match>>;

    /// Highest round number present, `None` before the bracket exists
    async fn latest_round(&self, tournament_id: TournamentId) -> StoreResult<Option<u32>>;

    /// Number of PENDING matches in a round
    async fn count_pending(&self, tournament_id: TournamentId, round: u32) -> StoreResult<usize>;

    /// Record the winner of a PENDING match; `None` if the match is no
    /// longer pending or `winner_id` is not one of its players
    async fn resolve_match(
        &self,
        match_id: MatchId,
        winner_id: PlayerId,
    ) -> StoreResult<Option<Match>>;

    /// Every RESOLVED match across all tournaments
    async fn resolved_matches(&self) -> StoreResult<Vec<Match>>;
}

/// A complete entity store
#[async_trait]
pub trait Store: PlayerRepository + TournamentRepository + MatchRepository {
    /// Check if the store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

/// Store handle shared by the managers
pub type SharedStore = Arc<dyn Store>;

/// Players placed in a set of matches
pub(crate) fn seeded_players(matches: &[NewMatch]) -> BTreeSet<PlayerId> {
    matches
        .iter()
        .flat_map(|m| [m.player1_id, m.player2_id])
        .flatten()
        .collect()
}
